use nalgebra::base::*;

use crate::skeleton3d::Atom;

/// Axis aligned box containing every atom ball
pub fn bounding_box(atoms: &[Atom]) -> Option<(Vector3<f64>, Vector3<f64>)> {
    atoms.iter().fold(
        None,
        |bb_val: Option<(Vector3<f64>, Vector3<f64>)>, atom| {
            let center = atom.xyz();
            let radius = Vector3::repeat(atom[3]);
            let (low, high) = (center - radius, center + radius);
            if let Some((bb_min, bb_max)) = bb_val {
                Some((bb_min.inf(&low), bb_max.sup(&high)))
            } else {
                Some((low, high))
            }
        },
    )
}

/// Merges two optional bounding boxes
pub fn merge_boxes(
    a: Option<(Vector3<f64>, Vector3<f64>)>,
    b: Option<(Vector3<f64>, Vector3<f64>)>,
) -> Option<(Vector3<f64>, Vector3<f64>)> {
    match (a, b) {
        (Some((min_a, max_a)), Some((min_b, max_b))) => Some((min_a.inf(&min_b), max_a.sup(&max_b))),
        (Some(bb), None) | (None, Some(bb)) => Some(bb),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_includes_radii() {
        let atoms = vec![Vector4::new(0.0, 0.0, 0.0, 1.0), Vector4::new(2.0, 1.0, 0.0, 0.5)];
        let (bb_min, bb_max) = bounding_box(&atoms).unwrap();
        assert_eq!(bb_min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(bb_max, Vector3::new(2.5, 1.5, 1.0));
        assert_eq!(bounding_box(&[]), None);
    }

    #[test]
    fn merge() {
        let a = Some((Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)));
        let b = Some((Vector3::new(-1.0, 0.5, 0.0), Vector3::new(0.5, 2.0, 1.0)));
        assert_eq!(
            merge_boxes(a, b),
            Some((Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 1.0)))
        );
        assert_eq!(merge_boxes(None, a), a);
        assert_eq!(merge_boxes(None, None), None);
    }
}
