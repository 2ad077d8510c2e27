use nalgebra::base::*;

/// Maps a value of `[min, max]` to a blue, cyan, green, yellow, red ramp
///
/// Values outside of the range are clamped. A degenerate range maps every
/// value to the color of `min`.
pub fn get_color(value: f64, min: f64, max: f64) -> Vector3<f32> {
    let range = max - min;
    if !(range > 0.0) {
        return Vector3::new(0.0, 0.0, 1.0);
    }
    let t = ((value - min) / range).clamp(0.0, 1.0);

    let (r, g, b) = if t < 0.25 {
        (0.0, 4.0 * t, 1.0)
    } else if t < 0.5 {
        (0.0, 1.0, 1.0 - 4.0 * (t - 0.25))
    } else if t < 0.75 {
        (4.0 * (t - 0.5), 1.0, 0.0)
    } else {
        (1.0, 1.0 - 4.0 * (t - 0.75), 0.0)
    };
    Vector3::new(r as f32, g as f32, b as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).norm() < 1e-6, "{:?} != {:?}", a, b);
    }

    #[test]
    fn ramp_keypoints() {
        assert_close(get_color(0.0, 0.0, 4.0), Vector3::new(0.0, 0.0, 1.0));
        assert_close(get_color(1.0, 0.0, 4.0), Vector3::new(0.0, 1.0, 1.0));
        assert_close(get_color(2.0, 0.0, 4.0), Vector3::new(0.0, 1.0, 0.0));
        assert_close(get_color(3.0, 0.0, 4.0), Vector3::new(1.0, 1.0, 0.0));
        assert_close(get_color(4.0, 0.0, 4.0), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_close(get_color(-3.0, 1.0, 2.0), get_color(1.0, 1.0, 2.0));
        assert_close(get_color(8.0, 1.0, 2.0), get_color(2.0, 1.0, 2.0));
    }

    #[test]
    fn degenerate_range() {
        assert_close(get_color(1.5, 1.5, 1.5), Vector3::new(0.0, 0.0, 1.0));
    }
}
