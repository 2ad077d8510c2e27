use std::sync::atomic::{AtomicUsize, Ordering};

use sgp_benchmark_viewer::skeleton3d::{Datastructure, DatastructureError};

const ZERO: AtomicUsize = AtomicUsize::new(0);
const ROW: [AtomicUsize; 10] = [ZERO; 10];

// one row of drop counters per tracked type
static DROPS: [[AtomicUsize; 10]; 8] = [ROW; 8];

#[derive(Default)]
struct Tracked<const K: usize> {
    idx: usize,
}

impl<const K: usize> Drop for Tracked<K> {
    fn drop(&mut self) {
        DROPS[K][self.idx].fetch_add(1, Ordering::SeqCst);
    }
}

fn drops(kind: usize) -> Vec<usize> {
    DROPS[kind]
        .iter()
        .map(|count| count.load(Ordering::SeqCst))
        .collect()
}

#[test]
fn element_properties_destroyed() {
    {
        let mut s: Datastructure = Datastructure::new(20, 20, 20);
        for _ in 0..10 {
            s.create_atom();
            s.create_link();
            s.create_face();
        }
        s.add_atom_property::<Tracked<0>>("temp_atom_data").unwrap();
        s.add_link_property::<Tracked<1>>("temp_link_data").unwrap();
        s.add_link_property::<Tracked<2>>("temp_link_data2").unwrap();
        s.add_face_property::<Tracked<3>>("temp_face_data").unwrap();

        for i in 0..10 {
            s.atom_properties_mut().column_mut::<Tracked<0>>(0).unwrap()[i].idx = i;
            s.link_properties_mut().column_mut::<Tracked<1>>(0).unwrap()[i].idx = i;
            s.link_properties_mut().column_mut::<Tracked<2>>(1).unwrap()[i].idx = i;
            s.face_properties_mut().column_mut::<Tracked<3>>(0).unwrap()[i].idx = i;
        }

        for kind in 0..4 {
            assert_eq!(drops(kind), vec![0; 10]);
        }
    }
    for kind in 0..4 {
        assert_eq!(drops(kind), vec![1; 10], "property {}", kind);
    }
}

#[test]
fn removed_element_drops_only_its_properties() {
    let mut s: Datastructure = Datastructure::default();
    let handles: Vec<_> = (0..10).map(|_| s.create_atom()).collect();
    s.add_atom_property::<Tracked<4>>("tracked").unwrap();
    for (i, value) in s
        .atom_property_mut::<Tracked<4>>("tracked")
        .unwrap()
        .iter_mut()
        .enumerate()
    {
        value.idx = i;
    }

    s.remove_atom(handles[3]).unwrap();
    let mut expected = vec![0; 10];
    expected[3] = 1;
    assert_eq!(drops(4), expected);

    // the last atom moved into the hole, with its property value
    assert_eq!(s.atom_index(handles[9]), Ok(3));
    assert_eq!(s.atom_property::<Tracked<4>>("tracked").unwrap()[3].idx, 9);
    assert_eq!(
        s.remove_atom(handles[3]),
        Err(DatastructureError::InvalidHandle("atom"))
    );

    drop(s);
    assert_eq!(drops(4), vec![1; 10]);
}

#[test]
fn removed_property_and_clear_drop_values() {
    let mut s: Datastructure = Datastructure::default();
    for _ in 0..10 {
        s.create_face();
    }
    s.add_face_property::<Tracked<5>>("first").unwrap();
    s.add_face_property::<Tracked<6>>("second").unwrap();
    for i in 0..10 {
        s.face_property_mut::<Tracked<5>>("first").unwrap()[i].idx = i;
        s.face_property_mut::<Tracked<6>>("second").unwrap()[i].idx = i;
    }

    assert!(s.remove_face_property("first"));
    assert_eq!(drops(5), vec![1; 10]);
    assert_eq!(drops(6), vec![0; 10]);

    s.clear();
    assert_eq!(drops(6), vec![1; 10]);
    assert_eq!(s.number_of_faces(), 0);

    // properties survive clear and fill new elements with defaults
    s.create_face();
    assert_eq!(s.face_property::<Tracked<6>>("second").unwrap().len(), 1);
    drop(s);
    assert_eq!(DROPS[6][0].load(Ordering::SeqCst), 2);
}

#[test]
fn property_types_are_checked() {
    let mut s: Datastructure = Datastructure::default();
    s.create_link();
    s.add_link_property::<f32>("weight").unwrap();
    assert!(matches!(
        s.link_property::<f64>("weight"),
        Err(DatastructureError::PropertyTypeMismatch { .. })
    ));
    assert_eq!(
        s.add_link_property::<u8>("weight"),
        Err(DatastructureError::DuplicateProperty("weight".to_string()))
    );
    assert!(matches!(
        s.link_properties().column::<f32>(3),
        Err(DatastructureError::UnknownPropertyPosition(3))
    ));
}
