use std::path::{Path, PathBuf};

use sgp_benchmark_viewer::benchmark::{self, Benchmark};
use sgp_benchmark_viewer::render::{HeadlessContext, SkeletonsRenderable};
use sgp_benchmark_viewer::skeleton3d::SkeletonFormat;

const TRIANGLE_MEDIAN: &str = "atoms 3\n0 0 0 1\n1 0 0 1\n0 1 0 2\nlinks 1\n0 1\nfaces 1\n0 1 2\n";
const TRIANGLE_WEB: &str = "v 0 0 0 1\nv 1 0 0 1\nv 0 1 0 2\nf 1 2 3\n";

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sgp_benchmark_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn populate(dir: &Path) {
    std::fs::write(dir.join("hand_powercrust.median"), TRIANGLE_MEDIAN).unwrap();
    std::fs::write(dir.join("hand_scale.median"), "atoms 1\n0 0 0 3\n").unwrap();
    std::fs::write(dir.join("hand_scale.web"), TRIANGLE_WEB).unwrap();
    std::fs::write(dir.join("bunny_scale.median"), TRIANGLE_MEDIAN).unwrap();
}

#[test]
fn files_are_filtered_by_stem_and_format() {
    let dir = temp_dir("find");
    populate(&dir);

    let median = benchmark::find_files("hand", &dir, SkeletonFormat::Median).unwrap();
    assert_eq!(
        median,
        vec![dir.join("hand_powercrust.median"), dir.join("hand_scale.median")]
    );
    let web = benchmark::find_files("hand", &dir, SkeletonFormat::Web).unwrap();
    assert_eq!(web, vec![dir.join("hand_scale.web")]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_activates_first_skeleton() {
    let dir = temp_dir("load");
    populate(&dir);

    let context = HeadlessContext::new();
    let mut renderable = SkeletonsRenderable::new(context.clone());
    let mut bench = Benchmark::load(&mut renderable, "hand", &dir, SkeletonFormat::Median).unwrap();
    assert_eq!(bench.labels(), vec!["powercrust", "scale"]);
    assert_eq!(bench.selected().unwrap().label, "powercrust");

    let handles: Vec<_> = bench.entries().iter().map(|e| e.handle).collect();
    assert!(renderable.get(handles[0]).unwrap().is_active());
    assert!(!renderable.get(handles[1]).unwrap().is_active());

    bench.next(&mut renderable).unwrap();
    assert!(!renderable.get(handles[0]).unwrap().is_active());
    assert!(renderable.get(handles[1]).unwrap().is_active());
    bench.next(&mut renderable).unwrap();
    assert_eq!(bench.selected().unwrap().label, "powercrust");
    assert!(bench.select(&mut renderable, 2).is_err());

    let (bb_min, bb_max) = bench.bounding_box(&renderable).unwrap();
    assert_eq!(bb_min[0], -3.0);
    assert_eq!(bb_max[1], 3.0);

    renderable.update_gpu_data().unwrap();
    assert_eq!(context.live_vertex_arrays(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_stem_is_an_error() {
    let dir = temp_dir("missing");
    populate(&dir);

    let mut renderable = SkeletonsRenderable::new(HeadlessContext::new());
    assert!(Benchmark::load(&mut renderable, "dragon", &dir, SkeletonFormat::Median).is_err());
    assert_eq!(renderable.number_of_entries(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_file_fails_the_load() {
    let dir = temp_dir("malformed");
    std::fs::write(dir.join("hand_broken.web"), "v 0 0 0\n").unwrap();

    let mut renderable = SkeletonsRenderable::new(HeadlessContext::new());
    let err = Benchmark::load(&mut renderable, "hand", &dir, SkeletonFormat::Web)
        .err()
        .unwrap();
    assert!(err.to_string().contains("line 1"), "{}", err);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_load_adds_no_entry() {
    let dir = temp_dir("partial");
    std::fs::write(dir.join("hand_a.median"), TRIANGLE_MEDIAN).unwrap();
    std::fs::write(dir.join("hand_b.median"), "atoms 2\n0 0 0 1\n").unwrap();

    let mut renderable = SkeletonsRenderable::new(HeadlessContext::new());
    let err = Benchmark::load(&mut renderable, "hand", &dir, SkeletonFormat::Median)
        .err()
        .unwrap();
    assert!(err.to_string().contains("hand_b.median"), "{}", err);
    assert_eq!(renderable.number_of_entries(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stem_must_end_at_a_separator() {
    let dir = temp_dir("separator");
    populate(&dir);
    std::fs::write(dir.join("handle_scale.median"), TRIANGLE_MEDIAN).unwrap();
    std::fs::write(dir.join("hand.median"), TRIANGLE_MEDIAN).unwrap();

    let median = benchmark::find_files("hand", &dir, SkeletonFormat::Median).unwrap();
    assert_eq!(
        median,
        vec![
            dir.join("hand.median"),
            dir.join("hand_powercrust.median"),
            dir.join("hand_scale.median")
        ]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn add_file_creates_an_inactive_entry() {
    let dir = temp_dir("add_file");
    populate(&dir);

    let mut renderable = SkeletonsRenderable::new(HeadlessContext::new());
    let h = renderable
        .add_file(&dir.join("hand_scale.web"), SkeletonFormat::Web)
        .unwrap();
    let entry = renderable.get(h).unwrap();
    assert!(entry.is_dirty());
    assert!(!entry.is_active());
    assert_eq!(entry.skeleton().get_number_of_faces(), 1);
    assert!(renderable
        .add_file(&dir.join("missing.web"), SkeletonFormat::Web)
        .is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
