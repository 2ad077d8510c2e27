/// Benchmark results loading
pub mod benchmark;
/// Geometric operations
pub mod geometry;
/// GPU synchronization and drawing of skeletons
pub mod render;
/// Skeleton object and operations
pub mod skeleton3d;
