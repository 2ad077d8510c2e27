/// Geometric operations
pub mod geometry_operations;
