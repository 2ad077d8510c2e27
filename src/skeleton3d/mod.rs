/// Atoms, links and faces with attached properties
pub mod datastructure;
/// Datastructure errors
pub mod error;
/// Input/Output functions
pub mod io;
/// Median skeleton structure
pub mod median_skeleton;
/// Generational handle pool
pub mod pool;
/// Type-erased element properties
pub mod property;
pub use datastructure::{AtomHandle, Datastructure, FaceHandle, LinkHandle};
pub use error::DatastructureError;
pub use io::SkeletonFormat;
pub use median_skeleton::{Atom, Face, Link, MedianSkeleton};
pub use pool::{Handle, HandlePool};
