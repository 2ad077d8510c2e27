/// Radius colormap
pub mod colormap;
/// GPU command interface
pub mod gpu;
/// In-memory GPU context
pub mod headless;
/// Skeletons kept in sync with GPU buffers
pub mod skeletons_renderable;
pub use gpu::GpuContext;
pub use headless::HeadlessContext;
pub use skeletons_renderable::{FrameParameters, RenderError, SkeletonHandle, SkeletonsRenderable};
