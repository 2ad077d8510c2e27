//! Minimal GPU command interface used by the renderables
//!
//! Calls are made from the thread owning the context, hence `&mut self`
//! everywhere and no `Send` bound.

use nalgebra::base::*;
use thiserror::Error;

/// GPU error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("Failed to create {0}")]
    CreationFailed(&'static str),
    #[error("Unknown vertex array {0:?}")]
    UnknownVertexArray(VertexArrayId),
    #[error("Unknown buffer {0:?}")]
    UnknownBuffer(BufferId),
    #[error("No vertex array bound")]
    NoVertexArrayBound,
    #[error("Unknown shader attribute \"{0}\"")]
    UnknownAttribute(String),
    #[error("Draw of {count} indices exceeds index buffer {buffer:?}")]
    InvalidDraw { buffer: BufferId, count: u32 },
    #[error("Out of memory")]
    OutOfMemory,
}

pub type GpuResult<T> = Result<T, GpuError>;

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex data
    Array,
    /// Indices, recorded in the bound vertex array
    ElementArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    F32,
    F64,
}

impl ScalarType {
    /// Size in bytes
    pub fn size(&self) -> usize {
        match self {
            ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }
}

/// Layout of a vertex attribute inside its buffer (tightly packed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub scalar: ScalarType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Uniform {
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Mat4(Matrix4<f32>),
}

/// GPU command submission
pub trait GpuContext {
    fn create_vertex_array(&mut self) -> GpuResult<VertexArrayId>;
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);
    fn create_buffer(&mut self) -> GpuResult<BufferId>;
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Binds a vertex array, or unbinds with `None`
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) -> GpuResult<()>;

    /// Replaces the content of a buffer
    ///
    /// Uploading to [`BufferTarget::ElementArray`] also attaches the buffer
    /// to the bound vertex array.
    fn buffer_data(&mut self, target: BufferTarget, buffer: BufferId, data: &[u8]) -> GpuResult<()>;

    /// Sources an attribute of the bound vertex array from a buffer
    fn vertex_attribute(&mut self, buffer: BufferId, attribute: VertexAttribute) -> GpuResult<()>;

    /// Location of a vertex attribute in the current program
    fn attribute_location(&self, name: &str) -> Option<u32>;

    fn set_uniform(&mut self, name: &str, value: Uniform) -> GpuResult<()>;

    /// Draws `count` u32 indices of an index buffer with the bound vertex array
    fn draw_elements(&mut self, primitive: Primitive, index_buffer: BufferId, count: u32) -> GpuResult<()>;
}
