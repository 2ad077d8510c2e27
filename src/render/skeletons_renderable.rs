use nalgebra::base::*;
use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::render::colormap;
use crate::render::gpu::*;
use crate::skeleton3d::pool::{Handle, HandlePool};
use crate::skeleton3d::{DatastructureError, MedianSkeleton, SkeletonFormat};

/// Errors raised while synchronizing or drawing skeletons
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error("Inconsistent skeleton: {0}")]
    Skeleton(#[from] DatastructureError),
    #[error("Invalid skeleton handle")]
    InvalidHandle,
}

/// Skeleton entry handle tag
pub enum SkeletonEntryKind {}
/// Handle on a skeleton of a [`SkeletonsRenderable`]
pub type SkeletonHandle = Handle<SkeletonEntryKind>;

pub const NUMBER_OF_BUFFERS: usize = 4;
const BALLS_VBO: usize = 0;
const COLORS_VBO: usize = 1;
const LINKS_IBO: usize = 2;
const FACES_IBO: usize = 3;

/// GPU side of a skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuResources {
    pub vertex_array: VertexArrayId,
    pub buffers: [BufferId; NUMBER_OF_BUFFERS],
    pub link_index_count: u32,
    pub face_index_count: u32,
}

impl GpuResources {
    pub fn atoms_buffer(&self) -> BufferId {
        self.buffers[BALLS_VBO]
    }

    pub fn colors_buffer(&self) -> BufferId {
        self.buffers[COLORS_VBO]
    }

    pub fn links_buffer(&self) -> BufferId {
        self.buffers[LINKS_IBO]
    }

    pub fn faces_buffer(&self) -> BufferId {
        self.buffers[FACES_IBO]
    }
}

/// Skeleton buffer entry
///
/// `dirty` entries are uploaded at the next [`SkeletonsRenderable::update_gpu_data`],
/// `destroyed` ones are released and removed there. `uploaded` holds while the
/// GPU buffers match a successful upload, even if the skeleton was edited since.
pub struct SkeletonStorage {
    skeleton: MedianSkeleton,
    resources: Option<GpuResources>,
    dirty: bool,
    uploaded: bool,
    active: bool,
    destroyed: bool,
}

impl SkeletonStorage {
    fn new(skeleton: MedianSkeleton) -> SkeletonStorage {
        SkeletonStorage {
            skeleton,
            resources: None,
            dirty: true,
            uploaded: false,
            active: false,
            destroyed: false,
        }
    }

    pub fn skeleton(&self) -> &MedianSkeleton {
        &self.skeleton
    }

    /// Mutable skeleton; the entry is re-uploaded at the next synchronization
    pub fn skeleton_mut(&mut self) -> &mut MedianSkeleton {
        self.dirty = true;
        &mut self.skeleton
    }

    /// GPU resources, once uploaded
    pub fn resources(&self) -> Option<&GpuResources> {
        self.resources.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Checks if the GPU buffers hold a complete upload
    pub fn is_uploaded(&self) -> bool {
        self.uploaded
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Camera and window state needed to draw a frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParameters {
    pub window_dimensions: Vector2<f32>,
    pub light_position: Vector3<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl Default for FrameParameters {
    fn default() -> Self {
        FrameParameters {
            window_dimensions: Vector2::new(800.0, 600.0),
            light_position: Vector3::zeros(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        }
    }
}

/// Set of skeletons kept in sync with GPU buffers
pub struct SkeletonsRenderable<C: GpuContext> {
    context: C,
    skeletons: HandlePool<SkeletonEntryKind, SkeletonStorage>,
    model: Matrix4<f32>,
    show_links: bool,
}

impl<C: GpuContext> SkeletonsRenderable<C> {
    /// Renderable constructor
    pub fn new(context: C) -> SkeletonsRenderable<C> {
        SkeletonsRenderable {
            context,
            skeletons: HandlePool::new(),
            model: Matrix4::identity(),
            show_links: false,
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn set_model(&mut self, model: Matrix4<f32>) {
        self.model = model;
    }

    /// Also draws links as lines
    pub fn set_show_links(&mut self, show_links: bool) {
        self.show_links = show_links;
    }

    /// Loads a skeleton file into a new, inactive entry
    pub fn add_file(&mut self, path: &Path, format: SkeletonFormat) -> anyhow::Result<SkeletonHandle> {
        let skeleton = MedianSkeleton::load(path, format)?;
        log::info!(
            "loaded {}: {} atoms, {} links, {} faces",
            path.display(),
            skeleton.get_number_of_atoms(),
            skeleton.get_number_of_links(),
            skeleton.get_number_of_faces()
        );
        Ok(self.add(skeleton))
    }

    /// Adds a skeleton in a new, inactive entry
    pub fn add(&mut self, skeleton: MedianSkeleton) -> SkeletonHandle {
        self.skeletons.create(SkeletonStorage::new(skeleton))
    }

    /// Marks an entry for removal at the next synchronization
    pub fn remove(&mut self, handle: SkeletonHandle) -> Result<(), RenderError> {
        let storage = self.get_mut(handle)?;
        storage.destroyed = true;
        storage.active = false;
        Ok(())
    }

    /// Entry getter
    ///
    /// Entries marked for removal stay reachable until the next synchronization.
    pub fn get(&self, handle: SkeletonHandle) -> Result<&SkeletonStorage, RenderError> {
        self.skeletons.get(handle).ok_or(RenderError::InvalidHandle)
    }

    /// Mutable entry getter
    pub fn get_mut(&mut self, handle: SkeletonHandle) -> Result<&mut SkeletonStorage, RenderError> {
        self.skeletons
            .get_mut(handle)
            .ok_or(RenderError::InvalidHandle)
    }

    pub fn set_active(&mut self, handle: SkeletonHandle, active: bool) -> Result<(), RenderError> {
        let storage = self.get_mut(handle)?;
        storage.active = active && !storage.destroyed;
        Ok(())
    }

    pub fn mark_dirty(&mut self, handle: SkeletonHandle) -> Result<(), RenderError> {
        self.get_mut(handle)?.dirty = true;
        Ok(())
    }

    /// Number of entries, including the ones marked for removal
    pub fn number_of_entries(&self) -> usize {
        self.skeletons.len()
    }

    /// Handles of all entries
    pub fn handles(&self) -> Vec<SkeletonHandle> {
        self.skeletons.handles()
    }

    /// Releases destroyed entries and uploads dirty ones
    ///
    /// An entry whose upload fails stays dirty; the first error is returned
    /// once every entry has been processed.
    pub fn update_gpu_data(&mut self) -> Result<(), RenderError> {
        let mut first_error = None;
        let mut index = 0;
        while index < self.skeletons.len() {
            let handle = match self.skeletons.handle_at(index) {
                Some(handle) => handle,
                None => break,
            };
            let storage = match self.skeletons.get_by_index_mut(index) {
                Some(storage) => storage,
                None => break,
            };

            if storage.destroyed {
                release(&mut self.context, storage);
                self.skeletons.remove(handle);
                log::debug!("skeleton {:?} released", handle);
                // the last entry now sits at this index
                continue;
            }

            if storage.dirty {
                match upload(&mut self.context, storage) {
                    Ok(()) => {
                        storage.dirty = false;
                        storage.uploaded = true;
                        log::debug!(
                            "skeleton {:?} uploaded: {} atoms",
                            handle,
                            storage.skeleton.get_number_of_atoms()
                        );
                    }
                    Err(e) => {
                        storage.uploaded = false;
                        log::warn!("skeleton {:?} upload failed: {}", handle, e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            index += 1;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Draws every active, uploaded entry
    ///
    /// Entries edited since their last upload are drawn from their previous buffers.
    pub fn render(&mut self, frame: &FrameParameters) -> Result<(), RenderError> {
        self.context
            .set_uniform("window_dimensions", Uniform::Vec2(frame.window_dimensions))?;
        self.context
            .set_uniform("light_position", Uniform::Vec3(frame.light_position))?;
        self.context.set_uniform("model", Uniform::Mat4(self.model))?;
        self.context.set_uniform("view", Uniform::Mat4(frame.view))?;
        self.context
            .set_uniform("projection", Uniform::Mat4(frame.projection))?;

        let drawn = self.draw_entries();
        self.context.bind_vertex_array(None)?;
        drawn
    }

    fn draw_entries(&mut self) -> Result<(), RenderError> {
        for storage in self.skeletons.as_slice() {
            if !storage.active || storage.destroyed || !storage.uploaded {
                continue;
            }
            if let Some(resources) = storage.resources {
                self.context.bind_vertex_array(Some(resources.vertex_array))?;
                self.context.draw_elements(
                    Primitive::Triangles,
                    resources.faces_buffer(),
                    resources.face_index_count,
                )?;
                if self.show_links {
                    self.context.draw_elements(
                        Primitive::Lines,
                        resources.links_buffer(),
                        resources.link_index_count,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Releases every GPU resource; entries are uploaded again at the next synchronization
    pub fn remove_gpu_data(&mut self) {
        for storage in self.skeletons.as_mut_slice() {
            release(&mut self.context, storage);
            storage.dirty = true;
        }
    }
}

impl<C: GpuContext> Drop for SkeletonsRenderable<C> {
    fn drop(&mut self) {
        self.remove_gpu_data();
    }
}

/// Per-atom colors from the radius colormap
pub fn compute_colors(skeleton: &MedianSkeleton) -> Vec<[f32; 4]> {
    let (minr, maxr) = skeleton.compute_minmax_radii().unwrap_or((0.0, 0.0));
    skeleton
        .atoms()
        .par_iter()
        .map(|atom| {
            let color = colormap::get_color(atom[3], minr, maxr);
            [color[0], color[1], color[2], 1.0]
        })
        .collect()
}

fn release<C: GpuContext>(context: &mut C, storage: &mut SkeletonStorage) {
    storage.uploaded = false;
    if let Some(resources) = storage.resources.take() {
        context.delete_vertex_array(resources.vertex_array);
        for buffer in resources.buffers {
            context.delete_buffer(buffer);
        }
    }
}

fn create_resources<C: GpuContext>(context: &mut C) -> GpuResult<GpuResources> {
    let vertex_array = context.create_vertex_array()?;
    let mut buffers = Vec::with_capacity(NUMBER_OF_BUFFERS);
    for _ in 0..NUMBER_OF_BUFFERS {
        match context.create_buffer() {
            Ok(buffer) => buffers.push(buffer),
            Err(e) => {
                for buffer in buffers {
                    context.delete_buffer(buffer);
                }
                context.delete_vertex_array(vertex_array);
                return Err(e);
            }
        }
    }
    Ok(GpuResources {
        vertex_array,
        buffers: [buffers[0], buffers[1], buffers[2], buffers[3]],
        link_index_count: 0,
        face_index_count: 0,
    })
}

fn upload<C: GpuContext>(context: &mut C, storage: &mut SkeletonStorage) -> Result<(), RenderError> {
    let skeleton = &storage.skeleton;
    let atoms: Vec<[f64; 4]> = skeleton
        .atoms()
        .iter()
        .map(|atom| [atom[0], atom[1], atom[2], atom[3]])
        .collect();
    let colors = compute_colors(skeleton);
    let link_indices = skeleton.link_indices()?;
    let face_indices = skeleton.face_indices()?;

    let atom_location = context
        .attribute_location("atom")
        .ok_or_else(|| GpuError::UnknownAttribute("atom".to_string()))?;
    let color_location = context
        .attribute_location("color")
        .ok_or_else(|| GpuError::UnknownAttribute("color".to_string()))?;

    let mut resources = match storage.resources {
        Some(resources) => resources,
        None => {
            let resources = create_resources(context)?;
            storage.resources = Some(resources);
            resources
        }
    };

    context.bind_vertex_array(Some(resources.vertex_array))?;
    let filled = fill_buffers(
        context,
        &resources,
        (atom_location, atoms.as_slice()),
        (color_location, colors.as_slice()),
        link_indices.as_slice(),
        face_indices.as_slice(),
    );
    context.bind_vertex_array(None)?;
    filled?;

    resources.link_index_count = link_indices.len() as u32;
    resources.face_index_count = face_indices.len() as u32;
    storage.resources = Some(resources);
    Ok(())
}

fn fill_buffers<C: GpuContext>(
    context: &mut C,
    resources: &GpuResources,
    (atom_location, atoms): (u32, &[[f64; 4]]),
    (color_location, colors): (u32, &[[f32; 4]]),
    link_indices: &[u32],
    face_indices: &[u32],
) -> GpuResult<()> {
    context.buffer_data(
        BufferTarget::Array,
        resources.atoms_buffer(),
        bytemuck::cast_slice(atoms),
    )?;
    context.vertex_attribute(
        resources.atoms_buffer(),
        VertexAttribute {
            location: atom_location,
            components: 4,
            scalar: ScalarType::F64,
        },
    )?;

    context.buffer_data(
        BufferTarget::Array,
        resources.colors_buffer(),
        bytemuck::cast_slice(colors),
    )?;
    context.vertex_attribute(
        resources.colors_buffer(),
        VertexAttribute {
            location: color_location,
            components: 4,
            scalar: ScalarType::F32,
        },
    )?;

    context.buffer_data(
        BufferTarget::ElementArray,
        resources.links_buffer(),
        bytemuck::cast_slice(link_indices),
    )?;
    // faces last: the vertex array keeps the face indices attached
    context.buffer_data(
        BufferTarget::ElementArray,
        resources.faces_buffer(),
        bytemuck::cast_slice(face_indices),
    )?;
    Ok(())
}
