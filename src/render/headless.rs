use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::render::gpu::*;

/// Draw call recorded by a [`HeadlessContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_array: VertexArrayId,
    pub primitive: Primitive,
    pub index_buffer: BufferId,
    pub count: u32,
}

#[derive(Default)]
struct VertexArrayState {
    attributes: HashMap<u32, (BufferId, VertexAttribute)>,
    element_buffer: Option<BufferId>,
}

struct HeadlessState {
    next_id: u32,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    buffers: HashMap<BufferId, Vec<u8>>,
    bound_vertex_array: Option<VertexArrayId>,
    attribute_locations: HashMap<String, u32>,
    uniforms: HashMap<String, Uniform>,
    draw_calls: Vec<DrawCall>,
    upload_count: usize,
    fail_uploads: bool,
}

/// GPU context keeping resources in memory and recording draw calls
///
/// Clones share the same state, so a copy kept aside can inspect what a
/// renderable did with its context.
#[derive(Clone)]
pub struct HeadlessContext {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessContext {
    /// Context whose program exposes the `atom` (0) and `color` (1) attributes
    pub fn new() -> HeadlessContext {
        HeadlessContext::with_attributes(&[("atom", 0), ("color", 1)])
    }

    /// Context whose program exposes the given attributes
    pub fn with_attributes(attributes: &[(&str, u32)]) -> HeadlessContext {
        let state = HeadlessState {
            next_id: 1,
            vertex_arrays: HashMap::new(),
            buffers: HashMap::new(),
            bound_vertex_array: None,
            attribute_locations: attributes
                .iter()
                .map(|&(name, location)| (name.to_string(), location))
                .collect(),
            uniforms: HashMap::new(),
            draw_calls: Vec::new(),
            upload_count: 0,
            fail_uploads: false,
        };
        HeadlessContext {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Makes every following buffer upload fail with [`GpuError::OutOfMemory`]
    pub fn set_fail_uploads(&self, fail: bool) {
        self.state.borrow_mut().fail_uploads = fail;
    }

    /// Number of live vertex arrays
    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    /// Number of live buffers
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Content of a buffer
    pub fn buffer_content(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Buffer sourcing an attribute location of a vertex array
    pub fn attribute_buffer(&self, vertex_array: VertexArrayId, location: u32) -> Option<BufferId> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|vao| vao.attributes.get(&location))
            .map(|&(buffer, _)| buffer)
    }

    /// Index buffer attached to a vertex array
    pub fn element_buffer(&self, vertex_array: VertexArrayId) -> Option<BufferId> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|vao| vao.element_buffer)
    }

    /// Currently bound vertex array
    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.borrow().bound_vertex_array
    }

    /// Last value of a uniform
    pub fn uniform(&self, name: &str) -> Option<Uniform> {
        self.state.borrow().uniforms.get(name).cloned()
    }

    /// Recorded draw calls, in submission order
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draw_calls.clone()
    }

    /// Forgets recorded draw calls
    pub fn clear_draw_calls(&self) {
        self.state.borrow_mut().draw_calls.clear();
    }

    /// Number of successful buffer uploads
    pub fn upload_count(&self) -> usize {
        self.state.borrow().upload_count
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        HeadlessContext::new()
    }
}

impl HeadlessState {
    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn bound(&mut self) -> GpuResult<&mut VertexArrayState> {
        let vertex_array = self.bound_vertex_array.ok_or(GpuError::NoVertexArrayBound)?;
        self.vertex_arrays
            .get_mut(&vertex_array)
            .ok_or(GpuError::UnknownVertexArray(vertex_array))
    }
}

impl GpuContext for HeadlessContext {
    fn create_vertex_array(&mut self) -> GpuResult<VertexArrayId> {
        let mut state = self.state.borrow_mut();
        let id = VertexArrayId(state.next_id());
        state.vertex_arrays.insert(id, VertexArrayState::default());
        Ok(id)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn create_buffer(&mut self) -> GpuResult<BufferId> {
        let mut state = self.state.borrow_mut();
        let id = BufferId(state.next_id());
        state.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) -> GpuResult<()> {
        let mut state = self.state.borrow_mut();
        if let Some(id) = vertex_array {
            if !state.vertex_arrays.contains_key(&id) {
                return Err(GpuError::UnknownVertexArray(id));
            }
        }
        state.bound_vertex_array = vertex_array;
        Ok(())
    }

    fn buffer_data(&mut self, target: BufferTarget, buffer: BufferId, data: &[u8]) -> GpuResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_uploads {
            return Err(GpuError::OutOfMemory);
        }
        if !state.buffers.contains_key(&buffer) {
            return Err(GpuError::UnknownBuffer(buffer));
        }
        if target == BufferTarget::ElementArray {
            state.bound()?.element_buffer = Some(buffer);
        }
        if let Some(content) = state.buffers.get_mut(&buffer) {
            content.clear();
            content.extend_from_slice(data);
        }
        state.upload_count += 1;
        Ok(())
    }

    fn vertex_attribute(&mut self, buffer: BufferId, attribute: VertexAttribute) -> GpuResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.buffers.contains_key(&buffer) {
            return Err(GpuError::UnknownBuffer(buffer));
        }
        state
            .bound()?
            .attributes
            .insert(attribute.location, (buffer, attribute));
        Ok(())
    }

    fn attribute_location(&self, name: &str) -> Option<u32> {
        self.state.borrow().attribute_locations.get(name).copied()
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) -> GpuResult<()> {
        self.state
            .borrow_mut()
            .uniforms
            .insert(name.to_string(), value);
        Ok(())
    }

    fn draw_elements(&mut self, primitive: Primitive, index_buffer: BufferId, count: u32) -> GpuResult<()> {
        let mut state = self.state.borrow_mut();
        let vertex_array = state.bound_vertex_array.ok_or(GpuError::NoVertexArrayBound)?;
        let size = state
            .buffers
            .get(&index_buffer)
            .ok_or(GpuError::UnknownBuffer(index_buffer))?
            .len();
        if count as usize * std::mem::size_of::<u32>() > size {
            return Err(GpuError::InvalidDraw {
                buffer: index_buffer,
                count,
            });
        }
        state.draw_calls.push(DrawCall {
            vertex_array,
            primitive,
            index_buffer,
            count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let observer = HeadlessContext::new();
        let mut context = observer.clone();
        let vao = context.create_vertex_array().unwrap();
        let buffer = context.create_buffer().unwrap();
        assert_eq!(observer.live_vertex_arrays(), 1);
        assert_eq!(observer.live_buffers(), 1);

        context.delete_vertex_array(vao);
        context.delete_buffer(buffer);
        assert_eq!(observer.live_vertex_arrays(), 0);
        assert_eq!(observer.live_buffers(), 0);
    }

    #[test]
    fn element_upload_needs_bound_vertex_array() {
        let mut context = HeadlessContext::new();
        let buffer = context.create_buffer().unwrap();
        assert_eq!(
            context.buffer_data(BufferTarget::ElementArray, buffer, &[0; 4]),
            Err(GpuError::NoVertexArrayBound)
        );

        let vao = context.create_vertex_array().unwrap();
        context.bind_vertex_array(Some(vao)).unwrap();
        context
            .buffer_data(BufferTarget::ElementArray, buffer, &[0; 12])
            .unwrap();
        assert_eq!(context.element_buffer(vao), Some(buffer));
    }

    #[test]
    fn draws_are_bounded_by_index_buffer() {
        let mut context = HeadlessContext::new();
        let vao = context.create_vertex_array().unwrap();
        let buffer = context.create_buffer().unwrap();
        context.bind_vertex_array(Some(vao)).unwrap();
        context
            .buffer_data(BufferTarget::ElementArray, buffer, &[0; 12])
            .unwrap();

        context.draw_elements(Primitive::Triangles, buffer, 3).unwrap();
        assert!(context.draw_elements(Primitive::Triangles, buffer, 6).is_err());
        assert_eq!(context.draw_calls().len(), 1);
    }

    #[test]
    fn failing_uploads() {
        let mut context = HeadlessContext::new();
        let buffer = context.create_buffer().unwrap();
        context.set_fail_uploads(true);
        assert_eq!(
            context.buffer_data(BufferTarget::Array, buffer, &[1, 2]),
            Err(GpuError::OutOfMemory)
        );
        assert_eq!(context.upload_count(), 0);
    }
}
