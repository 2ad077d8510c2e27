use crate::skeleton3d::error::{DatastructureError, DatastructureResult};
use crate::skeleton3d::pool::{Handle, HandlePool};
use crate::skeleton3d::property::PropertyRegistry;

/// Atom handle tag
pub enum AtomKind {}
/// Link handle tag
pub enum LinkKind {}
/// Face handle tag
pub enum FaceKind {}

/// Stable atom handle
pub type AtomHandle = Handle<AtomKind>;
/// Stable link handle
pub type LinkHandle = Handle<LinkKind>;
/// Stable face handle
pub type FaceHandle = Handle<FaceKind>;

/// Elements of one category with their attached properties
///
/// Property values are kept at the index of their element: creating an
/// element appends a default value to every property, removing one
/// swap-removes the same index everywhere.
pub struct ElementSet<K, T> {
    pool: HandlePool<K, T>,
    properties: PropertyRegistry,
    category: &'static str,
}

impl<K, T> ElementSet<K, T> {
    fn with_capacity(capacity: usize, category: &'static str) -> ElementSet<K, T> {
        ElementSet {
            pool: HandlePool::with_capacity(capacity),
            properties: PropertyRegistry::new(),
            category,
        }
    }

    /// Adds an element
    pub fn create(&mut self, value: T) -> Handle<K> {
        self.properties.reserve(1);
        self.properties.push_default();
        self.pool.create(value)
    }

    /// Removes an element and drops its property values
    pub fn remove(&mut self, handle: Handle<K>) -> DatastructureResult<T> {
        let (index, value) = self
            .pool
            .remove(handle)
            .ok_or(DatastructureError::InvalidHandle(self.category))?;
        self.properties.swap_remove(index);
        Ok(value)
    }

    /// Element getter
    pub fn get(&self, handle: Handle<K>) -> DatastructureResult<&T> {
        self.pool
            .get(handle)
            .ok_or(DatastructureError::InvalidHandle(self.category))
    }

    /// Mutable element getter
    pub fn get_mut(&mut self, handle: Handle<K>) -> DatastructureResult<&mut T> {
        self.pool
            .get_mut(handle)
            .ok_or(DatastructureError::InvalidHandle(self.category))
    }

    /// Element getter by index
    pub fn get_by_index(&self, index: usize) -> DatastructureResult<&T> {
        self.pool
            .get_by_index(index)
            .ok_or(DatastructureError::IndexOutOfBounds {
                category: self.category,
                index,
            })
    }

    /// Current index of an element
    pub fn index_of(&self, handle: Handle<K>) -> DatastructureResult<usize> {
        self.pool
            .index_of(handle)
            .ok_or(DatastructureError::InvalidHandle(self.category))
    }

    /// Handle of the element at an index
    pub fn handle_at(&self, index: usize) -> DatastructureResult<Handle<K>> {
        self.pool
            .handle_at(index)
            .ok_or(DatastructureError::IndexOutOfBounds {
                category: self.category,
                index,
            })
    }

    /// Checks if a handle refers to a live element
    pub fn contains(&self, handle: Handle<K>) -> bool {
        self.pool.contains(handle)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Checks if there is no element
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Elements, by index
    pub fn as_slice(&self) -> &[T] {
        self.pool.as_slice()
    }

    /// Handles of the elements, by index
    pub fn handles(&self) -> Vec<Handle<K>> {
        self.pool.handles()
    }

    /// Attached properties
    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    /// Mutable attached properties
    pub fn properties_mut(&mut self) -> &mut PropertyRegistry {
        &mut self.properties
    }

    /// Attaches a new property, filled with default values
    pub fn add_property<P: Default + Send + Sync + 'static>(&mut self, name: &str) -> DatastructureResult<usize> {
        self.properties.add::<P>(name, self.pool.len())
    }

    /// Removes every element and property value, keeping properties registered
    pub fn clear(&mut self) {
        self.properties.clear_values();
        self.pool.clear();
    }
}

/// Atoms, links and faces with dynamically attached properties
pub struct Datastructure<A = (), L = (), F = ()> {
    atoms: ElementSet<AtomKind, A>,
    links: ElementSet<LinkKind, L>,
    faces: ElementSet<FaceKind, F>,
}

impl<A, L, F> Datastructure<A, L, F> {
    /// Datastructure constructor, reserving room for the given element numbers
    pub fn new(atom_capacity: usize, link_capacity: usize, face_capacity: usize) -> Self {
        Datastructure {
            atoms: ElementSet::with_capacity(atom_capacity, "atom"),
            links: ElementSet::with_capacity(link_capacity, "link"),
            faces: ElementSet::with_capacity(face_capacity, "face"),
        }
    }

    /// Atom set
    pub fn atom_set(&self) -> &ElementSet<AtomKind, A> {
        &self.atoms
    }

    /// Link set
    pub fn link_set(&self) -> &ElementSet<LinkKind, L> {
        &self.links
    }

    /// Face set
    pub fn face_set(&self) -> &ElementSet<FaceKind, F> {
        &self.faces
    }

    /// Adds an atom
    pub fn create_atom_with(&mut self, atom: A) -> AtomHandle {
        self.atoms.create(atom)
    }

    /// Adds a link
    pub fn create_link_with(&mut self, link: L) -> LinkHandle {
        self.links.create(link)
    }

    /// Adds a face
    pub fn create_face_with(&mut self, face: F) -> FaceHandle {
        self.faces.create(face)
    }

    /// Removes an atom
    pub fn remove_atom(&mut self, handle: AtomHandle) -> DatastructureResult<A> {
        self.atoms.remove(handle)
    }

    /// Removes a link
    pub fn remove_link(&mut self, handle: LinkHandle) -> DatastructureResult<L> {
        self.links.remove(handle)
    }

    /// Removes a face
    pub fn remove_face(&mut self, handle: FaceHandle) -> DatastructureResult<F> {
        self.faces.remove(handle)
    }

    /// Atom getter
    pub fn get_atom(&self, handle: AtomHandle) -> DatastructureResult<&A> {
        self.atoms.get(handle)
    }

    /// Mutable atom getter
    pub fn get_atom_mut(&mut self, handle: AtomHandle) -> DatastructureResult<&mut A> {
        self.atoms.get_mut(handle)
    }

    /// Atom getter by index
    pub fn get_atom_by_index(&self, index: usize) -> DatastructureResult<&A> {
        self.atoms.get_by_index(index)
    }

    /// Link getter
    pub fn get_link(&self, handle: LinkHandle) -> DatastructureResult<&L> {
        self.links.get(handle)
    }

    /// Mutable link getter
    pub fn get_link_mut(&mut self, handle: LinkHandle) -> DatastructureResult<&mut L> {
        self.links.get_mut(handle)
    }

    /// Link getter by index
    pub fn get_link_by_index(&self, index: usize) -> DatastructureResult<&L> {
        self.links.get_by_index(index)
    }

    /// Face getter
    pub fn get_face(&self, handle: FaceHandle) -> DatastructureResult<&F> {
        self.faces.get(handle)
    }

    /// Mutable face getter
    pub fn get_face_mut(&mut self, handle: FaceHandle) -> DatastructureResult<&mut F> {
        self.faces.get_mut(handle)
    }

    /// Face getter by index
    pub fn get_face_by_index(&self, index: usize) -> DatastructureResult<&F> {
        self.faces.get_by_index(index)
    }

    /// Current index of an atom
    pub fn atom_index(&self, handle: AtomHandle) -> DatastructureResult<usize> {
        self.atoms.index_of(handle)
    }

    /// Current index of a link
    pub fn link_index(&self, handle: LinkHandle) -> DatastructureResult<usize> {
        self.links.index_of(handle)
    }

    /// Current index of a face
    pub fn face_index(&self, handle: FaceHandle) -> DatastructureResult<usize> {
        self.faces.index_of(handle)
    }

    /// Handle of the atom at an index
    pub fn atom_handle(&self, index: usize) -> DatastructureResult<AtomHandle> {
        self.atoms.handle_at(index)
    }

    /// Handle of the link at an index
    pub fn link_handle(&self, index: usize) -> DatastructureResult<LinkHandle> {
        self.links.handle_at(index)
    }

    /// Handle of the face at an index
    pub fn face_handle(&self, index: usize) -> DatastructureResult<FaceHandle> {
        self.faces.handle_at(index)
    }

    /// Gets number of atoms
    pub fn number_of_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Gets number of links
    pub fn number_of_links(&self) -> usize {
        self.links.len()
    }

    /// Gets number of faces
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Atoms, by index
    pub fn atoms(&self) -> &[A] {
        self.atoms.as_slice()
    }

    /// Links, by index
    pub fn links(&self) -> &[L] {
        self.links.as_slice()
    }

    /// Faces, by index
    pub fn faces(&self) -> &[F] {
        self.faces.as_slice()
    }

    /// Attaches a new property to atoms
    pub fn add_atom_property<P: Default + Send + Sync + 'static>(&mut self, name: &str) -> DatastructureResult<usize> {
        self.atoms.add_property::<P>(name)
    }

    /// Attaches a new property to links
    pub fn add_link_property<P: Default + Send + Sync + 'static>(&mut self, name: &str) -> DatastructureResult<usize> {
        self.links.add_property::<P>(name)
    }

    /// Attaches a new property to faces
    pub fn add_face_property<P: Default + Send + Sync + 'static>(&mut self, name: &str) -> DatastructureResult<usize> {
        self.faces.add_property::<P>(name)
    }

    /// Atom property values, by atom index
    pub fn atom_property<P: 'static>(&self, name: &str) -> DatastructureResult<&[P]> {
        self.atoms.properties().get::<P>(name)
    }

    /// Mutable atom property values, by atom index
    pub fn atom_property_mut<P: 'static>(&mut self, name: &str) -> DatastructureResult<&mut [P]> {
        self.atoms.properties_mut().get_mut::<P>(name)
    }

    /// Link property values, by link index
    pub fn link_property<P: 'static>(&self, name: &str) -> DatastructureResult<&[P]> {
        self.links.properties().get::<P>(name)
    }

    /// Mutable link property values, by link index
    pub fn link_property_mut<P: 'static>(&mut self, name: &str) -> DatastructureResult<&mut [P]> {
        self.links.properties_mut().get_mut::<P>(name)
    }

    /// Face property values, by face index
    pub fn face_property<P: 'static>(&self, name: &str) -> DatastructureResult<&[P]> {
        self.faces.properties().get::<P>(name)
    }

    /// Mutable face property values, by face index
    pub fn face_property_mut<P: 'static>(&mut self, name: &str) -> DatastructureResult<&mut [P]> {
        self.faces.properties_mut().get_mut::<P>(name)
    }

    /// Detaches an atom property
    pub fn remove_atom_property(&mut self, name: &str) -> bool {
        self.atoms.properties_mut().remove(name)
    }

    /// Detaches a link property
    pub fn remove_link_property(&mut self, name: &str) -> bool {
        self.links.properties_mut().remove(name)
    }

    /// Detaches a face property
    pub fn remove_face_property(&mut self, name: &str) -> bool {
        self.faces.properties_mut().remove(name)
    }

    /// Atom properties registry
    pub fn atom_properties(&self) -> &PropertyRegistry {
        self.atoms.properties()
    }

    /// Mutable atom properties registry
    pub fn atom_properties_mut(&mut self) -> &mut PropertyRegistry {
        self.atoms.properties_mut()
    }

    /// Link properties registry
    pub fn link_properties(&self) -> &PropertyRegistry {
        self.links.properties()
    }

    /// Mutable link properties registry
    pub fn link_properties_mut(&mut self) -> &mut PropertyRegistry {
        self.links.properties_mut()
    }

    /// Face properties registry
    pub fn face_properties(&self) -> &PropertyRegistry {
        self.faces.properties()
    }

    /// Mutable face properties registry
    pub fn face_properties_mut(&mut self) -> &mut PropertyRegistry {
        self.faces.properties_mut()
    }

    /// Removes every element, keeping properties registered
    pub fn clear(&mut self) {
        self.faces.clear();
        self.links.clear();
        self.atoms.clear();
    }
}

impl<A: Default, L: Default, F: Default> Datastructure<A, L, F> {
    /// Adds a default atom
    pub fn create_atom(&mut self) -> AtomHandle {
        self.atoms.create(A::default())
    }

    /// Adds a default link
    pub fn create_link(&mut self) -> LinkHandle {
        self.links.create(L::default())
    }

    /// Adds a default face
    pub fn create_face(&mut self) -> FaceHandle {
        self.faces.create(F::default())
    }
}

impl<A, L, F> Default for Datastructure<A, L, F> {
    fn default() -> Self {
        Datastructure::new(0, 0, 0)
    }
}
