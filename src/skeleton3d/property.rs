use std::any::{type_name, Any};

use crate::skeleton3d::error::{DatastructureError, DatastructureResult};

/// Type-erased array of per-element values
///
/// A column holds one value per element of its category, at the element
/// index. Dropping the column drops every value it holds.
pub trait PropertyColumn: Any + Send + Sync {
    /// Property name, unique in its registry
    fn name(&self) -> &str;
    /// Name of the stored value type
    fn type_name(&self) -> &'static str;
    /// Number of stored values
    fn len(&self) -> usize;
    /// Appends a default value for a newly created element
    fn push_default(&mut self);
    /// Drops the value at `index` and moves the last value there
    fn swap_remove(&mut self, index: usize);
    /// Drops every value
    fn clear(&mut self);
    /// Reserves room for `additional` values
    fn reserve(&mut self, additional: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Column storing values of type `T`
pub struct TypedColumn<T> {
    name: String,
    values: Vec<T>,
}

impl<T: Default + Send + Sync + 'static> TypedColumn<T> {
    /// Column constructor, filled with `len` default values
    pub fn new(name: &str, len: usize) -> TypedColumn<T> {
        let mut values = Vec::with_capacity(len);
        values.resize_with(len, T::default);
        TypedColumn {
            name: name.to_string(),
            values,
        }
    }

    /// Stored values, by element index
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Mutable stored values, by element index
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T: Default + Send + Sync + 'static> PropertyColumn for TypedColumn<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn push_default(&mut self) {
        self.values.push(T::default());
    }

    fn swap_remove(&mut self, index: usize) {
        debug_assert!(index < self.values.len(), "property \"{}\" out of sync", self.name);
        self.values.swap_remove(index);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Named properties attached to one element category
#[derive(Default)]
pub struct PropertyRegistry {
    columns: Vec<Box<dyn PropertyColumn>>,
}

impl PropertyRegistry {
    /// Empty registry constructor
    pub fn new() -> PropertyRegistry {
        PropertyRegistry {
            columns: Vec::new(),
        }
    }

    /// Adds a property holding `len` default values
    ///
    /// `len` must be the element count of the category; properties are
    /// added through the owning element set.
    pub(super) fn add<T: Default + Send + Sync + 'static>(&mut self, name: &str, len: usize) -> DatastructureResult<usize> {
        if self.position(name).is_some() {
            return Err(DatastructureError::DuplicateProperty(name.to_string()));
        }
        self.columns.push(Box::new(TypedColumn::<T>::new(name, len)));
        Ok(self.columns.len() - 1)
    }

    /// Position of a property, if it exists
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    /// Removes a property, dropping all its values
    ///
    /// Positions of the properties added after it shift down by one.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(position) => {
                self.columns.remove(position);
                true
            }
            None => false,
        }
    }

    /// Values of the property at a given position
    pub fn column<T: 'static>(&self, position: usize) -> DatastructureResult<&[T]> {
        let column = self
            .columns
            .get(position)
            .ok_or(DatastructureError::UnknownPropertyPosition(position))?;
        column
            .as_any()
            .downcast_ref::<TypedColumn<T>>()
            .map(|typed| typed.values.as_slice())
            .ok_or_else(|| DatastructureError::PropertyTypeMismatch {
                name: column.name().to_string(),
                requested: type_name::<T>(),
            })
    }

    /// Mutable values of the property at a given position
    pub fn column_mut<T: 'static>(&mut self, position: usize) -> DatastructureResult<&mut [T]> {
        let column = self
            .columns
            .get_mut(position)
            .ok_or(DatastructureError::UnknownPropertyPosition(position))?;
        let name = column.name().to_string();
        column
            .as_any_mut()
            .downcast_mut::<TypedColumn<T>>()
            .map(|typed| typed.values.as_mut_slice())
            .ok_or(DatastructureError::PropertyTypeMismatch {
                name,
                requested: type_name::<T>(),
            })
    }

    /// Values of a property
    pub fn get<T: 'static>(&self, name: &str) -> DatastructureResult<&[T]> {
        let position = self
            .position(name)
            .ok_or_else(|| DatastructureError::UnknownProperty(name.to_string()))?;
        self.column(position)
    }

    /// Mutable values of a property
    pub fn get_mut<T: 'static>(&mut self, name: &str) -> DatastructureResult<&mut [T]> {
        let position = self
            .position(name)
            .ok_or_else(|| DatastructureError::UnknownProperty(name.to_string()))?;
        self.column_mut(position)
    }

    /// Names of the properties, by position
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|column| column.name())
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Checks if no property is registered
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(super) fn push_default(&mut self) {
        for column in self.columns.iter_mut() {
            column.push_default();
        }
    }

    pub(super) fn swap_remove(&mut self, index: usize) {
        for column in self.columns.iter_mut() {
            column.swap_remove(index);
        }
    }

    pub(super) fn clear_values(&mut self) {
        for column in self.columns.iter_mut() {
            column.clear();
        }
    }

    pub(super) fn reserve(&mut self, additional: usize) {
        for column in self.columns.iter_mut() {
            column.reserve(additional);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_access() {
        let mut registry = PropertyRegistry::new();
        let pos = registry.add::<f32>("weight", 3).unwrap();
        assert_eq!(pos, 0);
        assert_eq!(registry.get::<f32>("weight").unwrap(), &[0.0, 0.0, 0.0]);

        registry.column_mut::<f32>(pos).unwrap()[1] = 2.5;
        assert_eq!(registry.column::<f32>(pos).unwrap()[1], 2.5);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = PropertyRegistry::new();
        registry.add::<u8>("label", 0).unwrap();
        assert_eq!(
            registry.add::<u32>("label", 0),
            Err(DatastructureError::DuplicateProperty("label".to_string()))
        );
    }

    #[test]
    fn type_is_checked() {
        let mut registry = PropertyRegistry::new();
        registry.add::<u8>("label", 2).unwrap();
        assert!(matches!(
            registry.get::<u32>("label"),
            Err(DatastructureError::PropertyTypeMismatch { .. })
        ));
        assert!(matches!(
            registry.get::<u8>("missing"),
            Err(DatastructureError::UnknownProperty(_))
        ));
    }

    #[test]
    fn values_follow_elements() {
        let mut registry = PropertyRegistry::new();
        registry.add::<String>("name", 0).unwrap();
        registry.add::<usize>("id", 0).unwrap();
        for i in 0..3 {
            registry.push_default();
            registry.get_mut::<String>("name").unwrap()[i] = format!("e{}", i);
            registry.get_mut::<usize>("id").unwrap()[i] = i;
        }

        registry.swap_remove(0);
        assert_eq!(registry.get::<String>("name").unwrap(), &["e2", "e1"]);
        assert_eq!(registry.get::<usize>("id").unwrap(), &[2, 1]);

        assert!(registry.remove("name"));
        assert!(!registry.remove("name"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["id"]);
    }
}
