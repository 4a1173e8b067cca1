//! Class registry for compiled classes

use rustc_hash::FxHashMap;

use crate::object::Class;

/// Classes in registration order, looked up by id or name
#[derive(Debug, Default)]
pub struct ClassRegistry {
    /// Classes in registration order
    classes: Vec<Class>,
    /// Class ID to position mapping
    id_to_index: FxHashMap<usize, usize>,
    /// Class name to position mapping
    name_to_index: FxHashMap<String, usize>,
}

impl ClassRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, returns its ID.
    ///
    /// A later class with the same name shadows the earlier one for name
    /// lookups; both stay reachable by ID.
    pub fn register(&mut self, class: Class) -> usize {
        let id = class.id();
        let index = self.classes.len();

        self.name_to_index.insert(class.name().to_string(), index);
        self.id_to_index.insert(id, index);
        self.classes.push(class);

        id
    }

    /// Get class by ID
    pub fn get(&self, id: usize) -> Option<&Class> {
        self.id_to_index
            .get(&id)
            .and_then(|index| self.classes.get(*index))
    }

    /// Get class by name
    pub fn get_by_name(&self, name: &str) -> Option<&Class> {
        self.name_to_index
            .get(name)
            .and_then(|index| self.classes.get(*index))
    }

    /// Check if a class with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Iterate over all classes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ClassDecl;

    #[test]
    fn test_register_class() {
        let mut registry = ClassRegistry::new();
        let class = ClassDecl::new("Point").finish();
        let expected = class.id();

        let id = registry.register(class);
        assert_eq!(id, expected);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_class_by_id_and_name() {
        let mut registry = ClassRegistry::new();
        let id = registry.register(ClassDecl::new("Point").finish());

        assert_eq!(registry.get(id).unwrap().name(), "Point");
        assert_eq!(registry.get_by_name("Point").unwrap().id(), id);
        assert!(registry.get_by_name("Circle").is_none());
        assert!(registry.contains("Point"));
    }

    #[test]
    fn test_multiple_classes() {
        let mut registry = ClassRegistry::new();
        assert!(registry.is_empty());

        registry.register(ClassDecl::new("Point").finish());
        registry.register(ClassDecl::new("Circle").finish());

        let names: Vec<&str> = registry.iter().map(Class::name).collect();
        assert_eq!(names, vec!["Point", "Circle"]);
    }

    #[test]
    fn test_name_shadowing() {
        let mut registry = ClassRegistry::new();
        let first = registry.register(ClassDecl::new("Point").finish());
        let second = registry.register(ClassDecl::new("Point").finish());

        assert_eq!(registry.get_by_name("Point").unwrap().id(), second);
        assert!(registry.get(first).is_some());
    }
}
