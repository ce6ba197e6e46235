//! Named categories for cross-cutting filtering.
//!
//! A [`Category`] is attached to individual log calls independently of
//! severity (`AUDIT`, `SECURITY`, ...). Sinks and routes match on it.
//! Categories are interned by a [`CategoryRegistry`]: asking twice for the
//! same name yields the same identity.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

/// An interned category name.
///
/// Cheap to clone. Equality and hashing go by name, so categories from
/// different registries still compare equal; categories from the same
/// registry are also pointer-identical (see [`Category::ptr_eq`]).
#[derive(Clone)]
pub struct Category {
    name: Arc<str>,
}

impl Category {
    /// Name of the category.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both handles point at the same interned identity.
    pub fn ptr_eq(&self, other: &Category) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.name == other.name
    }
}

impl Eq for Category {}

impl std::hash::Hash for Category {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Category").field(&&*self.name).finish()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Append-only interning table for categories.
///
/// Registration races on the same name are settled by the map's entry
/// lock: the first writer's identity is kept and every later lookup
/// returns it.
#[derive(Debug, Default)]
pub struct CategoryRegistry {
    categories: DashMap<Arc<str>, Category>,
}

impl CategoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the category for `name`, registering it on first use.
    pub fn intern(&self, name: &str) -> Category {
        if let Some(existing) = self.categories.get(name) {
            return existing.clone();
        }

        let key: Arc<str> = Arc::from(name);
        self.categories
            .entry(Arc::clone(&key))
            .or_insert_with(|| Category { name: key })
            .clone()
    }

    /// Look up a category without registering it.
    pub fn get(&self, name: &str) -> Option<Category> {
        self.categories.get(name).map(|entry| entry.clone())
    }

    /// Number of registered categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .categories
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        names.sort();
        names
    }
}
