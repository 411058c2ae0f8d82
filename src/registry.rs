//! Entity resolution: from the key a grid request carries to the store that serves it.

use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::errors::GridError;
use crate::store::{EntityStore, FlatStore, TreeStore};
use crate::traits::{GridResource, NestedSetResource};

/// What the grid may do with one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GridColumn {
    pub name: String,
    pub sortable: bool,
    pub filterable: bool,
    pub editable: bool,
}

/// Everything known about a registered entity without touching its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EntityDescriptor {
    pub key: String,
    pub type_name: String,
    /// Created nodes are placed in a nested set
    pub supports_hierarchy: bool,
    pub columns: Vec<GridColumn>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn flat<R: GridResource>() -> Self {
        Self::build::<R>(false, &[])
    }

    /// Tree bookkeeping columns are reported as read-only
    #[must_use]
    pub fn tree<R: NestedSetResource>() -> Self {
        Self::build::<R>(true, &R::tree_column_names())
    }

    fn build<R: GridResource>(supports_hierarchy: bool, read_only: &[&str]) -> Self {
        let sortable = R::sortable_columns();
        let filterable = R::filterable_columns();
        let editable: Vec<_> = R::editable_columns()
            .into_iter()
            .filter(|(name, _)| !read_only.iter().any(|locked| locked == name))
            .collect();
        let has = |list: &[(&'static str, R::Column)], name: &str| {
            list.iter().any(|(candidate, _)| *candidate == name)
        };

        let columns = R::grid_columns()
            .into_iter()
            .map(|name| GridColumn {
                name: name.to_string(),
                sortable: has(&sortable, name),
                filterable: has(&filterable, name),
                editable: has(&editable, name),
            })
            .collect();

        Self {
            key: R::ENTITY_KEY.to_string(),
            type_name: R::TYPE_NAME.to_string(),
            supports_hierarchy,
            columns,
        }
    }
}

/// Maps entity keys to their stores.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct EntityRegistry {
    stores: HashMap<String, Box<dyn EntityStore>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flat entity under [`GridResource::ENTITY_KEY`]
    pub fn register<R: GridResource>(&mut self) -> &mut Self {
        self.insert(Box::new(FlatStore::<R>::new()))
    }

    /// Register a nested-set entity; created records become tree nodes
    pub fn register_tree<R: NestedSetResource>(&mut self) -> &mut Self {
        self.insert(Box::new(TreeStore::<R>::new()))
    }

    /// Register a custom store
    pub fn insert(&mut self, store: Box<dyn EntityStore>) -> &mut Self {
        let key = store.descriptor().key.clone();
        if self.stores.insert(key.clone(), store).is_some() {
            tracing::warn!(entity = %key, "Entity registered twice, keeping the last registration");
        }
        self
    }

    /// Resolve `key` to the description of its entity
    pub fn resolve(&self, key: &str) -> Result<&EntityDescriptor, GridError> {
        self.store(key).map(|store| store.descriptor())
    }

    pub fn store(&self, key: &str) -> Result<&dyn EntityStore, GridError> {
        self.stores
            .get(key.trim())
            .map(Box::as_ref)
            .ok_or_else(|| GridError::UnknownEntity(key.to_string()))
    }

    /// Registered keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
