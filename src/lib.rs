//! # gridcrate
//!
//! Glue between a jqGrid-style data grid and Sea-ORM entities. A grid request names an
//! entity by key; the crate resolves it through an [`EntityRegistry`], runs the list or
//! mutation against the database, and answers with a [`ResultEnvelope`].
//!
//! ```rust,ignore
//! let mut registry = EntityRegistry::new();
//! registry.register::<Product>().register_tree::<Category>();
//!
//! let service = GridService::new(db, registry, GridConfig::from_env()?);
//! let app = axum::Router::new().nest("/grid", gridcrate::routes::router(service));
//! ```

pub mod config;
pub mod envelope;
pub mod errors;
pub mod fields;
pub mod filter;
pub mod models;
pub mod mutation;
pub mod openapi;
pub mod pagination;
pub mod query;
pub mod registry;
pub mod routes;
pub mod service;
pub mod sort;
pub mod store;
pub mod traits;
pub mod tree;

/// Primary key type of every grid entity
pub type RecordId = i32;

pub use config::GridConfig;
pub use envelope::{Payload, ResultEnvelope};
pub use errors::GridError;
pub use models::{GridQuery, MutationRequest, PageRequest, PageResult};
pub use registry::{EntityDescriptor, EntityRegistry, GridColumn};
pub use service::GridService;
pub use traits::{GridResource, NestedSetResource, TreeNode};
