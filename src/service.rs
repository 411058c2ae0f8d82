//! # Grid service
//!
//! The one entry point request handlers talk to. [`GridService`] carries the database
//! connection, the entity registry and the grid configuration it was built with.
//!
//! Two layers of operations:
//!
//! - typed: [`GridService::list_page`], [`GridService::create`], [`GridService::update`]
//!   and [`GridService::delete`] return `Result<_, GridError>`;
//! - envelope: [`GridService::grid_list`], [`GridService::create_record`] and friends never
//!   fail. Errors are logged and folded into a [`ResultEnvelope`] with `error: true`.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::RecordId;
use crate::config::GridConfig;
use crate::envelope::ResultEnvelope;
use crate::errors::GridError;
use crate::fields::Fields;
use crate::models::{GridQuery, MutationRequest, PageRequest, PageResult};
use crate::mutation;
use crate::registry::{EntityRegistry, GridColumn};

/// jqGrid edit operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOper {
    Add,
    Edit,
    Del,
}

impl EditOper {
    pub fn parse(oper: &str) -> Result<Self, GridError> {
        match oper.trim() {
            "add" => Ok(Self::Add),
            "edit" => Ok(Self::Edit),
            "del" => Ok(Self::Del),
            other => Err(GridError::invalid(format!("unknown oper '{other}'"))),
        }
    }
}

#[derive(Clone)]
pub struct GridService {
    db: DatabaseConnection,
    registry: Arc<EntityRegistry>,
    config: GridConfig,
}

impl GridService {
    #[must_use]
    pub fn new(db: DatabaseConnection, registry: EntityRegistry, config: GridConfig) -> Self {
        Self {
            db,
            registry: Arc::new(registry),
            config,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_page(&self, request: &PageRequest) -> Result<PageResult, GridError> {
        let store = self.registry.store(&request.entity_key)?;
        store.list_page(&self.db, request).await
    }

    pub async fn create(&self, entity: &str, fields: &Fields) -> Result<RecordId, GridError> {
        let store = self.registry.store(entity)?;
        let id = mutation::create(&self.db, store, fields).await?;
        tracing::info!(entity, id, "Record created");
        Ok(id)
    }

    pub async fn update(
        &self,
        entity: &str,
        id: RecordId,
        fields: &Fields,
    ) -> Result<RecordId, GridError> {
        let store = self.registry.store(entity)?;
        let id = mutation::update(&self.db, store, id, fields).await?;
        tracing::info!(entity, id, "Record updated");
        Ok(id)
    }

    pub async fn delete(&self, entity: &str, id: RecordId) -> Result<(), GridError> {
        let store = self.registry.store(entity)?;
        mutation::delete(&self.db, store, id).await?;
        tracing::info!(entity, id, "Record deleted");
        Ok(())
    }

    pub fn column_model(&self, entity: &str) -> Result<Vec<GridColumn>, GridError> {
        Ok(self.registry.resolve(entity)?.columns.clone())
    }

    /// List one page of an entity's grid
    pub async fn grid_list(&self, query: &GridQuery) -> ResultEnvelope {
        let result = match query.to_page_request(&self.config) {
            Ok(request) => self.list_page(&request).await,
            Err(error) => Err(error),
        };
        respond(&query.entity, result.map(ResultEnvelope::page))
    }

    pub async fn create_record(&self, request: &MutationRequest) -> ResultEnvelope {
        let result = match request.entity_key() {
            Ok(entity) => self.create(entity, &request.fields).await,
            Err(error) => Err(error),
        };
        respond(&request.entity, result.map(|id| ResultEnvelope::record("created", id)))
    }

    pub async fn update_record(&self, request: &MutationRequest) -> ResultEnvelope {
        let result = match (request.entity_key(), request.record_id()) {
            (Ok(entity), Ok(id)) => self.update(entity, id, &request.fields).await,
            (Err(error), _) | (_, Err(error)) => Err(error),
        };
        respond(&request.entity, result.map(|id| ResultEnvelope::record("updated", id)))
    }

    pub async fn delete_record(&self, request: &MutationRequest) -> ResultEnvelope {
        let result = match (request.entity_key(), request.record_id()) {
            (Ok(entity), Ok(id)) => self.delete(entity, id).await.map(|()| id),
            (Err(error), _) | (_, Err(error)) => Err(error),
        };
        respond(&request.entity, result.map(|id| ResultEnvelope::record("deleted", id)))
    }

    /// Dispatch a jqGrid edit post on its `oper` field.
    ///
    /// A missing `oper` reads as `edit` when the request carries an id and `add` otherwise.
    pub async fn edit_record(&self, request: &MutationRequest) -> ResultEnvelope {
        let oper = match request.oper.as_deref() {
            Some(oper) => EditOper::parse(oper),
            None if request.id.is_some() => Ok(EditOper::Edit),
            None => Ok(EditOper::Add),
        };
        match oper {
            Ok(EditOper::Add) => self.create_record(request).await,
            Ok(EditOper::Edit) => self.update_record(request).await,
            Ok(EditOper::Del) => self.delete_record(request).await,
            Err(error) => respond(&request.entity, Err(error)),
        }
    }

    /// Column model of an entity
    pub fn columns(&self, entity: &str) -> ResultEnvelope {
        let result = self.column_model(entity).map(ResultEnvelope::columns);
        respond(entity, result)
    }
}

fn respond(entity: &str, result: Result<ResultEnvelope, GridError>) -> ResultEnvelope {
    result.unwrap_or_else(|error| {
        error.log(Some(entity));
        ResultEnvelope::fail(&error)
    })
}

impl std::fmt::Debug for GridService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridService")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_oper() {
        assert_eq!(EditOper::parse("add").unwrap(), EditOper::Add);
        assert_eq!(EditOper::parse(" edit ").unwrap(), EditOper::Edit);
        assert_eq!(EditOper::parse("del").unwrap(), EditOper::Del);
        assert!(matches!(
            EditOper::parse("purge"),
            Err(GridError::InvalidInput(_))
        ));
    }
}
