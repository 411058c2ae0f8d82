//! Type-erased access to one registered entity.
//!
//! [`EntityStore`] is what the registry hands out for a key. [`FlatStore`] and
//! [`TreeStore`] implement it for plain and nested-set resources; both share the generic
//! persistence helpers in this module and differ in how records are created and removed.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IdenStatic, IntoActiveModel, QueryFilter,
};
use serde_json::Value as Json;
use std::marker::PhantomData;

use crate::RecordId;
use crate::errors::GridError;
use crate::fields::{Fields, assign, populate, to_db_value};
use crate::models::{PageRequest, PageResult};
use crate::mutation::{PARENT_FIELD, placement};
use crate::query;
use crate::registry::EntityDescriptor;
use crate::traits::{GridResource, NestedSetResource};
use crate::tree;

#[async_trait]
pub trait EntityStore: Send + Sync {
    fn descriptor(&self) -> &EntityDescriptor;

    async fn list_page(
        &self,
        db: &DatabaseConnection,
        request: &PageRequest,
    ) -> Result<PageResult, GridError>;

    async fn exists(&self, db: &DatabaseConnection, id: RecordId) -> Result<bool, GridError>;

    /// Create a record from `fields` and return its id
    async fn create(
        &self,
        db: &DatabaseConnection,
        fields: &Fields,
    ) -> Result<RecordId, GridError>;

    /// Reload record `id`, apply `fields` and persist it
    async fn update(
        &self,
        db: &DatabaseConnection,
        id: RecordId,
        fields: &Fields,
    ) -> Result<RecordId, GridError>;

    async fn delete(&self, db: &DatabaseConnection, id: RecordId) -> Result<(), GridError>;
}

pub(crate) async fn find<R, C>(db: &C, id: RecordId) -> Result<Option<R::Model>, GridError>
where
    R: GridResource,
    C: ConnectionTrait,
{
    Ok(R::Entity::find()
        .filter(R::ID_COLUMN.eq(id))
        .one(db)
        .await?)
}

pub(crate) async fn load<R, C>(db: &C, id: RecordId) -> Result<R::Model, GridError>
where
    R: GridResource,
    C: ConnectionTrait,
{
    find::<R, C>(db, id)
        .await?
        .ok_or_else(|| GridError::not_found(R::TYPE_NAME, id))
}

async fn insert_record<R: GridResource>(
    db: &DatabaseConnection,
    fields: &Fields,
) -> Result<RecordId, GridError> {
    let mut record = <R::ActiveModel as ActiveModelBehavior>::new();
    populate::<R>(&mut record, fields, |_| true)?;
    let model = record.insert(db).await?;
    Ok(R::record_id(&model))
}

async fn update_record<R: GridResource>(
    db: &DatabaseConnection,
    id: RecordId,
    fields: &Fields,
    select: impl Fn(&str) -> bool + Send,
    stamp_created: bool,
) -> Result<RecordId, GridError> {
    let mut record: R::ActiveModel = load::<R, _>(db, id).await?.into_active_model();
    populate::<R>(&mut record, fields, select)?;
    if stamp_created {
        if let Some(column) = R::created_at_column() {
            let now = Json::String(Utc::now().to_rfc3339());
            let value = to_db_value(&column, &now)
                .map_err(|reason| GridError::invalid(format!("creation stamp: {reason}")))?;
            assign(&mut record, column.as_str(), column, value)?;
        }
    }
    if record.is_changed() {
        record.update(db).await?;
    }
    Ok(id)
}

async fn delete_record<R: GridResource>(
    db: &DatabaseConnection,
    id: RecordId,
) -> Result<(), GridError> {
    let result = R::Entity::delete_many()
        .filter(R::ID_COLUMN.eq(id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(GridError::not_found(R::TYPE_NAME, id));
    }
    Ok(())
}

/// Store for entities without hierarchy
pub struct FlatStore<R> {
    descriptor: EntityDescriptor,
    resource: PhantomData<fn() -> R>,
}

impl<R: GridResource> FlatStore<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: EntityDescriptor::flat::<R>(),
            resource: PhantomData,
        }
    }
}

impl<R: GridResource> Default for FlatStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: GridResource> EntityStore for FlatStore<R> {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    async fn list_page(
        &self,
        db: &DatabaseConnection,
        request: &PageRequest,
    ) -> Result<PageResult, GridError> {
        query::list_page::<R, _>(db, request).await
    }

    async fn exists(&self, db: &DatabaseConnection, id: RecordId) -> Result<bool, GridError> {
        Ok(find::<R, _>(db, id).await?.is_some())
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        fields: &Fields,
    ) -> Result<RecordId, GridError> {
        insert_record::<R>(db, fields).await
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: RecordId,
        fields: &Fields,
    ) -> Result<RecordId, GridError> {
        update_record::<R>(db, id, fields, |_| true, false).await
    }

    async fn delete(&self, db: &DatabaseConnection, id: RecordId) -> Result<(), GridError> {
        delete_record::<R>(db, id).await
    }
}

/// Store for nested-set entities
pub struct TreeStore<R> {
    descriptor: EntityDescriptor,
    tree_columns: Vec<&'static str>,
    resource: PhantomData<fn() -> R>,
}

impl<R: NestedSetResource> TreeStore<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: EntityDescriptor::tree::<R>(),
            tree_columns: R::tree_column_names(),
            resource: PhantomData,
        }
    }

    /// Save every field except the tree bookkeeping columns
    async fn save_fields(
        &self,
        db: &DatabaseConnection,
        id: RecordId,
        fields: &Fields,
        stamp_created: bool,
    ) -> Result<RecordId, GridError> {
        let tree_columns = &self.tree_columns;
        update_record::<R>(
            db,
            id,
            fields,
            |name| !tree_columns.iter().any(|column| *column == name),
            stamp_created,
        )
        .await
    }
}

impl<R: NestedSetResource> Default for TreeStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: NestedSetResource> EntityStore for TreeStore<R> {
    fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    async fn list_page(
        &self,
        db: &DatabaseConnection,
        request: &PageRequest,
    ) -> Result<PageResult, GridError> {
        query::list_page::<R, _>(db, request).await
    }

    async fn exists(&self, db: &DatabaseConnection, id: RecordId) -> Result<bool, GridError> {
        Ok(find::<R, _>(db, id).await?.is_some())
    }

    /// Two-phase create: the structural insert commits first, then the reloaded node
    /// gets its remaining fields and creation stamp.
    async fn create(
        &self,
        db: &DatabaseConnection,
        fields: &Fields,
    ) -> Result<RecordId, GridError> {
        let mut fields = fields.clone();
        let placement = placement(db, self, fields.remove(PARENT_FIELD)).await?;
        let id = tree::insert_node::<R>(db, placement, &fields).await?;
        self.save_fields(db, id, &fields, true).await
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: RecordId,
        fields: &Fields,
    ) -> Result<RecordId, GridError> {
        self.save_fields(db, id, fields, false).await
    }

    async fn delete(&self, db: &DatabaseConnection, id: RecordId) -> Result<(), GridError> {
        tree::delete_subtree::<R>(db, id).await
    }
}
