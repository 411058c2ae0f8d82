//! Create, update and delete against a resolved store.
//!
//! Hierarchical creates run in two phases inside [`crate::store::TreeStore`]. The
//! structural insert commits first, then the node is reloaded by id and its business
//! fields are written in a second save. A failure in the second phase leaves a committed
//! node carrying only its seed fields.

use sea_orm::DatabaseConnection;

use crate::RecordId;
use crate::errors::GridError;
use crate::fields::{Fields, parse_record_id};
use crate::store::EntityStore;
use crate::tree::Placement;

/// Key of the field naming the parent of a new tree node
pub const PARENT_FIELD: &str = "parent";

/// Create a record and return its id.
pub async fn create(
    db: &DatabaseConnection,
    store: &dyn EntityStore,
    fields: &Fields,
) -> Result<RecordId, GridError> {
    let mut fields = fields.clone();
    fields.remove("id");
    store.create(db, &fields).await
}

/// Where a new node goes given the raw parent reference.
///
/// Anything that does not resolve to an existing record makes the node a root.
pub(crate) async fn placement(
    db: &DatabaseConnection,
    store: &dyn EntityStore,
    parent: Option<serde_json::Value>,
) -> Result<Placement, GridError> {
    let Some(parent_id) = parent.as_ref().and_then(parse_record_id) else {
        return Ok(Placement::LastRoot);
    };
    if store.exists(db, parent_id).await? {
        Ok(Placement::FirstChildOf(parent_id))
    } else {
        tracing::debug!(
            entity = %store.descriptor().key,
            parent = parent_id,
            "Parent not found, inserting as root"
        );
        Ok(Placement::LastRoot)
    }
}

/// Apply `fields` to record `id`. Only the given fields change.
pub async fn update(
    db: &DatabaseConnection,
    store: &dyn EntityStore,
    id: RecordId,
    fields: &Fields,
) -> Result<RecordId, GridError> {
    let mut fields = fields.clone();
    fields.remove("id");
    store.update(db, id, &fields).await
}

pub async fn delete(
    db: &DatabaseConnection,
    store: &dyn EntityStore,
    id: RecordId,
) -> Result<(), GridError> {
    store.delete(db, id).await
}
