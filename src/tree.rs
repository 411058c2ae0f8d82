//! # Nested-set maintenance
//!
//! Nodes carry `left`/`right` bounds such that a node's descendants are exactly the nodes
//! whose bounds lie strictly inside its own. Every structural change shifts the bounds of
//! the nodes to its right, so each one runs in its own transaction.
//!
//! ```text
//!            Root(1,8)                    insert X as first child of Root:
//!           /        \                    every bound > 1 moves up by 2,
//!       A(2,5)      B(6,7)                X takes (2,3)
//!         |
//!       C(3,4)
//! ```

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IdenStatic, QueryFilter, QuerySelect, TransactionTrait, Value, sea_query::Expr,
};

use crate::RecordId;
use crate::errors::GridError;
use crate::fields::{Fields, assign, populate};
use crate::store::load;
use crate::traits::NestedSetResource;

/// Where a new node goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First child of an existing node
    FirstChildOf(RecordId),
    /// Last node on the root level
    LastRoot,
}

/// Insert a node with only its tree bookkeeping and seed fields, and commit.
///
/// Business fields are left to a later save: the bounds written here must be final before
/// anything else touches the row.
pub async fn insert_node<R: NestedSetResource>(
    db: &DatabaseConnection,
    placement: Placement,
    fields: &Fields,
) -> Result<RecordId, GridError> {
    let txn = db.begin().await?;

    let (left, level, parent) = match placement {
        Placement::FirstChildOf(parent_id) => {
            let parent = R::node(&load::<R, _>(&txn, parent_id).await?);
            shift_bounds::<R>(&txn, parent.left, 2).await?;
            (parent.left + 1, parent.level + 1, Some(parent.id))
        }
        Placement::LastRoot => (max_right::<R>(&txn).await? + 1, 0, None),
    };

    let mut node = <R::ActiveModel as ActiveModelBehavior>::new();
    populate::<R>(&mut node, fields, |name| {
        R::SEED_FIELDS.iter().any(|seed| *seed == name)
    })?;
    for (column, value) in [
        (R::LEFT_COLUMN, Value::from(left)),
        (R::RIGHT_COLUMN, Value::from(left + 1)),
        (R::LEVEL_COLUMN, Value::from(level)),
        (R::PARENT_COLUMN, Value::from(parent)),
    ] {
        assign(&mut node, column.as_str(), column, value)?;
    }
    let model = node.insert(&txn).await?;

    txn.commit().await?;

    let id = R::record_id(&model);
    tracing::debug!(entity = R::ENTITY_KEY, id, left, level, ?parent, "Inserted tree node");
    Ok(id)
}

/// Remove a node together with its subtree and close the gap it leaves.
pub async fn delete_subtree<R: NestedSetResource>(
    db: &DatabaseConnection,
    id: RecordId,
) -> Result<(), GridError> {
    let txn = db.begin().await?;

    let node = R::node(&load::<R, _>(&txn, id).await?);
    let removed = R::Entity::delete_many()
        .filter(R::LEFT_COLUMN.gte(node.left))
        .filter(R::RIGHT_COLUMN.lte(node.right))
        .exec(&txn)
        .await?;
    shift_bounds::<R>(&txn, node.right, -node.width()).await?;

    txn.commit().await?;

    tracing::debug!(
        entity = R::ENTITY_KEY,
        id,
        removed = removed.rows_affected,
        "Deleted tree node with subtree"
    );
    Ok(())
}

/// Move every bound greater than `after` by `delta`
async fn shift_bounds<R: NestedSetResource>(
    txn: &DatabaseTransaction,
    after: i32,
    delta: i32,
) -> Result<(), GridError> {
    for column in [R::RIGHT_COLUMN, R::LEFT_COLUMN] {
        R::Entity::update_many()
            .col_expr(column, Expr::col(column).add(delta))
            .filter(column.gt(after))
            .exec(txn)
            .await?;
    }
    Ok(())
}

async fn max_right<R: NestedSetResource>(txn: &DatabaseTransaction) -> Result<i32, GridError> {
    let max: Option<Option<i32>> = R::Entity::find()
        .select_only()
        .column_as(R::RIGHT_COLUMN.max(), "max_right")
        .into_tuple()
        .one(txn)
        .await?;
    Ok(max.flatten().unwrap_or(0))
}
