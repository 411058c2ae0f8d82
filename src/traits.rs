use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, IdenStatic,
    IntoActiveModel, ModelTrait,
};
use serde::Serialize;

use crate::RecordId;

/// A Sea-ORM entity exposed through the grid.
///
/// Implement it once per entity and register the type with
/// [`crate::EntityRegistry::register`]. Column lists name the model's serialized field
/// names.
///
/// ```rust,ignore
/// impl GridResource for Product {
///     type Entity = product::Entity;
///     type Model = product::Model;
///     type ActiveModel = product::ActiveModel;
///     type Column = product::Column;
///
///     const ENTITY_KEY: &'static str = "products";
///     const TYPE_NAME: &'static str = "Product";
///     const ID_COLUMN: product::Column = product::Column::Id;
///
///     fn record_id(model: &product::Model) -> RecordId { model.id }
///
///     fn columns() -> Vec<(&'static str, product::Column)> {
///         vec![("id", Column::Id), ("name", Column::Name), ("price", Column::Price)]
///     }
/// }
/// ```
pub trait GridResource: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, Column = Self::Column>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Serialize
        + Clone
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Column: ColumnTrait + Copy + Send + Sync;

    /// Key the grid uses to address this entity
    const ENTITY_KEY: &'static str;
    const TYPE_NAME: &'static str;
    const ID_COLUMN: Self::Column;

    fn record_id(model: &Self::Model) -> RecordId;

    /// Every column the grid may see, id included
    fn columns() -> Vec<(&'static str, Self::Column)>;

    #[must_use]
    fn sortable_columns() -> Vec<(&'static str, Self::Column)> {
        Self::columns()
    }

    #[must_use]
    fn filterable_columns() -> Vec<(&'static str, Self::Column)> {
        Self::columns()
    }

    /// Columns that create and update may write. Never includes the id.
    #[must_use]
    fn editable_columns() -> Vec<(&'static str, Self::Column)> {
        let id = Self::ID_COLUMN;
        Self::columns()
            .into_iter()
            .filter(|(_, column)| column.as_str() != id.as_str())
            .collect()
    }

    /// Serialized name of the primary key field, kept in every row
    #[must_use]
    fn id_field() -> &'static str {
        let id = Self::ID_COLUMN;
        Self::columns()
            .into_iter()
            .find(|(_, column)| column.as_str() == id.as_str())
            .map_or_else(|| id.as_str(), |(name, _)| name)
    }

    /// Columns serialized into grid rows
    #[must_use]
    fn grid_columns() -> Vec<&'static str> {
        Self::columns().into_iter().map(|(name, _)| name).collect()
    }

    /// Column stamped with the creation time when a tree node is created
    #[must_use]
    fn created_at_column() -> Option<Self::Column> {
        None
    }
}

/// Position bookkeeping of one nested-set node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub id: RecordId,
    pub left: i32,
    pub right: i32,
    pub level: i32,
}

impl TreeNode {
    /// Number of bound slots the node and its subtree occupy
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left + 1
    }
}

/// A [`GridResource`] stored as a nested set.
///
/// The bound, level and parent columns must be `i32` (`Option<i32>` for the parent).
/// They are owned by the tree code and never written from grid fields.
pub trait NestedSetResource: GridResource {
    const LEFT_COLUMN: Self::Column;
    const RIGHT_COLUMN: Self::Column;
    const LEVEL_COLUMN: Self::Column;
    const PARENT_COLUMN: Self::Column;

    /// Fields written together with the structural insert, e.g. NOT NULL columns
    const SEED_FIELDS: &'static [&'static str] = &[];

    fn node(model: &Self::Model) -> TreeNode;

    /// Names of the bookkeeping columns
    #[must_use]
    fn tree_column_names() -> Vec<&'static str> {
        let tree = [
            Self::LEFT_COLUMN,
            Self::RIGHT_COLUMN,
            Self::LEVEL_COLUMN,
            Self::PARENT_COLUMN,
        ];
        Self::columns()
            .into_iter()
            .filter(|(_, column)| tree.iter().any(|t| t.as_str() == column.as_str()))
            .map(|(name, _)| name)
            .collect()
    }
}
