use gridcrate::{GridResource, NestedSetResource, RecordId, TreeNode};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Tree entity whose creation stamp is a naive `DateTime`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "folders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub lft: i32,
    pub rgt: i32,
    pub lvl: i32,
    pub parent_id: Option<i32>,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl GridResource for Entity {
    type Entity = Self;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const ENTITY_KEY: &'static str = "folders";
    const TYPE_NAME: &'static str = "Folder";
    const ID_COLUMN: Column = Column::Id;

    fn record_id(model: &Model) -> RecordId {
        model.id
    }

    fn columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("lft", Column::Lft),
            ("rgt", Column::Rgt),
            ("lvl", Column::Lvl),
            ("parent_id", Column::ParentId),
            ("created_at", Column::CreatedAt),
        ]
    }

    fn created_at_column() -> Option<Column> {
        Some(Column::CreatedAt)
    }
}

impl NestedSetResource for Entity {
    const LEFT_COLUMN: Column = Column::Lft;
    const RIGHT_COLUMN: Column = Column::Rgt;
    const LEVEL_COLUMN: Column = Column::Lvl;
    const PARENT_COLUMN: Column = Column::ParentId;
    const SEED_FIELDS: &'static [&'static str] = &["name"];

    fn node(model: &Model) -> TreeNode {
        TreeNode {
            id: model.id,
            left: model.lft,
            right: model.rgt,
            level: model.lvl,
        }
    }
}
