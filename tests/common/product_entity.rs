use gridcrate::{GridResource, RecordId};
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub in_stock: bool,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl GridResource for Entity {
    type Entity = Self;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const ENTITY_KEY: &'static str = "products";
    const TYPE_NAME: &'static str = "Product";
    const ID_COLUMN: Column = Column::Id;

    fn record_id(model: &Model) -> RecordId {
        model.id
    }

    fn columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("price", Column::Price),
            ("in_stock", Column::InStock),
            ("note", Column::Note),
        ]
    }

    // Notes are free text: shown and editable, but not searchable
    fn sortable_columns() -> Vec<(&'static str, Column)> {
        Self::columns()
            .into_iter()
            .filter(|(name, _)| *name != "note")
            .collect()
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        Self::sortable_columns()
    }
}
