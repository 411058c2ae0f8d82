use gridcrate::{GridResource, RecordId};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Flat entity with an offset timestamp and a primary key not called `id`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub event_id: i32,
    pub title: String,
    pub starts_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl GridResource for Entity {
    type Entity = Self;
    type Model = Model;
    type ActiveModel = ActiveModel;
    type Column = Column;

    const ENTITY_KEY: &'static str = "events";
    const TYPE_NAME: &'static str = "Event";
    const ID_COLUMN: Column = Column::EventId;

    fn record_id(model: &Model) -> RecordId {
        model.event_id
    }

    fn columns() -> Vec<(&'static str, Column)> {
        vec![
            ("event_id", Column::EventId),
            ("title", Column::Title),
            ("starts_at", Column::StartsAt),
        ]
    }

    fn grid_columns() -> Vec<&'static str> {
        vec!["title", "starts_at"]
    }
}
