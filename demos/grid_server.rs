//! Grid backend for a product list and a category tree
//!
//! ```bash
//! RUST_LOG=gridcrate=debug cargo run --example grid_server
//! ```
//!
//! Then visit:
//! - **Products**: <http://localhost:3000/grid/products?page=1&rows=10&sidx=price&sord=desc>
//! - **Categories**: <http://localhost:3000/grid/categories>
//! - **OpenAPI**: <http://localhost:3000/openapi.json>

use axum::{Json, Router, routing::get};
use gridcrate::{
    EntityRegistry, GridConfig, GridResource, GridService, NestedSetResource, RecordId,
    TreeNode, openapi::GridApiDoc,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod product {
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
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}
    impl ActiveModelBehavior for ActiveModel {}
}

mod category {
    use sea_orm::entity::prelude::*;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub lft: i32,
        pub rgt: i32,
        pub lvl: i32,
        pub parent_id: Option<i32>,
        pub created_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}
    impl ActiveModelBehavior for ActiveModel {}
}

impl GridResource for product::Entity {
    type Entity = Self;
    type Model = product::Model;
    type ActiveModel = product::ActiveModel;
    type Column = product::Column;

    const ENTITY_KEY: &'static str = "products";
    const TYPE_NAME: &'static str = "Product";
    const ID_COLUMN: product::Column = product::Column::Id;

    fn record_id(model: &product::Model) -> RecordId {
        model.id
    }

    fn columns() -> Vec<(&'static str, product::Column)> {
        use product::Column;
        vec![
            ("id", Column::Id),
            ("name", Column::Name),
            ("price", Column::Price),
            ("in_stock", Column::InStock),
        ]
    }
}

impl GridResource for category::Entity {
    type Entity = Self;
    type Model = category::Model;
    type ActiveModel = category::ActiveModel;
    type Column = category::Column;

    const ENTITY_KEY: &'static str = "categories";
    const TYPE_NAME: &'static str = "Category";
    const ID_COLUMN: category::Column = category::Column::Id;

    fn record_id(model: &category::Model) -> RecordId {
        model.id
    }

    fn columns() -> Vec<(&'static str, category::Column)> {
        use category::Column;
        vec![
            ("id", Column::Id),
            ("title", Column::Title),
            ("lft", Column::Lft),
            ("rgt", Column::Rgt),
            ("lvl", Column::Lvl),
            ("parent_id", Column::ParentId),
            ("created_at", Column::CreatedAt),
        ]
    }

    fn created_at_column() -> Option<category::Column> {
        Some(category::Column::CreatedAt)
    }
}

impl NestedSetResource for category::Entity {
    const LEFT_COLUMN: category::Column = category::Column::Lft;
    const RIGHT_COLUMN: category::Column = category::Column::Rgt;
    const LEVEL_COLUMN: category::Column = category::Column::Lvl;
    const PARENT_COLUMN: category::Column = category::Column::ParentId;
    const SEED_FIELDS: &'static [&'static str] = &["title"];

    fn node(model: &category::Model) -> TreeNode {
        TreeNode {
            id: model.id,
            left: model.lft,
            right: model.rgt,
            level: model.lvl,
        }
    }
}

async fn create_schema(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    for statement in [
        r"CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            in_stock BOOLEAN NOT NULL DEFAULT 1
        );",
        r"CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            lft INTEGER NOT NULL,
            rgt INTEGER NOT NULL,
            lvl INTEGER NOT NULL,
            parent_id INTEGER NULL,
            created_at TEXT NULL
        );",
    ] {
        db.execute_unprepared(statement).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GridConfig::from_env()?;
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = Database::connect(&database_url).await?;
    create_schema(&db).await?;

    let mut registry = EntityRegistry::new();
    registry
        .register::<product::Entity>()
        .register_tree::<category::Entity>();
    tracing::info!(entities = ?registry.keys(), ?config, "Grid registry ready");

    let service = GridService::new(db, registry, config);
    let app = Router::new()
        .nest("/grid", gridcrate::routes::router(service))
        .route("/openapi.json", get(|| async { Json(GridApiDoc::openapi()) }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Grid API on http://0.0.0.0:3000/grid");
    axum::serve(listener, app).await?;
    Ok(())
}
