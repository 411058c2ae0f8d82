#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use gridcrate::{EntityRegistry, GridConfig, GridService};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};
use sea_orm_migration::prelude::*;
use serde_json::Value;

pub mod category_entity;
pub mod event_entity;
pub mod folder_entity;
pub mod product_entity;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub fn test_registry() -> EntityRegistry {
    let mut registry = EntityRegistry::new();
    registry
        .register::<product_entity::Entity>()
        .register_tree::<category_entity::Entity>();
    registry
}

pub fn setup_service(db: DatabaseConnection) -> GridService {
    GridService::new(db, test_registry(), GridConfig::default())
}

/// Service over the entities with timestamp fields of both chrono flavours
pub fn setup_schedule_service(db: DatabaseConnection) -> GridService {
    let mut registry = EntityRegistry::new();
    registry
        .register::<event_entity::Entity>()
        .register_tree::<folder_entity::Entity>();
    GridService::new(db, registry, GridConfig::default())
}

pub fn setup_test_app(service: GridService) -> Router {
    Router::new().nest("/grid", gridcrate::routes::router(service))
}

/// Insert `count` products named `Product 1`..`Product {count}` priced 1.0, 2.0, ...
pub async fn seed_products(db: &DatabaseConnection, count: i32) -> Result<(), DbErr> {
    for n in 1..=count {
        product_entity::ActiveModel {
            name: Set(format!("Product {n}")),
            price: Set(f64::from(n)),
            in_stock: Set(n % 2 == 0),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

pub async fn all_categories(db: &DatabaseConnection) -> Vec<category_entity::Model> {
    category_entity::Entity::find()
        .all(db)
        .await
        .expect("Failed to load categories")
}

pub async fn find_category(db: &DatabaseConnection, id: i32) -> category_entity::Model {
    category_entity::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("Failed to load category")
        .expect("Category not found")
}

/// Assert the nested-set invariants over the whole categories table
pub async fn assert_tree_consistent(db: &DatabaseConnection) {
    let nodes = all_categories(db).await;
    let mut bounds: Vec<i32> = nodes.iter().flat_map(|n| [n.lft, n.rgt]).collect();
    bounds.sort_unstable();
    let slots = <i32 as TryFrom<usize>>::try_from(nodes.len() * 2).unwrap();
    let expected: Vec<i32> = (1..=slots).collect();
    assert_eq!(bounds, expected, "bounds must be a permutation of 1..=2n");

    for node in &nodes {
        assert!(node.lft < node.rgt, "node {} has lft >= rgt", node.id);
        let descendants = nodes
            .iter()
            .filter(|other| other.lft > node.lft && other.rgt < node.rgt)
            .count();
        assert_eq!(
            node.rgt - node.lft + 1,
            2 * (<i32 as TryFrom<usize>>::try_from(descendants).unwrap() + 1),
            "width of node {}",
            node.id
        );
        match node.parent_id {
            None => assert_eq!(node.lvl, 0, "root {} must be level 0", node.id),
            Some(parent_id) => {
                let parent = nodes.iter().find(|p| p.id == parent_id).unwrap();
                assert!(parent.lft < node.lft && node.rgt < parent.rgt);
                assert_eq!(node.lvl, parent.lvl + 1);
            }
        }
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(CreateProductTable),
            Box::new(CreateCategoryTable),
            Box::new(CreateScheduleTables),
        ]
    }
}

pub struct CreateProductTable;

impl MigrationName for CreateProductTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_product_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Products::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Products::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Products::Name).string().not_null())
            .col(ColumnDef::new(Products::Price).double().not_null())
            .col(
                ColumnDef::new(Products::InStock)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .col(ColumnDef::new(Products::Note).string().null())
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

pub struct CreateCategoryTable;

impl MigrationName for CreateCategoryTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_category_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateCategoryTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Categories::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Categories::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Categories::Title).string().not_null())
            .col(ColumnDef::new(Categories::Description).string().null())
            .col(ColumnDef::new(Categories::Lft).integer().not_null())
            .col(ColumnDef::new(Categories::Rgt).integer().not_null())
            .col(ColumnDef::new(Categories::Lvl).integer().not_null())
            .col(ColumnDef::new(Categories::ParentId).integer().null())
            .col(
                ColumnDef::new(Categories::CreatedAt)
                    .timestamp_with_time_zone()
                    .null(),
            )
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await
    }
}

pub struct CreateScheduleTables;

impl MigrationName for CreateScheduleTables {
    fn name(&self) -> &'static str {
        "m20240101_000003_create_schedule_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateScheduleTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::EventId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::StartsAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Folders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Folders::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Folders::Name).string().not_null())
                    .col(ColumnDef::new(Folders::Lft).integer().not_null())
                    .col(ColumnDef::new(Folders::Rgt).integer().not_null())
                    .col(ColumnDef::new(Folders::Lvl).integer().not_null())
                    .col(ColumnDef::new(Folders::ParentId).integer().null())
                    .col(ColumnDef::new(Folders::CreatedAt).date_time().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Folders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    EventId,
    Title,
    StartsAt,
}

#[derive(DeriveIden)]
enum Folders {
    Table,
    Id,
    Name,
    Lft,
    Rgt,
    Lvl,
    ParentId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Price,
    InStock,
    Note,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Title,
    Description,
    Lft,
    Rgt,
    Lvl,
    ParentId,
    CreatedAt,
}
