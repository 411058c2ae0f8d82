use gridcrate::{EntityRegistry, GridError, GridResource};

mod common;
use common::{category_entity, product_entity, test_registry};

#[test]
fn test_resolve_registered_entities() {
    let registry = test_registry();

    let products = registry.resolve("products").unwrap();
    assert_eq!(products.type_name, "Product");
    assert!(!products.supports_hierarchy);

    let categories = registry.resolve("categories").unwrap();
    assert_eq!(categories.type_name, "Category");
    assert!(categories.supports_hierarchy);
    assert_eq!(categories.columns.len(), 8);
    let editable: Vec<&str> = categories
        .columns
        .iter()
        .filter(|column| column.editable)
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(editable, vec!["title", "description", "created_at"]);
}

#[test]
fn test_unknown_key() {
    let registry = test_registry();
    let error = registry.resolve("widgets").unwrap_err();
    assert!(matches!(error, GridError::UnknownEntity(key) if key == "widgets"));
    assert!(registry.store("").is_err());
}

#[test]
fn test_keys_are_sorted() {
    let registry = test_registry();
    assert_eq!(registry.keys(), vec!["categories", "products"]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_duplicate_registration_replaces_the_first() {
    let mut registry = EntityRegistry::new();
    assert!(registry.is_empty());
    registry.register::<category_entity::Entity>();
    registry.register_tree::<category_entity::Entity>();
    registry.register::<product_entity::Entity>();

    assert_eq!(registry.len(), 2);
    assert!(registry.resolve("categories").unwrap().supports_hierarchy);
}

#[test]
fn test_editable_columns_exclude_id() {
    let editable: Vec<&str> = product_entity::Entity::editable_columns()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(editable, vec!["name", "price", "in_stock", "note"]);
}
