//! Integration tests for the products domain against real PostgreSQL.

use domain_categories::{CategoryRepository, CreateCategory, PgCategoryRepository};
use domain_products::stock::{current_stock, decrement_stock, find_products_by_ids};
use domain_products::*;
use sea_orm::TransactionTrait;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn input(name: String, price: i64, stock: i32, categories: Vec<i32>) -> ProductInput {
    ProductInput {
        name,
        price,
        stock,
        categories,
    }
}

async fn category(repo: &PgCategoryRepository, name: &str) -> i32 {
    repo.create(CreateCategory {
        name: name.to_string(),
        description: String::new(),
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_product_crud_with_categories() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("product_crud");

    let drinks = category(&categories, "Minuman").await;
    let coffee = category(&categories, "Kopi").await;

    let created = repo
        .create(input(builder.name("product", "latte"), 25000, 4, vec![drinks, coffee, drinks]))
        .await
        .unwrap();
    let names: Vec<_> = created.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Kopi", "Minuman"]);
    assert_eq!(db.count_rows("product_categories").await, 2);

    let updated = repo
        .update(created.id, input(builder.name("product", "latte"), 27000, 2, vec![drinks]))
        .await
        .unwrap();
    assert_eq!(updated.price, 27000);
    assert_eq!(updated.categories.len(), 1);
    assert_eq!(db.count_rows("product_categories").await, 1);

    let fetched = assert_some(repo.get_by_id(created.id).await.unwrap(), "product should exist");
    assert_id_eq(fetched.id, created.id, "fetched product");

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert_eq!(db.count_rows("product_categories").await, 0);
}

#[tokio::test]
async fn test_unknown_category_rolls_back_create() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let result = repo
        .create(input("Teh".to_string(), 5000, 1, vec![404]))
        .await;

    assert!(matches!(result, Err(ProductError::Validation(ref m)) if m.contains("404")));
    assert_eq!(db.count_rows("products").await, 0);
}

#[tokio::test]
async fn test_update_unknown_product_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let result = repo.update(999, input("Ghost".to_string(), 1, 1, vec![])).await;
    assert!(matches!(result, Err(ProductError::NotFound(999))));
}

#[tokio::test]
async fn test_deleting_category_unlinks_products() {
    let db = TestDatabase::new().await;
    let categories = PgCategoryRepository::new(db.connection());
    let repo = PgProductRepository::new(db.connection());

    let snacks = category(&categories, "Snack").await;
    let product = repo
        .create(input("Keripik".to_string(), 8000, 9, vec![snacks]))
        .await
        .unwrap();

    assert!(categories.delete(snacks).await.unwrap());

    let reloaded = repo.get_by_id(product.id).await.unwrap().unwrap();
    assert!(reloaded.categories.is_empty());
}

#[tokio::test]
async fn test_list_filters_by_ids_and_case_insensitive_name() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let a = repo.create(input("Kopi Susu".into(), 20000, 3, vec![])).await.unwrap();
    let b = repo.create(input("Teh Manis".into(), 6000, 3, vec![])).await.unwrap();
    let c = repo.create(input("KOPI Hitam".into(), 12000, 3, vec![])).await.unwrap();

    let by_name = repo
        .list(ProductFilter {
            ids: None,
            name: Some("kopi".into()),
        })
        .await
        .unwrap();
    assert_eq!(by_name.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a.id, c.id]);

    let by_ids = repo.find_by_ids(&[c.id, b.id, 9999]).await.unwrap();
    assert_eq!(by_ids.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b.id, c.id]);
}

#[tokio::test]
async fn test_conditional_decrement_inside_transaction() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let product = repo.create(input("A".into(), 1000, 5, vec![])).await.unwrap();

    let conn = db.connection();
    let txn = conn.begin().await.unwrap();

    let snapshots = find_products_by_ids(&txn, &[product.id, 4242]).await.unwrap();
    assert_eq!(snapshots.len(), 1);

    assert!(decrement_stock(&txn, product.id, 3).await.unwrap());
    assert!(!decrement_stock(&txn, product.id, 3).await.unwrap());
    assert_eq!(current_stock(&txn, product.id).await.unwrap(), Some(2));
    txn.rollback().await.unwrap();

    assert_eq!(current_stock(&conn, product.id).await.unwrap(), Some(5));
}
