//! Product and category management against a running server.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The server running (cargo run -p caja-server)

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use caja_client::actions::{categories, products};
use caja_core::dto::categories::{NewCategory, UpdateCategory};
use caja_core::dto::products::{NewProduct, UpdateProduct};
use caja_integration_tests::{admin, unique};

fn new_product(code: &str) -> NewProduct {
    NewProduct {
        name: format!("Test product {code}"),
        category_id: None,
        code: code.to_owned(),
        stock: 10,
        price: Decimal::new(2550, 2),
        cost: Decimal::new(1800, 2),
        tax: Decimal::from(16),
    }
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_product_lifecycle() {
    let (_auth, api) = admin().await;
    let code = unique("IT");

    let created = products::create(&api, &new_product(&code)).await.unwrap();
    assert_eq!(created.code, code);
    assert_eq!(created.tax, Decimal::from(16));

    let duplicate = products::create(&api, &new_product(&code)).await.unwrap_err();
    assert_eq!(duplicate.to_string(), "barcode already exists");

    let changes = UpdateProduct {
        stock: Some(3),
        ..UpdateProduct::default()
    };
    let updated = products::update(&api, created.id, &changes).await.unwrap();
    assert_eq!(updated.stock, 3);
    assert_eq!(updated.price, created.price);

    let fetched = products::get(&api, created.id).await.unwrap();
    assert_eq!(fetched.stock, 3);

    let deleted = products::delete(&api, created.id).await.unwrap();
    assert_eq!(deleted.id, created.id);
    let gone = products::get(&api, created.id).await.unwrap_err();
    assert!(gone.to_string().starts_with("Not found"));
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_product_paging() {
    let (_auth, api) = admin().await;

    let page = products::list(&api, Some(1), Some(2), None).await.unwrap();
    assert!(page.products.len() <= 2);
    assert_eq!(page.total_pages, page.total_items.div_ceil(2));

    let zero = products::list(&api, Some(1), Some(0), None).await.unwrap_err();
    assert!(zero.to_string().starts_with("Bad request"));
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_category_soft_and_hard_delete() {
    let (_auth, api) = admin().await;
    let name = unique("Categoría");

    let category = categories::create(&api, &NewCategory { name: name.clone() })
        .await
        .unwrap();
    assert!(category.is_active);

    let listed = categories::search(&api, Some(true), Some(&name)).await.unwrap();
    assert_eq!(listed.total, 1);

    let mut product = new_product(&unique("IT"));
    product.category_id = Some(category.id);
    let product = products::create(&api, &product).await.unwrap();

    let blocked = categories::hard_delete(&api, category.id).await.unwrap_err();
    assert!(blocked.to_string().contains("still has"));

    let renamed = categories::update(
        &api,
        category.id,
        &UpdateCategory {
            name: Some(format!("{name} 2")),
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, format!("{name} 2"));

    let soft = categories::delete(&api, category.id).await.unwrap();
    assert!(!soft.is_active);

    products::delete(&api, product.id).await.unwrap();
    categories::hard_delete(&api, category.id).await.unwrap();
    let gone = categories::get(&api, category.id).await.unwrap_err();
    assert!(gone.to_string().starts_with("Not found"));
}
