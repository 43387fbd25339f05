//! Checkout, stock and permission enforcement against a running server.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The server running (cargo run -p caja-server)

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use caja_client::actions::{products, sales, users};
use caja_client::{Checkout, PaymentKind};
use caja_core::cart::{Cart, SalesProduct};
use caja_core::dto::auth::LoginData;
use caja_core::dto::products::NewProduct;
use caja_core::dto::sales::{CreateSaleRequest, SaleFilter};
use caja_core::dto::users::NewUser;
use caja_core::ProfileId;
use caja_integration_tests::{admin, signed_in, unique};

async fn stocked_product(api: &caja_client::Api<caja_client::HttpInvoker>, stock: i32) -> SalesProduct {
    let code = unique("IT");
    let product = products::create(
        api,
        &NewProduct {
            name: format!("Test product {code}"),
            category_id: None,
            code,
            stock,
            price: Decimal::from(100),
            cost: Decimal::from(60),
            tax: Decimal::from(16),
        },
    )
    .await
    .unwrap();
    SalesProduct::from(&product)
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_out_of_range_amounts_are_rejected() {
    let (_auth, api) = admin().await;
    let product = stocked_product(&api, 5).await;

    let mut cart = Cart::new();
    cart.add(&product);
    let mut checkout = Checkout::new();
    checkout.set_kind(PaymentKind::Card);
    let methods = sales::payment_methods(&api).await.unwrap();
    let valid: CreateSaleRequest = checkout.build_request(&cart, &methods).unwrap();

    let mut huge = valid.clone();
    huge.items[0].unit_price = Decimal::MAX;
    huge.items[0].quantity = 2;
    let err = sales::create(&api, &huge).await.unwrap_err();
    assert!(err.to_string().starts_with("invalid price or tax rate"));

    let mut negative = valid;
    negative.items[0].tax_rate = Decimal::new(-16, 2);
    let err = sales::create(&api, &negative).await.unwrap_err();
    assert!(err.to_string().starts_with("invalid price or tax rate"));

    let untouched = products::get(&api, product.id).await.unwrap();
    assert_eq!(untouched.stock, 5);
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_cash_sale_decrements_stock() {
    let (_auth, api) = admin().await;
    let product = stocked_product(&api, 2).await;

    let mut cart = Cart::new();
    cart.add(&product);
    cart.add(&product);

    let mut checkout = Checkout::new();
    checkout.set_cash_received("300");
    assert_eq!(checkout.change(cart.totals().total), Decimal::from(68));

    let methods = sales::payment_methods(&api).await.unwrap();
    let request = checkout.build_request(&cart, &methods).unwrap();
    let receipt = sales::create(&api, &request).await.unwrap();
    assert_eq!(receipt.subtotal, Decimal::from(200));
    assert_eq!(receipt.total, Decimal::from(232));

    let after = products::get(&api, product.id).await.unwrap();
    assert_eq!(after.stock, 0);

    let again = sales::create(&api, &request).await.unwrap_err();
    assert!(again.to_string().starts_with("insufficient stock"));

    let history = sales::list(
        &api,
        &SaleFilter {
            page: 1,
            limit: 50,
            ..SaleFilter::default()
        },
    )
    .await
    .unwrap();
    assert!(history.sales.iter().any(|s| s.id == receipt.sale_id));
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_card_sale_and_rejections() {
    let (_auth, api) = admin().await;
    let product = stocked_product(&api, 5).await;
    let methods = sales::payment_methods(&api).await.unwrap();

    let mut cart = Cart::new();
    cart.add(&product);
    let mut checkout = Checkout::new();
    checkout.set_kind(PaymentKind::Card);
    let request = checkout.build_request(&cart, &methods).unwrap();
    sales::create(&api, &request).await.unwrap();

    let empty = CreateSaleRequest {
        items: Vec::new(),
        ..request
    };
    let err = sales::create(&api, &empty).await.unwrap_err();
    assert!(err.to_string().starts_with("Bad request"));
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_cashier_cannot_manage_users() {
    let (_admin_auth, admin_api) = admin().await;
    let username = unique("cajero");
    let password = "cashier-password-1".to_owned();

    let cashier_profile = users::profiles(&admin_api)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Cashier")
        .map_or(ProfileId::new(2), |p| p.id);

    users::create(
        &admin_api,
        &NewUser {
            username: username.clone(),
            email: format!("{username}@tienda.mx"),
            password: password.clone(),
            first_name: "Ana".to_owned(),
            last_name: "López".to_owned(),
            profile_id: cashier_profile,
        },
    )
    .await
    .unwrap();

    let (auth, api) = signed_in(LoginData { username, password }).await;
    assert!(auth.has_permission("sales.create"));
    assert!(!auth.has_permission("users.view"));

    let denied = users::list(&api, 1, 10, None).await.unwrap_err();
    assert_eq!(denied.to_string(), "Permission denied: users.view");
}
