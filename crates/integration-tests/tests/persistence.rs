//! Persisted client state on disk.
//!
//! These tests build `AppState` twice over the same directory to simulate a
//! restart. No backend calls are needed beyond construction.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{Value, json};
use tempfile::TempDir;

use avira_vastra_integration_tests::FakeBackend;
use avira_vastra_storefront::AppState;
use avira_vastra_storefront::models::{AdminUser, Product, User};

fn saree(id: &str, price: u32, stock: u32) -> Product {
    serde_json::from_value(json!({
        "_id": id,
        "name": format!("Saree {id}"),
        "price": price,
        "stock": stock
    }))
    .unwrap()
}

fn customer() -> User {
    serde_json::from_value(json!({
        "_id": "u-meera",
        "name": "Meera Shah",
        "email": "meera@example.in"
    }))
    .unwrap()
}

fn read_json(dir: &TempDir, key: &str) -> Option<Value> {
    let bytes = std::fs::read(dir.path().join(format!("{key}.json"))).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[tokio::test]
async fn test_cart_and_session_survive_restart() {
    let backend = FakeBackend::start().await;
    let dir = TempDir::new().unwrap();

    let state = AppState::new(backend.config(dir.path())).unwrap();
    state.cart().add_item(&saree("p1", 2500, 5), 2);
    state.cart().add_item(&saree("p2", 1800, 5), 1);
    state.session().login(customer(), "tok-1");

    let cart_file = read_json(&dir, "cart-storage").expect("cart file written");
    assert_eq!(cart_file["version"], 0);
    assert_eq!(cart_file["state"]["items"][0]["_id"], "p1");
    assert_eq!(cart_file["state"]["items"][0]["quantity"], 2);

    let auth_file = read_json(&dir, "auth-storage").expect("session file written");
    assert_eq!(auth_file["state"]["isAuthenticated"], true);
    assert_eq!(auth_file["state"]["user"]["email"], "meera@example.in");
    assert!(read_json(&dir, "token").is_some());

    let restarted = AppState::new(backend.config(dir.path())).unwrap();
    assert_eq!(restarted.cart().item_count(), 3);
    assert_eq!(restarted.cart().total(), rust_decimal::Decimal::from(6800));
    assert_eq!(restarted.session().user().unwrap().name, "Meera Shah");
}

#[tokio::test]
async fn test_logout_purges_token_file() {
    let backend = FakeBackend::start().await;
    let dir = TempDir::new().unwrap();

    let state = AppState::new(backend.config(dir.path())).unwrap();
    state.session().login(customer(), "tok-1");
    state.session().logout();

    assert!(read_json(&dir, "token").is_none());
    let auth_file = read_json(&dir, "auth-storage").unwrap();
    assert_eq!(auth_file["state"]["isAuthenticated"], false);

    let restarted = AppState::new(backend.config(dir.path())).unwrap();
    assert!(!restarted.session().is_authenticated());
}

#[tokio::test]
async fn test_corrupt_state_starts_empty() {
    let backend = FakeBackend::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cart-storage.json"), b"{ not json").unwrap();
    std::fs::write(
        dir.path().join("auth-storage.json"),
        br#"{"state": {"user": {"_id": "u1"}, "isAuthenticated": true}, "version": 0}"#,
    )
    .unwrap();

    let state = AppState::new(backend.config(dir.path())).unwrap();
    assert!(state.cart().is_empty());
    // A user without a token is not a session.
    assert!(!state.session().is_authenticated());

    // The next write replaces the corrupt file.
    state.cart().add_item(&saree("p1", 900, 3), 1);
    let cart_file = read_json(&dir, "cart-storage").unwrap();
    assert_eq!(cart_file["state"]["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn test_admin_session_is_separate() {
    let backend = FakeBackend::start().await;
    let dir = TempDir::new().unwrap();
    let admin: AdminUser = serde_json::from_value(json!({
        "_id": "a1",
        "name": "Store Admin",
        "email": "admin@aviravastra.in"
    }))
    .unwrap();

    let state = AppState::new(backend.config(dir.path())).unwrap();
    state.admin_session().login(admin, "adm-1");

    let restarted = AppState::new(backend.config(dir.path())).unwrap();
    assert!(restarted.admin_session().is_authenticated());
    assert!(!restarted.session().is_authenticated());
    assert!(read_json(&dir, "adminToken").is_some());
    assert_eq!(read_json(&dir, "adminData").unwrap()["state"]["name"], "Store Admin");

    restarted.admin_session().logout();
    let again = AppState::new(backend.config(dir.path())).unwrap();
    assert!(!again.admin_session().is_authenticated());
}
