//! API integration tests
//!
//! These run against a live server with a seeded database:
//! `cargo test -- --ignored`. Expected seed: an admin staff account
//! (`admin@localibrary.org` / `admin123`) and at least one approved library
//! (`biblioteca@localibrary.org` / `biblioteca123`, id 1).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

async fn library_token(client: &Client) -> String {
    login(client, "biblioteca@localibrary.org", "biblioteca123").await
}

async fn admin_token(client: &Client) -> String {
    login(client, "admin@localibrary.org", "admin123").await
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_returns_bearer_token() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@localibrary.org",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["expires_in"].as_i64().unwrap() > 0);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@localibrary.org",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unknown_and_wrong_password_same_message() {
    let client = Client::new();

    let wrong_password = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "admin@localibrary.org", "password": "nope" }))
        .send()
        .await
        .expect("Failed to send request");
    let unknown_email = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": "ghost@localibrary.org", "password": "nope" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
#[ignore]
async fn test_me_reflects_token_claims() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "ROLE_ADMIN");
    assert_eq!(body["principal_type"], "STAFF");
}

#[tokio::test]
#[ignore]
async fn test_anonymous_can_browse_catalog() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?title=", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());

    let response = client
        .get(format!("{}/libraries", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_protected_route_rejects_missing_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/libraries/1/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_protected_route_rejects_tampered_token() {
    let client = Client::new();
    let mut token = library_token(&client).await;
    token.pop();
    token.push('x');

    let response = client
        .get(format!("{}/libraries/1/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_ownership_rejects_foreign_library() {
    let client = Client::new();
    let token = library_token(&client).await;

    // Library id 1's token must not manage library 9999's catalog,
    // whatever exists there.
    let response = client
        .get(format!("{}/libraries/9999/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_staff_token_cannot_manage_library_catalog() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/libraries/1/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    // Ownership, not role, is what counts on library-scoped resources
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_moderator_management_is_admin_only() {
    let client = Client::new();
    let token = library_token(&client).await;

    let response = client
        .get(format!("{}/admin/moderators", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_add_and_remove_holding() {
    let client = Client::new();
    let token = library_token(&client).await;

    let response = client
        .post(format!("{}/libraries/1/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "isbn": "978-0-00-000000-2",
            "title": "Integration Test Book",
            "author": "Test Author",
            "genre_ids": [],
            "copies": 3
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["book_id"].as_i64().expect("No book id");
    assert_eq!(body["copies"], 3);

    let response = client
        .delete(format!("{}/libraries/1/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_register_library_starts_pending() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "trade_name": "Test Library",
            "legal_name": "Test Library Ltd",
            "registration_number": "12345678000199",
            "email": "new-library@localibrary.org",
            "password": "library123",
            "address": {
                "zip_code": "01310-100",
                "street": "Avenida Paulista",
                "number": "1578",
                "city": "São Paulo",
                "state": "SP"
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "pending");

    // A pending library cannot log in yet
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "new-library@localibrary.org",
            "password": "library123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
