//! API integration tests
//!
//! These run against a live server with a clean database:
//! start one locally, then `cargo test -- --ignored`.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:5000/api";

/// Build an email no previous run has registered
fn unique_email(tag: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}@example.com", tag, nanos)
}

/// Register a fresh account and return its bearer token
async fn register(client: &Client, email: &str) -> String {
    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse register response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn book_form(title: &str, author: &str, genre: &str, description: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("author", author.to_string())
        .text("genre", genre.to_string())
        .text("description", description.to_string())
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
async fn test_register_and_login() {
    let client = Client::new();
    let email = unique_email("login");

    let token = register(&client, &email).await;
    assert!(!token.is_empty());

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], email.as_str());
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email() {
    let client = Client::new();
    let email = unique_email("duplicate");

    register(&client, &email).await;

    let response = client
        .post(format!("{}/users/register", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let email = unique_email("badpass");

    register(&client, &email).await;

    let response = client
        .post(format!("{}/users/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_add_search_and_delete_book() {
    let client = Client::new();
    let token = register(&client, &unique_email("shelf")).await;
    let title = format!("Dune-{}", unique_email("t"));

    // Add a book with a cover image
    let form = book_form(&title, "Frank Herbert", "Science Fiction", "Desert planet epic").part(
        "image",
        Part::bytes(vec![0x89, 0x50, 0x4E, 0x47]).file_name("cover.png"),
    );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_str().expect("No book ID").to_string();
    let image_url = body["image_url"].as_str().expect("No image URL").to_string();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with("cover.png"));

    // The stored cover is served back
    let response = client
        .get(format!("http://localhost:5000{}", image_url))
        .send()
        .await
        .expect("Failed to fetch cover");
    assert!(response.status().is_success());

    // Search finds it
    let response = client
        .get(format!("{}/books/search?query={}", BASE_URL, title))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let matches = body.as_array().expect("Expected an array");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], book_id.as_str());

    // Delete it
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);

    // Gone
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_add_book_without_image() {
    let client = Client::new();
    let token = register(&client, &unique_email("noimage")).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(book_form("The Hobbit", "J.R.R. Tolkien", "Fantasy", "There and back again"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["image_url"], "");
}

#[tokio::test]
#[ignore]
async fn test_add_book_missing_fields() {
    let client = Client::new();
    let token = register(&client, &unique_email("invalid")).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(Form::new().text("title", "Orphan title"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_edit_book_merges_fields() {
    let client = Client::new();
    let token = register(&client, &unique_email("editor")).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(book_form("1984", "George Orwell", "Dystopia", "Big Brother"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_str().expect("No book ID").to_string();

    // Only the title travels; the other fields must survive
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(Form::new().text("title", "Nineteen Eighty-Four"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["title"], "Nineteen Eighty-Four");
    assert_eq!(body["author"], "George Orwell");
    assert_eq!(body["genre"], "Dystopia");
}

#[tokio::test]
#[ignore]
async fn test_edit_book_requires_ownership() {
    let client = Client::new();
    let owner_token = register(&client, &unique_email("owner")).await;
    let other_token = register(&client, &unique_email("other")).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner_token))
        .multipart(book_form("Emma", "Jane Austen", "Romance", "Matchmaking in Highbury"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_str().expect("No book ID").to_string();

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .multipart(Form::new().text("title", "Hijacked"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", other_token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_search_scoped_to_caller() {
    let client = Client::new();
    let first_token = register(&client, &unique_email("first")).await;
    let second_token = register(&client, &unique_email("second")).await;
    let title = format!("Solaris-{}", unique_email("t"));

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", first_token))
        .multipart(book_form(&title, "Stanislaw Lem", "Science Fiction", "Sentient ocean"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // The other account cannot see it in search results
    let response = client
        .get(format!("{}/books/search?query={}", BASE_URL, title))
        .header("Authorization", format!("Bearer {}", second_token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().expect("Expected an array").len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(book_form("Nope", "Nobody", "None", "No token attached"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
