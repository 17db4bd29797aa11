//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Full book record (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    /// Public URL of the stored cover image, empty when none was uploaded
    pub image_url: String,
    /// Creating user. NULL only on rows imported without an owner; no
    /// endpoint produces such rows but the delete rules account for them.
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store input for a new record (id and timestamps are assigned by the store)
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub image_url: String,
    pub owner_id: Option<Uuid>,
}

/// Create book request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Please add a title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add an author"))]
    pub author: String,
    #[validate(length(min = 1, message = "Please add a genre"))]
    pub genre: String,
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: String,
}

/// Update book request. A field that is absent or empty keeps its stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

impl UpdateBook {
    /// Merge into an existing record. Non-empty incoming values win; absent
    /// and empty are treated alike so a partial form never blanks a field.
    pub fn apply_to(&self, book: &mut Book) {
        apply_field(&mut book.title, &self.title);
        apply_field(&mut book.author, &self.author);
        apply_field(&mut book.genre, &self.genre);
        apply_field(&mut book.description, &self.description);
    }
}

fn apply_field(target: &mut String, incoming: &Option<String>) {
    if let Some(value) = incoming {
        if !value.is_empty() {
            *target = value.clone();
        }
    }
}

/// Store-level filter for listing books
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring matched against title, author and genre
    pub text: Option<String>,
    /// Restrict results to records owned by this user
    pub owner_id: Option<Uuid>,
}

/// Search query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    pub query: Option<String>,
}
