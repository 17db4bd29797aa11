//! Book catalog endpoints
//!
//! Create and edit requests arrive as `multipart/form-data` so that a cover
//! image can travel alongside the text fields in a single request.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::multipart::{Field, Multipart};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, SearchQuery, UpdateBook},
    services::uploads::UploadedImage,
};

use super::AuthenticatedUser;

/// Multipart form layout shared by the create and edit endpoints.
///
/// Only used to document the request body; the fields are decoded by
/// [`read_book_form`] rather than through serde.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BookFormData {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    /// Cover image file
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

/// Text fields plus the optional cover image decoded from a multipart form
#[derive(Debug, Default)]
struct BookForm {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    description: Option<String>,
    image: Option<UploadedImage>,
}

fn multipart_error(err: axum_extra::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart request: {}", err))
}

async fn read_text(field: Field) -> AppResult<String> {
    field.text().await.map_err(multipart_error)
}

/// Decode the book form fields from a multipart body.
///
/// Unknown parts are skipped so clients may send extra fields without
/// breaking. A file part with no name and no content counts as "no image",
/// which is what browsers submit for an untouched file input.
async fn read_book_form(mut multipart: Multipart) -> AppResult<BookForm> {
    let mut form = BookForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        match name.as_str() {
            "title" => form.title = Some(read_text(field).await?),
            "author" => form.author = Some(read_text(field).await?),
            "genre" => form.genre = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                if !file_name.is_empty() || !data.is_empty() {
                    form.image = Some(UploadedImage {
                        file_name,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Add a book to the caller's shelf
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body(content = BookFormData, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing or empty field"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    let form = read_book_form(multipart).await?;

    let payload = CreateBook {
        title: form.title.unwrap_or_default(),
        author: form.author.unwrap_or_default(),
        genre: form.genre.unwrap_or_default(),
        description: form.description.unwrap_or_default(),
    };

    let book = state
        .services
        .books
        .add_book(claims.user_id, payload, form.image)
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Edit a book owned by the caller
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body(content = BookFormData, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 401, description = "Caller does not own this book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn edit_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    let form = read_book_form(multipart).await?;

    let payload = UpdateBook {
        title: form.title,
        author: form.author,
        genre: form.genre,
        description: form.description,
    };

    let book = state
        .services
        .books
        .edit_book(claims.user_id, id, payload, form.image)
        .await?;
    Ok(Json(book))
}

/// Delete a book owned by the caller
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Caller does not own this book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.books.delete_book(claims.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search the caller's books
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books, oldest first", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .books
        .search_books(claims.user_id, query.query)
        .await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_book(id).await?;
    Ok(Json(book))
}
