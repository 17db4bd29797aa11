//! Book catalog service

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, CreateBook, NewBook, UpdateBook},
    repository::BookStore,
    services::uploads::{UploadedImage, UploadsService},
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BookStore>,
    uploads: UploadsService,
}

impl BooksService {
    pub fn new(books: Arc<dyn BookStore>, uploads: UploadsService) -> Self {
        Self { books, uploads }
    }

    /// Create a book owned by the calling user. Validation runs before the
    /// cover is stored so a rejected request leaves no trace.
    pub async fn add_book(
        &self,
        owner_id: Uuid,
        payload: CreateBook,
        image: Option<UploadedImage>,
    ) -> AppResult<Book> {
        payload.validate()?;

        let image_url = self.uploads.resolve(image).await?;
        let book = self
            .books
            .create(&NewBook {
                title: payload.title,
                author: payload.author,
                genre: payload.genre,
                description: payload.description,
                image_url,
                owner_id: Some(owner_id),
            })
            .await?;

        tracing::info!("Book {} added by user {}", book.id, owner_id);
        Ok(book)
    }

    /// Update a book the caller owns. Only non-empty incoming fields replace
    /// stored values; a new cover replaces the stored reference.
    pub async fn edit_book(
        &self,
        caller_id: Uuid,
        id: Uuid,
        payload: UpdateBook,
        image: Option<UploadedImage>,
    ) -> AppResult<Book> {
        let mut book = self.books.get_by_id(id).await?;

        if book.owner_id != Some(caller_id) {
            return Err(AppError::Authorization(
                "Not authorized to edit this book".to_string(),
            ));
        }

        payload.apply_to(&mut book);
        if let Some(image) = image {
            book.image_url = self.uploads.resolve(Some(image)).await?;
        }

        self.books.save(&book).await
    }

    /// Delete a book. A record that has an owner may only be deleted by that
    /// owner; ownerless records may be deleted by any authenticated caller.
    pub async fn delete_book(&self, caller_id: Uuid, id: Uuid) -> AppResult<()> {
        let book = self.books.get_by_id(id).await?;

        if let Some(owner_id) = book.owner_id {
            if owner_id != caller_id {
                return Err(AppError::Authorization(
                    "Not authorized to delete this book".to_string(),
                ));
            }
        }

        self.books.delete_by_id(id).await?;
        tracing::info!("Book {} deleted by user {}", id, caller_id);
        Ok(())
    }

    /// List the caller's books, optionally narrowed by a case-insensitive
    /// substring over title, author and genre. An empty query lists all.
    pub async fn search_books(
        &self,
        caller_id: Uuid,
        query: Option<String>,
    ) -> AppResult<Vec<Book>> {
        let filter = BookFilter {
            text: query.filter(|q| !q.is_empty()),
            owner_id: Some(caller_id),
        };
        self.books.find_many(&filter).await
    }

    /// Fetch any book by id. Visibility is not restricted by ownership.
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.books.get_by_id(id).await
    }
}
