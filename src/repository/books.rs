//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, NewBook},
};

/// Persistence operations for book records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Create a record; the store assigns id and timestamps
    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    /// Fetch a record by id
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book>;

    /// List records matching the filter, oldest first
    async fn find_many(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;

    /// Persist the mutable fields of an existing record and refresh
    /// updated_at. owner_id and created_at are fixed at creation.
    async fn save(&self, book: &Book) -> AppResult<Book>;

    /// Remove a record by id
    async fn delete_by_id(&self, id: Uuid) -> AppResult<()>;
}

/// Escape LIKE wildcards so the bound pattern matches a literal substring
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

const BOOK_COLUMNS: &str =
    "id, title, author, genre, description, image_url, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBooksRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, genre, description, image_url, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(&book.image_url)
        .bind(book.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        Ok(book)
    }

    async fn find_many(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        // Each condition consumes exactly one bound parameter, so the
        // placeholder number is always conditions.len() + 1.
        let mut conditions = Vec::new();

        let pattern = filter.text.as_deref().map(like_pattern);
        if pattern.is_some() {
            conditions.push(format!(
                "(title ILIKE ${n} OR author ILIKE ${n} OR genre ILIKE ${n})",
                n = conditions.len() + 1
            ));
        }
        if filter.owner_id.is_some() {
            conditions.push(format!("owner_id = ${}", conditions.len() + 1));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {} FROM books {} ORDER BY created_at, id",
            BOOK_COLUMNS, where_clause
        );

        let mut builder = sqlx::query_as::<_, Book>(&query);
        if let Some(ref pattern) = pattern {
            builder = builder.bind(pattern);
        }
        if let Some(owner_id) = filter.owner_id {
            builder = builder.bind(owner_id);
        }

        let books = builder.fetch_all(&self.pool).await?;
        Ok(books)
    }

    async fn save(&self, book: &Book) -> AppResult<Book> {
        let saved = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = $2,
                author = $3,
                genre = $4,
                description = $5,
                image_url = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(&book.image_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        Ok(saved)
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("tolkien"), "%tolkien%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\books"), "%c:\\\\books%");
    }
}
