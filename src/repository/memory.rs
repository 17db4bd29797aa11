//! In-memory store implementations for tests and embedded use

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, NewBook},
        user::{NewUser, User},
    },
};

use super::{books::BookStore, users::UserStore};

/// In-memory book store
#[derive(Debug, Default, Clone)]
pub struct MemoryBooksRepository {
    books: Arc<RwLock<HashMap<Uuid, Book>>>,
}

impl MemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBooksRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let now = Utc::now();
        let record = Book {
            id: Uuid::new_v4(),
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            description: book.description.clone(),
            image_url: book.image_url.clone(),
            owner_id: book.owner_id,
            created_at: now,
            updated_at: now,
        };

        let mut books = self.books.write().await;
        books.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let books = self.books.read().await;
        books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    async fn find_many(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        let needle = filter.text.as_ref().map(|t| t.to_lowercase());

        let mut result: Vec<Book> = books
            .values()
            .filter(|b| {
                if let Some(owner_id) = filter.owner_id {
                    if b.owner_id != Some(owner_id) {
                        return false;
                    }
                }
                if let Some(ref needle) = needle {
                    return b.title.to_lowercase().contains(needle)
                        || b.author.to_lowercase().contains(needle)
                        || b.genre.to_lowercase().contains(needle);
                }
                true
            })
            .cloned()
            .collect();

        result.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(result)
    }

    async fn save(&self, book: &Book) -> AppResult<Book> {
        let mut books = self.books.write().await;
        let (owner_id, created_at) = books
            .get(&book.id)
            .map(|b| (b.owner_id, b.created_at))
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        let mut updated = book.clone();
        updated.owner_id = owner_id;
        updated.created_at = created_at;
        updated.updated_at = Utc::now();
        books.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<()> {
        let mut books = self.books.write().await;
        if books.remove(&id).is_none() {
            return Err(AppError::NotFound("Book not found".to_string()));
        }
        Ok(())
    }
}

/// In-memory user store
#[derive(Debug, Default, Clone)]
pub struct MemoryUsersRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUsersRepository {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            password: user.password.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut users = self.users.write().await;
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}
