//! Repository layer for persistence

pub mod books;
pub mod memory;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use books::BookStore;
pub use users::UserStore;

/// Main repository struct holding the store implementations
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a repository backed by Postgres
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool)),
        }
    }

    /// Create a repository backed by in-memory stores (tests, embedded use)
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(memory::MemoryBooksRepository::new()),
            users: Arc::new(memory::MemoryUsersRepository::new()),
        }
    }
}
