//! Business logic services

pub mod books;
pub mod uploads;
pub mod users;

use crate::{
    config::{AuthConfig, UploadsConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        uploads_config: UploadsConfig,
    ) -> Self {
        let uploads = uploads::UploadsService::new(uploads_config);
        Self {
            books: books::BooksService::new(repository.books.clone(), uploads),
            users: users::UsersService::new(repository.users.clone(), auth_config),
        }
    }
}
