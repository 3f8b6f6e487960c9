//! Helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use product_catalog::db::{DbPool, establish_connection_pool, run_migrations};
use product_catalog::forms::products::CreateProductForm;

/// Temporary database used in integration tests.
///
/// The database lives in its own temporary directory, removed together with the
/// `-wal` and `-shm` files when the value is dropped.
pub struct TestDb {
    // Dropped first so every connection is closed before the directory goes.
    pool: DbPool,
    path: PathBuf,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);

        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");

        TestDb {
            pool,
            path,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Create payload with the required fields filled in.
pub fn product_form(title: &str, images: &[&str]) -> CreateProductForm {
    CreateProductForm {
        title: title.to_string(),
        price: Some(25.0),
        description: None,
        slug: None,
        stock: Some(5),
        sizes: vec!["S".to_string(), "M".to_string()],
        tags: vec!["shirt".to_string()],
        images: images.iter().map(|url| url.to_string()).collect(),
        gender: "men".to_string(),
    }
}
