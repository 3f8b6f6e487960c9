use uuid::Uuid;

use crate::db::{DbConnection, DbPool};
use crate::domain::product::{NewProduct, Product, ProductListQuery, UpdateProduct};

pub mod errors;
pub mod product;

#[cfg(test)]
pub mod mock;

pub use errors::{RepositoryError, RepositoryResult};

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over product records.
pub trait ProductReader {
    fn get_product_by_id(&self, id: Uuid) -> RepositoryResult<Option<Product>>;
    /// Find the first product whose upper-cased title equals the upper-cased
    /// `term` or whose slug equals the lower-cased `term`.
    fn get_product_by_term(&self, term: &str) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>>;
}

/// Write operations over product records. Every method is atomic.
pub trait ProductWriter {
    /// Insert the product and its images. The slug is stored as given.
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Merge `updates` onto the stored product, replacing its images when the
    /// patch carries a list. Fails with `NotFound` when the product is missing.
    fn update_product(&self, product_id: Uuid, updates: &UpdateProduct)
    -> RepositoryResult<Product>;
    /// Delete the product together with its images.
    fn delete_product(&self, product_id: Uuid) -> RepositoryResult<()>;
    /// Delete every product and image, returning the number of products removed.
    fn delete_all_products(&self) -> RepositoryResult<usize>;
}
