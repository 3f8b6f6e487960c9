use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::product::{DEFAULT_LIMIT, Gender, Product, ProductListQuery};
use crate::forms::products::{CreateProductForm, UpdateProductForm};
use crate::repository::{ProductReader, ProductWriter, RepositoryError};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the products listing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProductsQuery {
    /// Maximum number of products to return.
    #[validate(range(min = 1))]
    pub limit: Option<i64>,
    /// Number of products to skip.
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

/// Product as returned to callers: images are flattened to their URLs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let images = product.image_urls();
        let Product {
            id,
            title,
            slug,
            price,
            stock,
            description,
            sizes,
            gender,
            tags,
            created_at,
            updated_at,
            ..
        } = product;

        Self {
            id,
            title,
            slug,
            price,
            stock,
            description,
            sizes,
            gender,
            tags,
            images,
            created_at,
            updated_at,
        }
    }
}

/// Confirmation returned after a product was deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedProduct {
    pub id: Uuid,
    pub message: String,
}

/// Creates a product together with its images.
///
/// The stored slug is derived here, once, right before the insert.
pub fn create_product<R>(repo: &R, form: CreateProductForm) -> ServiceResult<ProductView>
where
    R: ProductWriter + ?Sized,
{
    let payload = form
        .into_new_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?
        .prepare_slug();

    let created = repo.create_product(&payload)?;
    log::info!("Created product {} ({})", created.id, created.slug);

    Ok(created.into())
}

/// Returns one window of the catalog. No ordering is applied beyond the
/// storage's natural order.
pub fn list_products<R>(repo: &R, query: ProductsQuery) -> ServiceResult<Vec<ProductView>>
where
    R: ProductReader + ?Sized,
{
    query
        .validate()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let list_query = ProductListQuery::new()
        .limit(query.limit.unwrap_or(DEFAULT_LIMIT))
        .offset(query.offset.unwrap_or(0));

    let products = repo.list_products(list_query)?;

    Ok(products.into_iter().map(ProductView::from).collect())
}

/// Resolves `term` to a product.
///
/// UUID-shaped terms are matched against the identifier only. Anything else is
/// matched case-insensitively against the title or, lower-cased, against the slug.
pub fn find_product<R>(repo: &R, term: &str) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    let product = match parse_identifier(term) {
        Some(id) => repo.get_product_by_id(id)?,
        None => repo.get_product_by_term(term)?,
    };

    product.ok_or_else(|| ServiceError::NotFound(format!("Product with {term} not found")))
}

/// Same as [`find_product`], flattened for output.
pub fn find_product_view<R>(repo: &R, term: &str) -> ServiceResult<ProductView>
where
    R: ProductReader + ?Sized,
{
    find_product(repo, term).map(ProductView::from)
}

/// Applies a partial update to the product identified by `id`.
///
/// A supplied image list replaces the current images; without one they are kept.
/// The title change never re-derives the slug.
pub fn update_product<R>(repo: &R, id: Uuid, form: UpdateProductForm) -> ServiceResult<ProductView>
where
    R: ProductWriter + ?Sized,
{
    let updates = form
        .into_update_product()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let updated = repo.update_product(id, &updates).map_err(|err| match err {
        RepositoryError::NotFound => {
            ServiceError::NotFound(format!("Product with id: {id} not found"))
        }
        other => ServiceError::from(other),
    })?;
    log::info!("Updated product {}", updated.id);

    Ok(updated.into())
}

/// Deletes the product resolved from `term`, together with its images.
pub fn remove_product<R>(repo: &R, term: &str) -> ServiceResult<RemovedProduct>
where
    R: ProductReader + ProductWriter + ?Sized,
{
    let product = find_product(repo, term)?;

    repo.delete_product(product.id).map_err(|err| match err {
        RepositoryError::NotFound => {
            ServiceError::NotFound(format!("Product with {term} not found"))
        }
        other => ServiceError::from(other),
    })?;
    log::info!("Removed product {} ({})", product.id, product.slug);

    Ok(RemovedProduct {
        id: product.id,
        message: format!("Product {} removed", product.id),
    })
}

/// Deletes every product. Meant for seeding and test environments.
pub fn remove_all_products<R>(repo: &R) -> ServiceResult<usize>
where
    R: ProductWriter + ?Sized,
{
    let deleted = repo.delete_all_products()?;
    log::warn!("Removed all products ({deleted})");
    Ok(deleted)
}

/// Returns the identifier when `term` is a hyphenated UUID.
pub fn parse_identifier(term: &str) -> Option<Uuid> {
    if term.len() != 36 {
        return None;
    }
    Uuid::try_parse(term).ok()
}
