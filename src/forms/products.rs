use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{Gender, NewProduct, UnknownGender, UpdateProduct, normalize_slug};

/// Maximum allowed length for a product title.
const TITLE_MAX_LEN: usize = 256;
const TITLE_MAX_LEN_VALIDATOR: u64 = TITLE_MAX_LEN as u64;

/// Maximum allowed length for an explicit slug.
const SLUG_MAX_LEN: usize = 256;
const SLUG_MAX_LEN_VALIDATOR: u64 = SLUG_MAX_LEN as u64;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product payloads.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided title is empty after sanitization.
    #[error("product title cannot be empty")]
    EmptyTitle,
    /// The slug (explicit, or derived from the title) is empty once normalized.
    #[error("product slug cannot be empty")]
    EmptySlug,
    /// The gender is not one of the supported values.
    #[error("gender must be one of men, woman, kid, unisex: {0}")]
    InvalidGender(#[from] UnknownGender),
    /// The price is not a finite number.
    #[error("price must be a finite number")]
    InvalidPrice,
    /// An image URL was blank.
    #[error("image #{index} has an empty url")]
    EmptyImageUrl { index: usize },
}

/// Payload accepted when creating a product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductForm {
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: String,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub description: Option<String>,
    #[validate(length(max = SLUG_MAX_LEN_VALIDATOR))]
    pub slug: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub sizes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub gender: String,
}

impl CreateProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct`.
    ///
    /// The slug is left as supplied; deriving the stored slug is part of the
    /// insert path.
    pub fn into_new_product(self) -> ProductFormResult<NewProduct> {
        self.validate()?;

        let title = sanitize_inline_text(&self.title);
        if title.is_empty() {
            return Err(ProductFormError::EmptyTitle);
        }

        let gender = self.gender.trim().parse::<Gender>()?;
        let images = sanitize_image_urls(self.images)?;

        let mut new_product = NewProduct::new(title, gender)
            .with_sizes(self.sizes)
            .with_tags(self.tags)
            .with_images(images);

        if let Some(price) = self.price {
            new_product = new_product.with_price(check_price(price)?);
        }

        if let Some(stock) = self.stock {
            new_product = new_product.with_stock(stock);
        }

        let slug = self
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if normalize_slug(slug.unwrap_or(&new_product.title)).is_empty() {
            return Err(ProductFormError::EmptySlug);
        }
        if let Some(slug) = slug {
            new_product = new_product.with_slug(slug);
        }

        if let Some(description) = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            new_product = new_product.with_description(description);
        }

        Ok(new_product)
    }
}

/// Partial payload accepted when updating a product. Omitted fields keep their
/// stored value; a present `images` list replaces the whole image set.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProductForm {
    #[validate(length(min = 1, max = TITLE_MAX_LEN_VALIDATOR))]
    pub title: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = SLUG_MAX_LEN_VALIDATOR))]
    pub slug: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub gender: Option<String>,
}

impl UpdateProductForm {
    /// Validates and sanitizes the payload into a domain `UpdateProduct`.
    pub fn into_update_product(self) -> ProductFormResult<UpdateProduct> {
        self.validate()?;

        let mut update = UpdateProduct::new();

        if let Some(title) = self.title.as_deref() {
            let title = sanitize_inline_text(title);
            if title.is_empty() {
                return Err(ProductFormError::EmptyTitle);
            }
            update = update.title(title);
        }

        if let Some(slug) = self.slug.as_deref() {
            let slug = slug.trim();
            if normalize_slug(slug).is_empty() {
                return Err(ProductFormError::EmptySlug);
            }
            update = update.slug(slug);
        }

        if let Some(price) = self.price {
            update = update.price(check_price(price)?);
        }

        if let Some(stock) = self.stock {
            update = update.stock(stock);
        }

        if let Some(description) = self.description.as_deref() {
            let description = description.trim();
            update = update.description((!description.is_empty()).then_some(description));
        }

        if let Some(sizes) = self.sizes {
            update = update.sizes(sizes);
        }

        if let Some(gender) = self.gender.as_deref() {
            update = update.gender(gender.trim().parse::<Gender>()?);
        }

        if let Some(tags) = self.tags {
            update = update.tags(tags);
        }

        if let Some(images) = self.images {
            update = update.images(sanitize_image_urls(images)?);
        }

        Ok(update)
    }
}

fn check_price(price: f64) -> ProductFormResult<f64> {
    if price.is_finite() {
        Ok(price)
    } else {
        Err(ProductFormError::InvalidPrice)
    }
}

fn sanitize_image_urls(urls: Vec<String>) -> ProductFormResult<Vec<String>> {
    urls.into_iter()
        .enumerate()
        .map(|(index, url)| {
            let url = url.trim();
            if url.is_empty() {
                Err(ProductFormError::EmptyImageUrl { index })
            } else {
                Ok(url.to_string())
            }
        })
        .collect()
}

/// Trim the ends and turn every inner whitespace character into a plain space.
/// Runs of spaces are kept, since each one becomes an underscore in a derived slug.
fn sanitize_inline_text(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some(' ')
            } else if ch.is_control() {
                None
            } else {
                Some(ch)
            }
        })
        .collect()
}
