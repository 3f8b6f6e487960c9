use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Number of products returned when a listing does not specify a limit.
pub const DEFAULT_LIMIT: i64 = 10;

/// Target audience of a product.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Men,
    Woman,
    Kid,
    Unisex,
}

/// Returned when a textual value is not one of the known genders.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown gender `{0}`")]
pub struct UnknownGender(pub String);

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Men => "men",
            Gender::Woman => "woman",
            Gender::Kid => "kid",
            Gender::Unisex => "unisex",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "men" => Ok(Gender::Men),
            "woman" => Ok(Gender::Woman),
            "kid" => Ok(Gender::Kid),
            "unisex" => Ok(Gender::Unisex),
            other => Err(UnknownGender(other.to_string())),
        }
    }
}

/// Image owned by a product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductImage {
    /// Unique identifier of the image record.
    pub id: i32,
    /// Identifier of the owning product.
    pub product_id: Uuid,
    /// Location of the image content.
    pub url: String,
}

/// Domain representation of a catalog product together with its images.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier generated when the product is created.
    pub id: Uuid,
    /// Human-readable title, unique across the catalog.
    pub title: String,
    /// Normalized lookup key, unique across the catalog.
    pub slug: String,
    /// Non-negative unit price.
    pub price: f64,
    /// Units available in stock.
    pub stock: i32,
    /// Optional longer description shown to shoppers.
    pub description: Option<String>,
    /// Available sizes in the order they were supplied.
    pub sizes: Vec<String>,
    /// Target audience.
    pub gender: Gender,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Owned images in insertion order.
    pub images: Vec<ProductImage>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// URLs of the owned images, in insertion order.
    pub fn image_urls(&self) -> Vec<String> {
        self.images.iter().map(|image| image.url.clone()).collect()
    }
}

/// Normalize a slug source: lower-case it, turn spaces into underscores and drop
/// apostrophes.
pub fn normalize_slug(source: &str) -> String {
    source.to_lowercase().replace(' ', "_").replace('\'', "")
}

/// Payload required to insert a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub title: String,
    /// Explicit slug supplied by the caller. Replaced by its normalized form (or
    /// the normalized title) in [`NewProduct::prepare_slug`].
    pub slug: Option<String>,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub tags: Vec<String>,
    /// Image URLs that become the product's owned images.
    pub images: Vec<String>,
}

impl NewProduct {
    /// Build a payload with default price, stock and no optional data.
    pub fn new(title: impl Into<String>, gender: Gender) -> Self {
        Self {
            title: title.into(),
            slug: None,
            price: 0.0,
            stock: 0,
            description: None,
            sizes: Vec::new(),
            gender,
            tags: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_sizes(mut self, sizes: Vec<String>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    /// Pre-insert step: derive the stored slug from the explicit slug, falling back
    /// to the title when none (or an empty one) was supplied.
    pub fn prepare_slug(mut self) -> Self {
        let source = match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug,
            _ => self.title.as_str(),
        };
        self.slug = Some(normalize_slug(source));
        self
    }
}

/// Patch data applied when updating an existing product.
///
/// Fields left as `None` keep their stored value. `images: Some(_)` replaces the
/// whole image set, `images: None` keeps the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub sizes: Option<Vec<String>>,
    pub gender: Option<Gender>,
    pub tags: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a new patch object with no changes applied yet.
    pub fn new() -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            title: None,
            slug: None,
            price: None,
            stock: None,
            description: None,
            sizes: None,
            gender: None,
            tags: None,
            images: None,
            updated_at: now,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a new slug. The value is stored in normalized form.
    pub fn slug(mut self, slug: impl AsRef<str>) -> Self {
        self.slug = Some(normalize_slug(slug.as_ref()));
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn stock(mut self, stock: i32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Update the description, using `None` to clear an existing value.
    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = Some(description.map(|value| value.into()));
        self
    }

    pub fn sizes(mut self, sizes: Vec<String>) -> Self {
        self.sizes = Some(sizes);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Replace the product's images with `images`.
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Offset-based window over the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductListQuery {
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProductListQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductListQuery {
    /// First page with the default limit.
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}
