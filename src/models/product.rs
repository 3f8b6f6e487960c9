use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::product::{
    Gender, NewProduct as DomainNewProduct, Product as DomainProduct,
    ProductImage as DomainProductImage, UpdateProduct as DomainUpdateProduct,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price: f64,
    pub stock: i32,
    pub description: Option<String>,
    pub sizes: String,
    pub gender: String,
    pub tags: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::product_images)]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ProductImage {
    pub id: i32,
    pub product_id: String,
    pub url: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub id: String,
    pub title: &'a str,
    pub slug: &'a str,
    pub price: f64,
    pub stock: i32,
    pub description: Option<&'a str>,
    pub sizes: String,
    pub gender: &'a str,
    pub tags: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: &'a str,
    pub url: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub title: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub description: Option<Option<&'a str>>,
    pub sizes: Option<String>,
    pub gender: Option<&'a str>,
    pub tags: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Decode the row and attach its images.
    pub fn into_domain(self, images: Vec<ProductImage>) -> RepositoryResult<DomainProduct> {
        let id = parse_id(&self.id)?;
        let gender = self
            .gender
            .parse::<Gender>()
            .map_err(|err| RepositoryError::Corrupted(format!("product {id}: {err}")))?;

        Ok(DomainProduct {
            id,
            title: self.title,
            slug: self.slug,
            price: self.price,
            stock: self.stock,
            description: self.description,
            sizes: decode_tokens(&self.sizes)?,
            gender,
            tags: decode_tokens(&self.tags)?,
            images: images
                .into_iter()
                .map(|image| image.into_domain(id))
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProductImage {
    pub fn into_domain(self, product_id: Uuid) -> DomainProductImage {
        DomainProductImage {
            id: self.id,
            product_id,
            url: self.url,
        }
    }
}

impl<'a> NewProduct<'a> {
    /// Row for `value` stored under the freshly generated `id`.
    ///
    /// The slug is taken as is: it must already have gone through
    /// [`DomainNewProduct::prepare_slug`]. A missing slug is written as an empty
    /// string, which the table's check constraint rejects.
    pub fn from_domain(id: Uuid, value: &'a DomainNewProduct) -> Self {
        Self {
            id: id.to_string(),
            title: value.title.as_str(),
            slug: value.slug.as_deref().unwrap_or_default(),
            price: value.price,
            stock: value.stock,
            description: value.description.as_deref(),
            sizes: encode_tokens(&value.sizes),
            gender: value.gender.as_str(),
            tags: encode_tokens(&value.tags),
        }
    }
}

impl<'a> NewProductImage<'a> {
    pub fn many(product_id: &'a str, urls: &'a [String]) -> Vec<Self> {
        urls.iter()
            .map(|url| Self {
                product_id,
                url: url.as_str(),
            })
            .collect()
    }
}

impl<'a> From<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    fn from(value: &'a DomainUpdateProduct) -> Self {
        Self {
            title: value.title.as_deref(),
            slug: value.slug.as_deref(),
            price: value.price,
            stock: value.stock,
            description: value
                .description
                .as_ref()
                .map(|description| description.as_deref()),
            sizes: value.sizes.as_deref().map(encode_tokens),
            gender: value.gender.map(|gender| gender.as_str()),
            tags: value.tags.as_deref().map(encode_tokens),
            updated_at: value.updated_at,
        }
    }
}

fn parse_id(value: &str) -> RepositoryResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|err| RepositoryError::Corrupted(format!("product id `{value}`: {err}")))
}

fn encode_tokens(tokens: &[String]) -> String {
    serde_json::Value::from(tokens.to_vec()).to_string()
}

fn decode_tokens(value: &str) -> RepositoryResult<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|err| RepositoryError::Corrupted(format!("token list `{value}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    fn row(id: &str, sizes: &str) -> Product {
        Product {
            id: id.to_string(),
            title: "Cyber Tee".to_string(),
            slug: "cyber_tee".to_string(),
            price: 30.0,
            stock: 4,
            description: None,
            sizes: sizes.to_string(),
            gender: "kid".to_string(),
            tags: "[]".to_string(),
            created_at: datetime(),
            updated_at: datetime(),
        }
    }

    #[test]
    fn token_lists_keep_order_and_duplicates() {
        let tokens = vec!["M".to_string(), "S".to_string(), "M".to_string()];
        let encoded = encode_tokens(&tokens);
        assert_eq!(encoded, r#"["M","S","M"]"#);
        assert_eq!(decode_tokens(&encoded).expect("decode"), tokens);
    }

    #[test]
    fn into_domain_attaches_images_in_order() {
        let id = Uuid::new_v4();
        let images = vec![
            ProductImage {
                id: 1,
                product_id: id.to_string(),
                url: "a.jpg".to_string(),
            },
            ProductImage {
                id: 2,
                product_id: id.to_string(),
                url: "b.jpg".to_string(),
            },
        ];

        let product = row(&id.to_string(), r#"["S","M"]"#)
            .into_domain(images)
            .expect("row should decode");

        assert_eq!(product.id, id);
        assert_eq!(product.gender, Gender::Kid);
        assert_eq!(product.sizes, vec!["S".to_string(), "M".to_string()]);
        assert_eq!(product.image_urls(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn into_domain_rejects_malformed_rows() {
        let result = row("not-a-uuid", "[]").into_domain(Vec::new());
        assert!(matches!(result, Err(RepositoryError::Corrupted(_))));

        let result = row(&Uuid::new_v4().to_string(), "S,M").into_domain(Vec::new());
        assert!(matches!(result, Err(RepositoryError::Corrupted(_))));
    }

    #[test]
    fn update_changeset_skips_untouched_fields() {
        let patch = DomainUpdateProduct::new().title("Renamed").images(Vec::new());
        let changeset = UpdateProduct::from(&patch);

        assert_eq!(changeset.title, Some("Renamed"));
        assert!(changeset.slug.is_none());
        assert!(changeset.sizes.is_none());
        assert!(changeset.description.is_none());
    }
}
