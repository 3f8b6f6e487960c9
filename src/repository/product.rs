use std::collections::HashMap;

use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use crate::{
    db::unicode_upper,
    domain::product::{
        NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery,
        UpdateProduct as DomainUpdateProduct,
    },
    models::product::{
        NewProduct as DbNewProduct, NewProductImage as DbNewProductImage, Product as DbProduct,
        ProductImage as DbProductImage, UpdateProduct as DbUpdateProduct,
    },
    repository::errors::{RepositoryError, RepositoryResult},
    repository::{DieselRepository, ProductReader, ProductWriter},
};

// Reads run in a transaction so the product row and its images come from the
// same snapshot even when a writer commits in between.
impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: Uuid) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<Option<DomainProduct>, RepositoryError, _>(|conn| {
            let product = products::table
                .find(id.to_string())
                .first::<DbProduct>(conn)
                .optional()?;

            attach_images(conn, product)
        })
    }

    fn get_product_by_term(&self, term: &str) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<Option<DomainProduct>, RepositoryError, _>(|conn| {
            // Uniqueness of title and slug makes a second match impossible; if one
            // ever shows up the first row wins.
            let product = products::table
                .filter(
                    unicode_upper(products::title)
                        .eq(unicode_upper(term))
                        .or(products::slug.eq(term.to_lowercase())),
                )
                .first::<DbProduct>(conn)
                .optional()?;

            attach_images(conn, product)
        })
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<Vec<DomainProduct>, RepositoryError, _>(|conn| {
            let db_products = products::table
                .limit(query.limit)
                .offset(query.offset)
                .load::<DbProduct>(conn)?;

            if db_products.is_empty() {
                return Ok(Vec::new());
            }

            let product_ids: Vec<&str> = db_products
                .iter()
                .map(|product| product.id.as_str())
                .collect();
            let mut images_by_product = load_images_for_products(conn, product_ids)?;

            db_products
                .into_iter()
                .map(|db_product| {
                    let images = images_by_product.remove(&db_product.id).unwrap_or_default();
                    db_product.into_domain(images)
                })
                .collect()
        })
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            let db_new = DbNewProduct::from_domain(Uuid::new_v4(), new_product);

            let created = diesel::insert_into(products::table)
                .values(&db_new)
                .get_result::<DbProduct>(conn)?;

            if !new_product.images.is_empty() {
                let payload = DbNewProductImage::many(&created.id, &new_product.images);
                diesel::insert_into(product_images::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            let images = load_images_for_product(conn, &created.id)?;
            created.into_domain(images)
        })
    }

    fn update_product(
        &self,
        product_id: Uuid,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;
        let id = product_id.to_string();

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            ensure_product_exists(conn, &id)?;

            if let Some(images) = updates.images.as_ref() {
                diesel::delete(
                    product_images::table.filter(product_images::product_id.eq(id.as_str())),
                )
                .execute(conn)?;

                if !images.is_empty() {
                    let payload = DbNewProductImage::many(&id, images);
                    diesel::insert_into(product_images::table)
                        .values(&payload)
                        .execute(conn)?;
                }
            }

            let db_updates = DbUpdateProduct::from(updates);
            let updated = diesel::update(products::table.find(id.as_str()))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)?;

            let images = load_images_for_product(conn, &id)?;
            updated.into_domain(images)
        })
    }

    fn delete_product(&self, product_id: Uuid) -> RepositoryResult<()> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;
        let id = product_id.to_string();

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::delete(
                product_images::table.filter(product_images::product_id.eq(id.as_str())),
            )
            .execute(conn)?;

            let deleted = diesel::delete(products::table.find(id.as_str())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }

    fn delete_all_products(&self) -> RepositoryResult<usize> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(product_images::table).execute(conn)?;
            let deleted = diesel::delete(products::table).execute(conn)?;
            Ok(deleted)
        })
    }
}

fn ensure_product_exists(conn: &mut SqliteConnection, product_id: &str) -> RepositoryResult<()> {
    use crate::schema::products;

    let exists: bool = select(exists(products::table.find(product_id))).get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}

fn attach_images(
    conn: &mut SqliteConnection,
    product: Option<DbProduct>,
) -> RepositoryResult<Option<DomainProduct>> {
    match product {
        Some(db_product) => {
            let images = load_images_for_product(conn, &db_product.id)?;
            Ok(Some(db_product.into_domain(images)?))
        }
        None => Ok(None),
    }
}

fn load_images_for_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> RepositoryResult<Vec<DbProductImage>> {
    use crate::schema::product_images;

    let images = product_images::table
        .filter(product_images::product_id.eq(product_id))
        .order(product_images::id.asc())
        .load::<DbProductImage>(conn)?;

    Ok(images)
}

fn load_images_for_products(
    conn: &mut SqliteConnection,
    product_ids: Vec<&str>,
) -> RepositoryResult<HashMap<String, Vec<DbProductImage>>> {
    use crate::schema::product_images;

    let rows = product_images::table
        .filter(product_images::product_id.eq_any(product_ids))
        .order(product_images::id.asc())
        .load::<DbProductImage>(conn)?;

    let mut map: HashMap<String, Vec<DbProductImage>> = HashMap::new();
    for row in rows {
        map.entry(row.product_id.clone()).or_default().push(row);
    }

    Ok(map)
}
