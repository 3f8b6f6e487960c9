use diesel::prelude::*;
use uuid::Uuid;

use product_catalog::domain::product::{Gender, NewProduct, ProductListQuery, UpdateProduct};
use product_catalog::repository::{
    DieselRepository, ProductReader, ProductWriter, RepositoryError,
};
use product_catalog::schema::product_images;

mod common;

fn new_product(title: &str, images: &[&str]) -> NewProduct {
    NewProduct::new(title, Gender::Unisex)
        .with_sizes(vec!["XS".to_string(), "XL".to_string(), "XS".to_string()])
        .with_images(images.iter().map(|url| url.to_string()).collect())
        .prepare_slug()
}

fn image_rows(test_db: &common::TestDb) -> i64 {
    let mut conn = test_db.pool().get().expect("connection");
    product_images::table
        .count()
        .get_result::<i64>(&mut conn)
        .expect("count images")
}

#[test]
fn test_product_repository_crud() {
    let test_db = common::TestDb::new("test_product_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("Desert Boots", &["left.jpg", "right.jpg"]))
        .unwrap();
    assert_eq!(created.slug, "desert_boots");
    assert_eq!(created.price, 0.0);
    assert_eq!(created.stock, 0);
    assert_eq!(
        created.sizes,
        vec!["XS".to_string(), "XL".to_string(), "XS".to_string()]
    );
    assert_eq!(created.image_urls(), vec!["left.jpg", "right.jpg"]);
    assert!(created.images.iter().all(|image| image.product_id == created.id));

    let fetched = repo.get_product_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);

    let updated = repo
        .update_product(created.id, &UpdateProduct::new().price(99.5).stock(3))
        .unwrap();
    assert_eq!(updated.price, 99.5);
    assert_eq!(updated.stock, 3);
    assert_eq!(updated.title, "Desert Boots");
    assert_eq!(updated.image_urls(), vec!["left.jpg", "right.jpg"]);

    repo.delete_product(created.id).unwrap();
    assert!(repo.get_product_by_id(created.id).unwrap().is_none());
    assert_eq!(image_rows(&test_db), 0);

    let err = repo
        .delete_product(created.id)
        .expect_err("expected second delete to fail");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_update_missing_product_is_not_found() {
    let test_db = common::TestDb::new("test_update_missing_product.db");
    let repo = DieselRepository::new(test_db.pool());

    let err = repo
        .update_product(Uuid::new_v4(), &UpdateProduct::new().title("Ghost"))
        .expect_err("expected update to fail");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_term_lookup_matches_title_or_slug() {
    let test_db = common::TestDb::new("test_term_lookup.db");
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("Men's Raven Hoodie", &[]))
        .unwrap();
    assert_eq!(created.slug, "mens_raven_hoodie");

    let by_title = repo.get_product_by_term("MEN'S RAVEN HOODIE").unwrap();
    assert_eq!(by_title.map(|product| product.id), Some(created.id));

    let by_slug = repo.get_product_by_term("Mens_Raven_Hoodie").unwrap();
    assert_eq!(by_slug.map(|product| product.id), Some(created.id));

    assert!(repo.get_product_by_term("raven").unwrap().is_none());
}

#[test]
fn test_term_lookup_folds_non_ascii_titles() {
    let test_db = common::TestDb::new("test_term_lookup_unicode.db");
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("Crème Brûlée", &[]))
        .unwrap();

    for term in ["CRÈME BRÛLÉE", "crème brûlée", "Crème Brûlée"] {
        let found = repo.get_product_by_term(term).unwrap();
        assert_eq!(found.map(|product| product.id), Some(created.id), "{term}");
    }
}

#[test]
fn test_unique_title_is_reported_as_constraint_violation() {
    let test_db = common::TestDb::new("test_unique_title.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_product("Polo", &["a.jpg"]))
        .unwrap();

    let err = repo
        .create_product(&new_product("Polo", &["b.jpg"]))
        .expect_err("expected duplicate title to fail");
    assert!(matches!(err, RepositoryError::ConstraintViolation(_)));
    assert_eq!(image_rows(&test_db), 1);
}

#[test]
fn test_missing_slug_is_rejected_by_storage() {
    let test_db = common::TestDb::new("test_missing_slug.db");
    let repo = DieselRepository::new(test_db.pool());

    let unprepared = NewProduct::new("No Slug", Gender::Kid);
    let err = repo
        .create_product(&unprepared)
        .expect_err("expected empty slug to be rejected");
    assert!(matches!(err, RepositoryError::Database(_)));

    let (items, images) = (
        repo.list_products(ProductListQuery::new()).unwrap(),
        image_rows(&test_db),
    );
    assert!(items.is_empty());
    assert_eq!(images, 0);
}

#[test]
fn test_list_products_pages_and_attaches_images() {
    let test_db = common::TestDb::new("test_list_products_pages.db");
    let repo = DieselRepository::new(test_db.pool());

    for index in 0..3 {
        let url = format!("{index}.jpg");
        repo.create_product(&new_product(&format!("Item {index}"), &[url.as_str()]))
            .unwrap();
    }

    let page = repo
        .list_products(ProductListQuery::new().limit(2).offset(1))
        .unwrap();
    assert_eq!(page.len(), 2);
    for product in &page {
        assert_eq!(product.images.len(), 1);
        assert!(product.images[0].url.ends_with(".jpg"));
    }

    let beyond = repo
        .list_products(ProductListQuery::new().offset(10))
        .unwrap();
    assert!(beyond.is_empty());
}

#[test]
fn test_reads_never_mix_rows_from_different_commits() {
    let test_db = common::TestDb::new("test_read_snapshots.db");
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_product(&new_product("Alpha", &["alpha-1.jpg", "alpha-2.jpg"]))
        .unwrap();

    let check = |product: &product_catalog::domain::product::Product| {
        let prefix = product.title.to_lowercase();
        assert_eq!(product.images.len(), 2, "{}", product.title);
        assert!(
            product
                .image_urls()
                .iter()
                .all(|url| url.starts_with(&prefix)),
            "{} came back with {:?}",
            product.title,
            product.image_urls()
        );
    };

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..100 {
                let name = if round % 2 == 0 { "Beta" } else { "Alpha" };
                let prefix = name.to_lowercase();
                let update = UpdateProduct::new()
                    .title(name)
                    .images(vec![format!("{prefix}-1.jpg"), format!("{prefix}-2.jpg")]);
                repo.update_product(created.id, &update).unwrap();
            }
        });

        scope.spawn(|| {
            for _ in 0..200 {
                check(&repo.get_product_by_id(created.id).unwrap().unwrap());
                for product in repo.list_products(ProductListQuery::new()).unwrap() {
                    check(&product);
                }
            }
        });
    });
}

#[test]
fn test_delete_all_products_clears_images() {
    let test_db = common::TestDb::new("test_delete_all_products.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_product("One", &["1.jpg"])).unwrap();
    repo.create_product(&new_product("Two", &["2.jpg", "3.jpg"]))
        .unwrap();

    assert_eq!(repo.delete_all_products().unwrap(), 2);
    assert!(
        repo.list_products(ProductListQuery::new())
            .unwrap()
            .is_empty()
    );
    assert_eq!(image_rows(&test_db), 0);
    assert_eq!(repo.delete_all_products().unwrap(), 0);
}
