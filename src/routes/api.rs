use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use serde_json::json;

use crate::config::ServerConfig;
use crate::forms::products::{CreateProductForm, UpdateProductForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, invalid_id_response};
use crate::services::products::{self, ProductsQuery};

#[post("/v1/products")]
/// Create a product from a JSON payload. Images are given as a list of URLs.
pub async fn api_v1_create_product(
    repo: web::Data<DieselRepository>,
    form: web::Json<CreateProductForm>,
) -> impl Responder {
    match products::create_product(repo.get_ref(), form.into_inner()) {
        Ok(product) => HttpResponse::Created().json(product),
        Err(err) => error_response(err),
    }
}

#[get("/v1/products")]
/// Return one page of products selected by `limit` and `offset`.
pub async fn api_v1_products(
    params: web::Query<ProductsQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products::list_products(repo.get_ref(), params.into_inner()) {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(err) => error_response(err),
    }
}

#[get("/v1/products/{term}")]
/// Return the product identified by UUID, title or slug.
pub async fn api_v1_product(
    term: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products::find_product_view(repo.get_ref(), &term) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => error_response(err),
    }
}

#[patch("/v1/products/{id}")]
/// Apply a partial update to the product with the given UUID. A present `images`
/// list replaces the stored images.
pub async fn api_v1_update_product(
    id: web::Path<String>,
    repo: web::Data<DieselRepository>,
    form: web::Json<UpdateProductForm>,
) -> impl Responder {
    let Some(product_id) = products::parse_identifier(&id) else {
        return invalid_id_response(&id);
    };

    match products::update_product(repo.get_ref(), product_id, form.into_inner()) {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => error_response(err),
    }
}

#[delete("/v1/products/{term}")]
/// Delete the product identified by UUID, title or slug, together with its images.
pub async fn api_v1_delete_product(
    term: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products::remove_product(repo.get_ref(), &term) {
        Ok(removed) => HttpResponse::Ok().json(removed),
        Err(err) => error_response(err),
    }
}

#[delete("/v1/products")]
/// Delete the whole catalog. Only available when `ENABLE_PURGE` is set.
pub async fn api_v1_purge_products(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    if !server_config.enable_purge {
        return HttpResponse::Forbidden().json(json!({
            "error": "Forbidden",
            "message": "Bulk deletion is disabled",
        }));
    }

    match products::remove_all_products(repo.get_ref()) {
        Ok(deleted) => HttpResponse::Ok().json(json!({ "deleted": deleted })),
        Err(err) => error_response(err),
    }
}

/// Register every product endpoint on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_v1_create_product)
        .service(api_v1_products)
        .service(api_v1_product)
        .service(api_v1_update_product)
        .service(api_v1_delete_product)
        .service(api_v1_purge_products);
}
