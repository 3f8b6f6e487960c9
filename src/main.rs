use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use product_catalog::config::ServerConfig;
use product_catalog::db::{establish_connection_pool, run_migrations};
use product_catalog::repository::DieselRepository;
use product_catalog::routes::{self, api};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = ServerConfig::from_env();

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool) {
        log::error!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }

    if server_config.enable_purge {
        log::warn!("Bulk product deletion is enabled");
    }

    let repo = DieselRepository::new(pool);
    let bind = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .service(web::scope("/api").configure(api::configure))
    })
    .bind(bind)?
    .run()
    .await
}
