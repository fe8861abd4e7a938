//! Test utilities shared by handler and repository tests.

use crate::db::handlers::{Categories, Products, Repository, Subcategories};
use crate::db::models::{
    categories::{CategoryCreateDBRequest, CategoryDBResponse},
    products::{ProductCreateDBRequest, ProductDBResponse},
    subcategories::{SubcategoryCreateDBRequest, SubcategoryDBResponse},
};
use crate::types::{CategoryId, SubcategoryId};
use crate::AppState;
use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tempfile::TempDir;

/// Upload limit used by [`create_test_config`], small enough to exceed in a test
pub const TEST_UPLOAD_LIMIT: usize = 64 * 1024;

pub fn create_test_config() -> crate::config::Config {
    let mut config = crate::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    config.database.pool.max_connections = 2;
    config.database.pool.min_connections = 0;
    config.media.max_upload_size = TEST_UPLOAD_LIMIT;
    config
}

/// Router over `pool` with its media root in a fresh temporary directory.
///
/// Keep the returned directory alive for as long as the server is used.
pub async fn create_test_app(pool: PgPool) -> (TestServer, TempDir) {
    let media_dir = tempfile::tempdir().expect("Failed to create media directory");
    let mut config = create_test_config();
    config.media.root = media_dir.path().to_path_buf();

    let media = crate::media::create_media_store(&config.media)
        .await
        .expect("Failed to create media store");
    let state = AppState::builder().db(pool).config(config).media(media).build();

    let router = crate::build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, media_dir)
}

pub async fn create_test_category(pool: &PgPool, name: &str) -> CategoryDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Categories::new(&mut conn);

    repo.create(&CategoryCreateDBRequest {
        name: name.to_string(),
        description: format!("{name} description"),
        image_url: String::new(),
    })
    .await
    .expect("Failed to create test category")
}

pub async fn create_test_subcategory(pool: &PgPool, name: &str, category_id: CategoryId) -> SubcategoryDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Subcategories::new(&mut conn);

    repo.create(&SubcategoryCreateDBRequest {
        name: name.to_string(),
        description: String::new(),
        category_id,
        image_url: String::new(),
    })
    .await
    .expect("Failed to create test subcategory")
}

pub async fn create_test_product(pool: &PgPool, name: &str, subcategory_id: SubcategoryId) -> ProductDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Products::new(&mut conn);

    repo.create(&ProductCreateDBRequest {
        name: name.to_string(),
        description: String::new(),
        subcategory_id,
        price: Decimal::new(1999, 2),
        current_inventory: 5,
        image: "aaaaaaaaaa.jpg".to_string(),
        brand: "Acme".to_string(),
        sku: format!("SKU-{name}"),
    })
    .await
    .expect("Failed to create test product")
}
