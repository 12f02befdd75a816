mod config;
mod constants;
mod domain;
mod models;
mod routes;
mod services;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use config::Config;
use constants::MAX_BODY_SIZE;
use services::mail::SmtpMailer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub mailer: SmtpMailer,
    pub config: Config,
}

async fn health() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let mailer = SmtpMailer::new(&config).expect("Failed to initialize SMTP mailer");

    let port = config.port;
    let state = Arc::new(AppState {
        db: pool,
        mailer,
        config,
    });

    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::build_routes())
        // The frontend is served from a separate origin
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}
