use tracing::info;
use turnstile::{
    api::{build_router, start_api_server},
    config::AppConfig,
    observability::{init_tracing, log_config_info},
    storage::{create_pool, run_migrations},
    Result, APP_NAME, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present; must happen before config is read.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    // A missing or short AUTH_JWT_SECRET fails here, before anything binds.
    let config = AppConfig::from_env()?;
    init_tracing(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting turnstile authentication service");
    log_config_info(&config);

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let router = build_router(pool, &config.auth);
    start_api_server(&config.server, router).await?;

    info!("turnstile shutdown completed");
    Ok(())
}
