use anyhow::Context;
use sqlx::PgPool;

use scholarly_auth::TokenCodec;
use scholarly_config::{CorsConfig, DatabaseConfig, EmailConfig, JwtConfig};
use scholarly_db::{init_db_pool, run_migrations};

use crate::utils::email::EmailService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: TokenCodec,
    pub mailer: EmailService,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        db: PgPool,
        jwt_config: &JwtConfig,
        email_config: EmailConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            db,
            tokens: TokenCodec::new(jwt_config),
            mailer: EmailService::new(email_config),
            cors_config,
        }
    }
}

/// Loads configuration, connects to Postgres and applies pending migrations.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let jwt_config = JwtConfig::from_env().context("Invalid JWT configuration")?;
    let database_config = DatabaseConfig::from_env().context("Invalid database configuration")?;

    let db = init_db_pool(&database_config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    Ok(AppState::new(
        db,
        &jwt_config,
        EmailConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
