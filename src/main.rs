//! ProjectX admin bootstrap
//!
//! Loads configuration, prepares the database schema and reports what the
//! admin tables currently hold.

use tracing_subscriber::{EnvFilter, fmt};

use projectx_core::config::AppConfig;
use projectx_core::error::AppError;
use projectx_database::criteria::{
    ActionCriteria, AdministratorCriteria, AdministratorRoleCriteria, LoginHistoryCriteria,
    RoleActionCriteria, RoleCriteria,
};
use projectx_database::migration::run_migrations;
use projectx_database::repositories::{
    ActionRepository, AdministratorRepository, AdministratorRoleRepository, LoginHistoryRepository,
    RoleActionRepository, RoleRepository,
};
use projectx_database::{DatabasePool, RepositoryPolicy, Store};
use projectx_entity::administrator::AdministratorStatus;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Bootstrap failed: {}", e);
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `PROJECTX_ENV` overlay and environment overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PROJECTX_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ProjectX admin v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;
    run_migrations(db_pool.pool()).await?;
    if !db_pool.health_check().await? {
        return Err(AppError::internal("Database health check returned an unexpected value"));
    }

    // ── Step 2: Report table contents ────────────────────────────
    let policy = RepositoryPolicy::from(&config.persistence);
    let mut conn = db_pool.acquire().await?;
    report_counts(&mut *conn, policy).await?;
    drop(conn);

    db_pool.close().await;
    Ok(())
}

async fn report_counts<S: Store + ?Sized>(store: &mut S, policy: RepositoryPolicy) -> Result<(), AppError> {
    let administrators = AdministratorRepository::new(policy)
        .count(store, &AdministratorCriteria::default())
        .await?;
    let active_administrators = AdministratorRepository::new(policy)
        .count(
            store,
            &AdministratorCriteria::builder()
                .status(AdministratorStatus::Active)
                .build()?,
        )
        .await?;
    let roles = RoleRepository::new(policy)
        .count(store, &RoleCriteria::default())
        .await?;
    let actions = ActionRepository::new(policy)
        .count(store, &ActionCriteria::default())
        .await?;
    let administrator_roles = AdministratorRoleRepository::new(policy)
        .count(store, &AdministratorRoleCriteria::default())
        .await?;
    let role_actions = RoleActionRepository::new(policy)
        .count(store, &RoleActionCriteria::default())
        .await?;
    let login_histories = LoginHistoryRepository::new(policy)
        .count(store, &LoginHistoryCriteria::default())
        .await?;

    tracing::info!(
        administrators,
        active_administrators,
        roles,
        actions,
        administrator_roles,
        role_actions,
        login_histories,
        "Admin tables ready"
    );
    Ok(())
}
