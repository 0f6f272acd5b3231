use std::{process, sync::Arc};

use dollar_coffee::{
    application::{error::AppError, repositories::RepositorySet},
    cache::{self, CacheConfig},
    config,
    infra::{
        db::{PgTx, PostgresRepositories},
        error::InfraError,
        http::{self, HttpState},
        passwords::Argon2Hasher,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const SOURCE: &str = "dollar_coffee::serve";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let cache_config = CacheConfig::from(&settings.cache);
    let cache_store = cache::build_store(&cache_config)
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = SOURCE,
        backend = cache_config.backend.as_str(),
        ttl_secs = cache_config.ttl.as_secs(),
        "catalog cache ready"
    );

    let repository_set: RepositorySet<PgTx> =
        RepositorySet::new(repositories.clone(), cache_store, cache_config.ttl);
    let state = HttpState::new(
        repositories,
        &repository_set,
        Arc::new(Argon2Hasher::default()),
        settings.pagination.page_size,
    );

    serve_http(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn serve_http(
    settings: &config::Settings,
    state: HttpState<PostgresRepositories>,
) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = SOURCE, addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = SOURCE, "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target = SOURCE, error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
