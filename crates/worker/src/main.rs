use stockroom_index::{SearchClient, SearchConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = stockroom_db::create_pool(&database_url).await?;
    stockroom_db::run_migrations(&pool).await?;
    tracing::info!("Database ready");

    let client = SearchClient::new(&SearchConfig::from_env());

    let cancel = CancellationToken::new();
    let worker = tokio::spawn(stockroom_worker::run(
        pool,
        client,
        stockroom_worker::WorkerConfig::default(),
        cancel.clone(),
    ));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Received shutdown signal, draining worker");

    cancel.cancel();
    worker.await?;

    Ok(())
}
