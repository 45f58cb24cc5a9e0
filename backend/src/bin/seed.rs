//! Load (or with `--destroy`, only remove) the sample catalogue

use sqlx::postgres::PgPoolOptions;
use storefront_backend::{seed, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_seed=info,storefront_backend=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::load()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let destroy = std::env::args().skip(1).any(|arg| arg == "--destroy" || arg == "-d");

    if destroy {
        let removed = seed::destroy_products(&db_pool).await?;
        tracing::info!("Removed {} products", removed);
    } else {
        let inserted = seed::import_sample_products(&db_pool).await?;
        tracing::info!("Imported {} sample products", inserted);
    }

    Ok(())
}
