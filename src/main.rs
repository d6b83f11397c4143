use anyhow::Context;

use newsdesk::config::AppConfig;
use sea_orm::{ConnectOptions, Database};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    debug!(
        "Port {}, {} connection(s), migrations {}",
        config.port, config.max_connections, config.run_migrations
    );

    let db = Database::connect(
        ConnectOptions::from(config.database_url.as_str())
            .max_connections(config.max_connections)
            .to_owned(),
    )
    .await
    .context("could not connect to DATABASE_URL")?;

    if config.run_migrations {
        newsdesk::migrate(&db).await?;
        info!("Database schema is up to date");
    }

    newsdesk::api::serve(db, &config).await?;

    Ok(())
}
