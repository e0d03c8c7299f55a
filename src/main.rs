use split_board::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "split_board=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        bind = %config.server.bind,
        upstream = %config.upstream.base_url,
        page_size = config.sync.page_size,
        "Starting split-board"
    );

    #[cfg(feature = "mongodb_backend")]
    {
        let store = MongoExpenseStore::new(
            config.storage.mongodb_uri(),
            config.storage.database.clone(),
        );

        // Connection problems surface on first use; this only warms it up.
        if let Err(e) = store.ensure_connected().await {
            tracing::warn!(error = %e, "MongoDB not reachable at startup");
        }

        ServerBuilder::new()
            .with_config(config)
            .with_store(store.clone())
            .serve()
            .await?;

        store.shutdown().await;
    }

    #[cfg(not(feature = "mongodb_backend"))]
    {
        tracing::warn!("Built without mongodb_backend, expenses are kept in memory only");

        ServerBuilder::new()
            .with_config(config)
            .with_store(InMemoryExpenseStore::new())
            .serve()
            .await?;
    }

    Ok(())
}
