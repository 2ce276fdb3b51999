use std::{sync::Arc, time::Duration};

use movie_shelf::{
    AppState, build_router, config::Config, csrf, db, store::MovieStore, tmdb::TmdbClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_shelf=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("movie-shelf/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let store = MovieStore::new(db::connect_and_migrate(&config.database_url).await?);

    let tmdb = TmdbClient::new(
        http,
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        metadata: Arc::new(tmdb),
        cookie_key: csrf::signing_key(config.secret_key.as_deref()),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    store.close().await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
