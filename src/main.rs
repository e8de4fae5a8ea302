use subtracker::{
    notify::{dispatch_reminders, LogNotifier},
    reminders::due_reminders,
    router, AppState, Config, KvStore, Store,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let store = Store::new(KvStore::open(&config.data_dir).await?);

    let subscriptions = store.get_all().await;
    info!(count = subscriptions.len(), "loaded subscriptions");
    dispatch_reminders(&mut LogNotifier, &due_reminders(&subscriptions));

    let app = router(AppState::new(store));

    let addr = config.bind_addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
