use std::net::SocketAddr;
use std::sync::Arc;
use aquarium_keeper::{config, handlers, metrics, notifier, repo};
use aquarium_keeper::domain::{Clock, SystemClock};
use aquarium_keeper::handlers::sweep::Scheduler;
use aquarium_keeper::repo::Storage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    pretty_env_logger::init();

    let app_config = config::AppConfig::from_env()?;
    let database_config = config::DatabaseConfig::from_env()?;
    let db_conn = repo::establish_database_connection(&database_config).await?;

    let storage: Arc<dyn Storage> = Arc::new(repo::PgStorage::new(db_conn));
    let notifier = notifier::from_config(&app_config.notifier)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let tasks = handlers::sweep::tasks(&app_config, storage, notifier, clock);
    let scheduler = Scheduler::spawn(tasks);

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.metrics_port));
    let metrics_router = metrics::init();
    let tcp_listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Serving the metrics on {addr}");
    let res = axum::serve(tcp_listener, metrics_router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for CTRL+C: {e}");
            }
            log::info!("Shutdown of the metrics server")
        })
        .await;

    scheduler.shutdown().await;
    res.map_err(Into::into)
}
