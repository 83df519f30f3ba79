use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use aquamon_service::alert::BreachTracker;
use aquamon_service::config::{DEFAULT_CONFIG_PATH, ServiceConfig};
use aquamon_service::dev_mode::DevMode;
use aquamon_service::ingest::IngestionHandler;
use aquamon_service::logging;
use aquamon_service::notify::{LogDispatcher, NotificationDispatcher, PushDispatcher};
use aquamon_service::server::{self, AppState};
use aquamon_service::store::{PgStore, ThresholdStore};
use aquamon_service::verify;

/// Water-quality sensor ingestion and alerting service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML config file. Missing file means defaults.
    #[arg(long, env = "AQUAMON_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run without Postgres or a push broker.
    #[arg(long)]
    dev: bool,

    /// Check the threshold store, print a JSON report and exit.
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = ServiceConfig::load(&args.config)?;
    config.apply_env(|key| std::env::var(key).ok())?;
    logging::init_logger(&config.logging.level, config.logging.json);

    // Everything that owns a blocking HTTP or database client is built here,
    // outside the async runtime.
    if args.dev {
        let dev = DevMode::new(&config);
        if args.verify {
            return print_verification(dev.store.as_ref());
        }
        let handler = Arc::new(dev.handler(config.notification.template()));
        return run_server(&config, handler);
    }

    let store = Arc::new(PgStore::connect(config.require_database_url()?)?);
    store.ensure_schema()?;
    let seeded = store.seed_thresholds(&config.seed_thresholds())?;
    info!(component = "thresholds", seeded, "threshold store ready");

    if args.verify {
        return print_verification(store.as_ref());
    }

    let dispatcher: Arc<dyn NotificationDispatcher> =
        match PushDispatcher::from_config(&config.notification) {
            Ok(push) => {
                info!(component = "notify", endpoint = push.endpoint(), "push delivery enabled");
                Arc::new(push)
            }
            Err(e) => {
                warn!(component = "notify", "push delivery disabled: {e}");
                Arc::new(LogDispatcher)
            }
        };

    let handler = Arc::new(IngestionHandler::new(
        store.clone(),
        store,
        dispatcher,
        Arc::new(BreachTracker::new()),
        config.notification.template(),
    ));
    run_server(&config, handler)
}

fn run_server(config: &ServiceConfig, handler: Arc<IngestionHandler>) -> Result<(), Box<dyn Error>> {
    let addr = config.server.socket_addr()?;
    let state = AppState {
        handler: Arc::clone(&handler),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(addr, state))?;
    drop(runtime);

    // Last reference dropped here, outside the runtime.
    drop(handler);
    info!(component = "system", "server stopped");
    Ok(())
}

fn print_verification(store: &dyn ThresholdStore) -> Result<(), Box<dyn Error>> {
    let report = verify::verify_thresholds(store);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
