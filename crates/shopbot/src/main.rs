use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use tokio::time::sleep;

use shopbot::cli::{Cli, Commands};
use shopbot::dispatch::ShopDispatcher;
use shopbot::telegram::{HandlerDeps, create_bot, schema, setup_bot_commands};
use shopbot::upload::{self, ProductRecord, ShopRecord, UploadReport};
use shopcore::config::{self, ElasticpathSettings, LoggingSettings, Settings};
use shopcore::core::{init_logger, log_startup_configuration};
use shopcore::{ElasticpathClient, MemorySessionStore, RedisSessionStore, SessionStore};

/// Main entry point for the shop bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, Redis)
/// or if an upload tool could not upload every record.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&LoggingSettings::from_env()?)?;

    match cli.command {
        Some(Commands::Run { memory_sessions }) => {
            log::info!("Running bot (memory sessions: {})", memory_sessions);
            run_bot(load_settings()?, memory_sessions).await
        }
        Some(Commands::UploadProducts { file, currency }) => run_upload_products(&file, &currency).await,
        Some(Commands::UploadShops { file, flow_slug }) => run_upload_shops(&file, &flow_slug).await,
        Some(Commands::SetupShopsFlow { slug, name }) => run_setup_shops_flow(&slug, &name).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(load_settings()?, false).await
        }
    }
}

fn load_settings() -> Result<Settings> {
    Settings::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        e.into()
    })
}

fn elasticpath_client() -> Result<ElasticpathClient> {
    let settings = ElasticpathSettings::from_env().inspect_err(|e| log::error!("Configuration error: {}", e))?;
    if settings.client_secret.is_none() {
        log::warn!(
            "{} is not set; the implicit grant usually cannot write to the catalog",
            config::ELASTICPATH_CLIENT_SECRET
        );
    }
    Ok(ElasticpathClient::new(&settings)?)
}

async fn run_bot(settings: Settings, memory_sessions: bool) -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration(&settings);

    let commerce = Arc::new(ElasticpathClient::new(&settings.elasticpath)?);

    let sessions: Arc<dyn SessionStore> = if memory_sessions {
        log::warn!("Sessions are kept in memory and will be lost on restart");
        Arc::new(MemorySessionStore::new())
    } else {
        let store = RedisSessionStore::connect(&settings.redis).await.inspect_err(|e| {
            log::error!(
                "Cannot connect to Redis at {}:{}: {}",
                settings.redis.host,
                settings.redis.port,
                e
            )
        })?;
        Arc::new(store)
    };

    let bot = create_bot(&settings)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let deps = HandlerDeps::new(Arc::new(ShopDispatcher::new(commerce, sessions)));
    let handler = schema(deps);

    log::info!("Starting bot in long polling mode");

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // A panicking dispatcher only takes down this task, not the process.
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() => {
                log::error!("Dispatcher panicked: {}", join_err);

                if retry_count < max_retries {
                    retry_count += 1;
                    log::info!(
                        "Restarting dispatcher after panic (attempt {}/{})...",
                        retry_count,
                        max_retries
                    );
                    exponential_backoff(retry_count).await;
                } else {
                    log::error!("Max retries reached after panic. Exiting...");
                    return Err(anyhow::anyhow!("dispatcher kept panicking"));
                }
            }
            Err(join_err) => {
                log::warn!("Dispatcher task was cancelled: {}", join_err);
                break;
            }
        }

        sleep(config::retry::dispatcher_delay()).await;
    }

    Ok(())
}

async fn run_upload_products(file: &Path, currency: &str) -> Result<()> {
    let client = elasticpath_client()?;
    let records: Vec<ProductRecord> = upload::read_records(file).await?;
    log::info!("Uploading {} products from {}", records.len(), file.display());

    let http = reqwest::Client::builder().timeout(config::network::timeout()).build()?;
    let report = upload::upload_products(&client, &http, &records, currency).await;
    finish_upload("products", report)
}

async fn run_upload_shops(file: &Path, flow_slug: &str) -> Result<()> {
    let client = elasticpath_client()?;
    let records: Vec<ShopRecord> = upload::read_records(file).await?;
    log::info!("Uploading {} shops from {} into flow {:?}", records.len(), file.display(), flow_slug);

    let report = upload::upload_shops(&client, &records, flow_slug).await;
    finish_upload("shops", report)
}

async fn run_setup_shops_flow(slug: &str, name: &str) -> Result<()> {
    let client = elasticpath_client()?;
    let flow = upload::setup_shops_flow(&client, name, slug).await?;
    log::info!("Flow {:?} is ready ({})", flow.slug, flow.id);
    Ok(())
}

fn finish_upload(what: &str, report: UploadReport) -> Result<()> {
    log::info!("Uploaded {}: {} created, {} failed", what, report.created, report.failed);
    if report.failed > 0 {
        return Err(anyhow::anyhow!("{} of the {} could not be uploaded", report.failed, what));
    }
    Ok(())
}

/// Exponential backoff delay for retries
async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}
