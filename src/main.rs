//! Labtrend
//!
//! Main entry point for the labtrend dashboard backend.

use std::path::PathBuf;
use std::sync::Arc;

use actix_files as fs;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use labtrend::api::{self, AppState};
use labtrend::config::{load_config, Config, LoggingConfig, SourceKind};
use labtrend::core::charts::{build_single_series, resolve_window};
use labtrend::db::LabDataLoader;
use labtrend::ui::ResultsTable;
use labtrend::{LabDataContext, LoadStatus};

#[derive(Parser)]
#[command(name = "labtrend", about = "Personal lab result dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Read lab data from this directory instead of the configured source
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve,
    /// Print test categories with their tests
    Summary,
    /// Print the results table for one test
    Table { test: String },
    /// Print the chart series for one test as JSON
    Chart {
        test: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn load_context(config: &Config) -> Result<Arc<LabDataContext>> {
    let loader = LabDataLoader::from_config(&config.data).context("invalid data source")?;
    let context = Arc::new(LabDataContext::new(loader, config.category_table()));
    context.reload().await;
    Ok(context)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_config().context("failed to load configuration")?;
    if let Some(root) = cli.data_root {
        config.data.source = SourceKind::Fs;
        config.data.root = root;
    }
    init_tracing(&config.logging);

    let context = load_context(&config).await?;

    match cli.command {
        Commands::Serve => serve(config, context).await?,
        Commands::Summary => {
            match context.status().await {
                LoadStatus::Ready { is_demo: true } => println!("Using demo data\n"),
                LoadStatus::Empty { message } | LoadStatus::Failed { message } => {
                    println!("{}", message);
                    return Ok(());
                }
                _ => {}
            }
            for (category, tests) in context.test_categories().await {
                println!("{} ({})", category, tests.len());
                for test in tests {
                    println!("  {}", test);
                }
            }
        }
        Commands::Table { test } => {
            let data = context.snapshot().await;
            print!("{}", ResultsTable::build(&data, &test)?);
        }
        Commands::Chart { test, start, end } => {
            let data = context.snapshot().await;
            let window = resolve_window(
                &data,
                std::slice::from_ref(&test),
                start.as_deref(),
                end.as_deref(),
            )?;
            let series = build_single_series(&data, &test, window);
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
    }
    Ok(())
}

async fn serve(config: Config, context: Arc<LabDataContext>) -> Result<()> {
    let state = web::Data::new(AppState::new(context, &config));
    let bind = (config.server.host.clone(), config.server.port);
    let static_root = (config.data.serve_static && config.data.source == SourceKind::Fs)
        .then(|| config.data.root.clone());

    info!("Starting server on {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        let static_root = static_root.clone();
        App::new()
            .app_data(state.clone())
            .wrap(api::middleware::cors(&config.server))
            .wrap(TracingLogger::default())
            .configure(api::configure)
            .configure(move |cfg| {
                if let Some(root) = static_root {
                    cfg.service(fs::Files::new("/data", root));
                }
            })
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}
