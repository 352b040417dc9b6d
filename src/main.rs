//! AgriChain - supply-chain traceability gateway

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agrichain::{
    catalog::ProductCatalog,
    config::Args,
    fetch::ProductFetcher,
    ledger::ContractClient,
    logging::CallLogger,
    ui::{App, DataSource},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("agrichain={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  AgriChain - traceability gateway");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Mode: {}", if args.online { "LEDGER" } else { "OFFLINE DEMO" });
    if args.online {
        info!("Ledger node: {}", args.ledger_url);
    }
    info!("======================================");

    // Call audit trail (file-backed when configured)
    let call_log = CallLogger::new(args.node_id.to_string());
    if let Some(ref path) = args.call_log {
        if let Err(e) = call_log.init_file(path.clone()).await {
            error!("Failed to open call log {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }

    // Pick the track panel's data source
    let source = if args.online {
        let Some(ref address) = args.contract_address else {
            // validate() already rejected this
            error!("Configuration error: no contract address");
            std::process::exit(1);
        };
        info!("Contract: {}", address);

        let contract = Arc::new(ContractClient::new(
            &args.ledger_url,
            address,
            args.request_timeout_ms,
            call_log.clone(),
        ));
        DataSource::Ledger(ProductFetcher::new(contract))
    } else {
        let catalog = ProductCatalog::demo();
        info!("Demo catalog loaded ({} product)", catalog.len());
        DataSource::Catalog(catalog)
    };

    // Run the interactive shell
    let mut app = App::new(source);
    if let Err(e) = app.run().await {
        error!("Shell error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
