//! Budget Backoffice daemon

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use budget_backoffice::{
    config::{Args, Command},
    db::Database,
    http::HttpServer,
    logging::AuditLogger,
    services::Services,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("budget_backoffice={},audit={},info", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let db = Arc::new(Database::open(&args.database_path)?);
    let services = Arc::new(Services::new(db, args.jwt_validator()?));

    if let Some(Command::AddUser { userid, password }) = &args.command {
        let id = services.auth.add_user(userid, password)?;
        info!(userid = %userid, id, "User saved");
        return Ok(());
    }

    info!("======================================");
    info!("  Budget Backoffice");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Database: {}", args.database_path.display());
    info!("Audit log: {}", args.log_dir.display());
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("======================================");

    let audit = AuditLogger::new(args.audit_config());
    let server = Arc::new(HttpServer::new(services, audit, args.listen));

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server stopped");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
