mod auth;
mod config;
mod db;
mod error;
mod models;
mod pages;
mod routes;
mod user_handlers;

use actix_web::{middleware::Logger, web, App, HttpServer};
use auth::TokenIssuer;
use clap::{Parser, Subcommand};
use config::Config;
use db::CredentialStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "auth_gate", version, about = "Signup, login and bearer-token gated dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create or upgrade the user table, then exit
    Migrate,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            CredentialStore::migrate(&config.database_path)?;
            Ok(())
        }
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET_KEY is not set; using the insecure default signing secret");
    }

    let store = web::Data::new(CredentialStore::open(
        &config.database_path,
        config.bcrypt_cost,
    )?);
    let issuer = web::Data::new(TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        config.token_ttl,
    ));

    let addr = (config.host.clone(), config.port);
    tracing::info!(host = %addr.0, port = addr.1, db = %config.database_path.display(), "listening");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .app_data(issuer.clone())
            .configure(routes::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
