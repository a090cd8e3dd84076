use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use supportdesk::api;
use supportdesk::chat::ChatService;
use supportdesk::cli::{commands::{Cli, Commands}, run_cli};
use supportdesk::config::AppConfig;
use supportdesk::db;
use supportdesk::llm::ProviderFactory;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        if let Err(e) = run_cli(cli.command, cli.config).await {
            error!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Starting support chat server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let llm_provider = match ProviderFactory::create_default(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize completion provider: {}", e);
            std::process::exit(1);
        }
    };

    let service = ChatService::new(db_pool, llm_provider);

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .wrap(api::cors_headers())
            .wrap(Logger::default())
            .configure(api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
