mod challenge;
mod cli;
mod config;
mod db;
mod error;
mod lesson;
mod routes;
mod state;
mod templates;

use clap::Parser;
use std::sync::Arc;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sui_garage=info,tower_http=info".into()),
        )
        .init();

    if cli.resolved_command() == &Command::Lesson {
        let mut session = lesson::LessonSession::new(lesson::chapters())?;
        let stdin = std::io::stdin();
        lesson::terminal::run(&mut session, stdin.lock(), std::io::stdout())?;
        return Ok(());
    }

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let state = Arc::new(state::AppState::new(pool, config.clone()));
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        review_mode = config.review_mode.as_str(),
        max_chapter = config.max_chapter,
        "Sui Garage listening on http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
