mod app_config;
mod cli;
mod commands;
mod return_listener;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::commands::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "boleto_app=info,boleto_checkout=info,boleto_feed=info,boleto_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = app_config::Config::load()?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Command::Login { email, password } => commands::login(&ctx, &email, &password).await,
        Command::Register {
            name,
            email,
            password,
            role,
        } => commands::register(&ctx, &name, &email, &password, role).await,
        Command::Logout => commands::logout(&ctx),
        Command::Events { action } => commands::events(&ctx, action).await,
        Command::Checkout { event_id, quantity } => {
            commands::checkout(&ctx, event_id, quantity).await
        }
        Command::Tickets { watch } => commands::tickets(&ctx, watch).await,
    }
}
