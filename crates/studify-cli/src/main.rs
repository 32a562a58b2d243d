use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "studify-cli", version, about = "Studify CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Coin balance and history
    Coins {
        #[command(subcommand)]
        action: commands::coins::CoinsAction,
    },
    /// Homework tracker
    Homework {
        #[command(subcommand)]
        action: commands::homework::HomeworkAction,
    },
    /// Timer duration settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Session statistics and streaks
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Collaborative study rooms
    Room {
        #[command(subcommand)]
        action: commands::room::RoomAction,
    },
    /// Reward shop
    Shop {
        #[command(subcommand)]
        action: commands::shop::ShopAction,
    },
    /// AI study assistant
    Assistant {
        #[command(subcommand)]
        action: commands::assistant::AssistantAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Coins { action } => commands::coins::run(action),
        Commands::Homework { action } => commands::homework::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Room { action } => commands::room::run(action),
        Commands::Shop { action } => commands::shop::run(action),
        Commands::Assistant { action } => commands::assistant::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
