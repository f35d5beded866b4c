use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "subtrack", version, about = "Track recurring subscriptions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a subscription
    Add(commands::subscription::AddArgs),
    /// List subscriptions
    List(commands::subscription::ListArgs),
    /// Show one subscription
    Get {
        /// Subscription ID
        id: i64,
    },
    /// Update a subscription
    Update(commands::subscription::UpdateArgs),
    /// Delete a subscription
    Delete {
        /// Subscription ID
        id: i64,
    },
    /// Monthly total, per-category totals and upcoming charges
    Summary(commands::summary::SummaryArgs),
    /// Charge reminders
    Alerts {
        #[command(subcommand)]
        action: commands::alerts::AlertsAction,
    },
    /// Export subscriptions as CSV
    Export(commands::export::ExportArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Add(args) => commands::subscription::add(args),
        Commands::List(args) => commands::subscription::list(args),
        Commands::Get { id } => commands::subscription::get(id),
        Commands::Update(args) => commands::subscription::update(args),
        Commands::Delete { id } => commands::subscription::delete(id),
        Commands::Summary(args) => commands::summary::run(args),
        Commands::Alerts { action } => commands::alerts::run(action),
        Commands::Export(args) => commands::export::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
