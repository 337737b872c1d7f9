mod batches;
mod calendar;
mod cli;
mod db;
mod error;
mod exporter;
mod fellowship;
mod fmt;
mod identity;
mod importer;
mod ledger;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reconciler;
mod reports;
mod settings;
mod store;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{BatchCommands, Cli, Commands, MembersCommands, ReportCommands, TransactionsCommands};

fn main() {
    let cli = Cli::parse();
    init_logger(cli.log_level);
    debug!("Log level set to {}", cli.log_level.to_string().to_lowercase());

    let result = match cli.command {
        Commands::Init {
            data_dir,
            officer_id,
            officer_name,
            year,
        } => cli::init::run(data_dir, officer_id, officer_name, year),
        Commands::Status => cli::status::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Members { command } => match command {
            MembersCommands::Add {
                name,
                fellowship,
                phone,
                provisional,
            } => cli::members::add(&name, &fellowship, phone.as_deref(), provisional),
            MembersCommands::List { fellowship, json } => cli::members::list(fellowship.as_deref(), json),
            MembersCommands::Show { id, json } => cli::members::show(&id, json),
            MembersCommands::Search { query, json } => cli::members::search(&query, json),
            MembersCommands::Edit {
                id,
                name,
                phone,
                fellowship,
                status,
            } => cli::members::edit(&id, name, phone, fellowship.as_deref(), status.as_deref()),
            MembersCommands::Delete { id } => cli::members::delete(&id),
            MembersCommands::RecomputeYtd { year } => cli::members::recompute_ytd(year),
        },
        Commands::Give {
            member_id,
            amount,
            method,
            year,
            month,
            week,
        } => cli::give::run(&member_id, amount, &method, year, &month, week),
        Commands::Transactions { command } => match command {
            TransactionsCommands::List {
                method,
                fellowship,
                member,
                min,
                max,
                from,
                to,
                page,
                per_page,
                csv,
                json,
            } => cli::transactions::list(cli::transactions::ListArgs {
                method: method.as_deref(),
                fellowship: fellowship.as_deref(),
                member: member.as_deref(),
                min,
                max,
                from: from.as_deref(),
                to: to.as_deref(),
                page,
                per_page,
                csv,
                json,
            }),
            TransactionsCommands::Delete { id } => cli::transactions::delete(&id),
            TransactionsCommands::Undo => cli::transactions::undo(),
        },
        Commands::Batch { command } => match command {
            BatchCommands::Show => cli::batch::show(),
            BatchCommands::List { json } => cli::batch::list(json),
            BatchCommands::Count { counts } => cli::batch::count(&counts),
            BatchCommands::Finalize { counts } => cli::batch::finalize(&counts),
            BatchCommands::Sync { id } => cli::batch::sync(id),
        },
        Commands::Reconcile { counts } => cli::reconcile::run(&counts),
        Commands::Import { file, year, dry_run } => cli::import::run(&file, year, dry_run),
        Commands::Export { file, year } => cli::export::run(file, year),
        Commands::Report { command } => match command {
            ReportCommands::Summary {
                year,
                month,
                week,
                json,
            } => cli::report::summary(year, &month, week, json),
            #[cfg(feature = "pdf")]
            ReportCommands::Pdf {
                year,
                month,
                week,
                output,
            } => cli::report::pdf(year, &month, week, output),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        // Without RUST_LOG only this crate logs, at the requested level.
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
