use clap::Parser;
use pocket_ledger::args::{Args, Command, ProfileCommand};
use pocket_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match pocket_ledger::error_type(&e) {
                Some(error_type) => error!("Exiting with {error_type} error: {e:#}"),
                None => error!("Exiting with error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

pub fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    let load = || Config::load(home);

    // Route to appropriate command handler
    let _: () = match args.command().clone() {
        Command::Init => commands::init(home)?.print(),
        Command::Register(args) => commands::register(&load()?, args)?.print(),
        Command::Login(credentials) => commands::login(&load()?, credentials)?.print(),
        Command::ResetPassword(args) => commands::reset_password(&load()?, args)?.print(),
        Command::Add(args) => commands::add(&load()?, args)?.print(),
        Command::Update(args) => commands::update(&load()?, args)?.print(),
        Command::Delete(args) => commands::delete(&load()?, args.id)?.print(),
        Command::Show(args) => commands::show(&load()?, args.id)?.print(),
        Command::List => commands::list(&load()?)?.print(),
        Command::Search(args) => commands::search(&load()?, args)?.print(),
        Command::Summary(args) => commands::summary(&load()?, args)?.print(),
        Command::Stats(args) => commands::stats(&load()?, args)?.print(),
        Command::Categories(args) => commands::categories(args.kind)?.print(),
        Command::Export(args) => commands::export(&load()?, args)?.print(),
        Command::Profile(profile_args) => {
            let config = load()?;
            match profile_args.command().clone() {
                ProfileCommand::Show(credentials) => {
                    commands::profile_show(&config, credentials)?.print()
                }
                ProfileCommand::Update(args) => commands::profile_update(&config, args)?.print(),
                ProfileCommand::Export(args) => commands::profile_export(&config, args)?.print(),
            }
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "pocket_ledger={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
