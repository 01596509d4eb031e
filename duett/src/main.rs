use std::{path::PathBuf, process::ExitCode};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use duett_frontend::settings::Settings;
use duett_listing::model::{SortColumn, SortDirection};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Initialization error")]
    Initialization,
}

#[tokio::main]
async fn main() -> ExitCode {
    let logpath = match get_logging_path() {
        Ok(it) => it,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let logfile = tracing_appender::rolling::daily(logpath, "log");
    tracing_subscriber::fmt()
        .compact()
        .with_writer(logfile)
        .init();

    debug!("starting application");

    let mut settings = Settings::default();
    map_args_to_settings(&cli().get_matches(), &mut settings);

    match duett_frontend::run(settings).await {
        Ok(()) => {
            debug!("closing application");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("closing application with error: {:?}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    Command::new("duett")
        .about("duett - two panes, one undo log, reads commands from stdin")
        .args([
            // NOTE: arguments
            Arg::new("path")
                .action(ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .help("directory to open in the first pane"),
            // NOTE: options
            Arg::new("second")
                .long("second")
                .action(ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .help("open a second pane with this directory"),
            Arg::new("trash")
                .long("trash")
                .action(ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .help("trash root holding files/ and info/, defaults to the desktop trash"),
            Arg::new("max-undo")
                .long("max-undo")
                .action(ArgAction::Set)
                .value_parser(value_parser!(usize))
                .help("number of actions kept in the undo log"),
            Arg::new("show-hidden")
                .long("show-hidden")
                .action(ArgAction::SetTrue)
                .default_value("false")
                .help("list entries starting with a dot"),
            Arg::new("sort")
                .long("sort")
                .action(ArgAction::Set)
                .value_parser(|value: &str| value.parse::<SortColumn>())
                .help("initial sort column: name, size, type or modified"),
            Arg::new("descending")
                .long("descending")
                .action(ArgAction::SetTrue)
                .default_value("false")
                .help("sort descending"),
        ])
}

fn map_args_to_settings(args: &ArgMatches, settings: &mut Settings) {
    settings.startup_path = args.get_one("path").cloned();
    settings.second_path = args.get_one("second").cloned();
    settings.trash_path = args.get_one("trash").cloned();
    settings.show_hidden = args.get_flag("show-hidden");

    if let Some(max_undo) = args.get_one::<usize>("max-undo") {
        settings.max_undo = *max_undo;
    }

    if let Some(column) = args.get_one::<SortColumn>("sort") {
        settings.sort.column = *column;
    }

    if args.get_flag("descending") {
        settings.sort.direction = SortDirection::Descending;
    }
}

fn get_logging_path() -> Result<PathBuf, Error> {
    match dirs::cache_dir() {
        Some(cache_dir) => Ok(cache_dir.join("duett").join("logs")),
        None => Err(Error::Initialization),
    }
}
