//! Command-line interface for annot
//! Runs the document and annotation pipeline over unit and codebook files (JSON or YAML).
//!
//! Usage:
//!   annot tokens `<unit>` [--format json|table]           - Show the token sequence of a unit
//!   annot annotations `<unit>` [--records `<file>`]         - Show the decoded annotation maps
//!   annot export `<unit>` [--records `<file>`]              - Decode and re-encode annotations
//!   annot codebook `<codebook>` [--variable `<name>`] [--restrict VAR=VALUE]...
//!   annot completions `<shell>`                           - Print shell completions
//!
//! Every subcommand accepts `--config <file>` to layer a TOML file over the built-in
//! defaults, and `-v` (repeatable) to raise log verbosity. `RUST_LOG` takes precedence.

mod commands;
mod input;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use annot_config::{AnnotConfig, Loader};
use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use crate::commands::TokenFormat;

fn build_cli() -> Command {
    let unit_arg = Arg::new("unit")
        .help("Path to a unit file (.json, .yaml or .yml)")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .index(1);
    let records_arg = Arg::new("records")
        .long("records")
        .short('r')
        .help("Annotation records to use instead of the unit's own annotations")
        .value_parser(value_parser!(PathBuf));

    Command::new("annot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for preparing units, annotations and codebooks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML configuration file layered over the defaults")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("tokens")
                .about("Tokenize or import the text of a unit")
                .arg(unit_arg.clone())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "table"])
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("annotations")
                .about("Decode a unit's annotations into span, field and relation maps")
                .arg(unit_arg.clone())
                .arg(records_arg.clone()),
        )
        .subcommand(
            Command::new("export")
                .about("Decode and re-encode a unit's annotations")
                .arg(unit_arg)
                .arg(records_arg),
        )
        .subcommand(
            Command::new("codebook")
                .about("Prepare the questions or variables of a codebook")
                .arg(
                    Arg::new("codebook")
                        .help("Path to a codebook file (.json, .yaml or .yml)")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("variable")
                        .long("variable")
                        .help("Variable to scope to, or 'EDIT ALL'"),
                )
                .arg(
                    Arg::new("restrict")
                        .long("restrict")
                        .help("Restrict a variable to a value (VARIABLE=VALUE, repeatable)")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Print shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell))
                        .index(1),
                ),
        )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn load_config(path: Option<&PathBuf>) -> Result<AnnotConfig> {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().context("loading configuration")
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a Path> {
    matches.get_one::<PathBuf>(name).map(PathBuf::as_path)
}

fn run(matches: &ArgMatches) -> Result<String> {
    let config = load_config(matches.get_one::<PathBuf>("config"))?;

    match matches.subcommand() {
        Some(("tokens", sub)) => {
            let format = sub
                .get_one::<String>("format")
                .map(String::as_str)
                .unwrap_or("json");
            let unit = path_arg(sub, "unit").context("missing unit path")?;
            commands::tokens(unit, TokenFormat::parse(format)?, &config)
        }
        Some(("annotations", sub)) => {
            let unit = path_arg(sub, "unit").context("missing unit path")?;
            commands::annotations(unit, path_arg(sub, "records"), &config)
        }
        Some(("export", sub)) => {
            let unit = path_arg(sub, "unit").context("missing unit path")?;
            commands::export(unit, path_arg(sub, "records"), &config)
        }
        Some(("codebook", sub)) => {
            let path = path_arg(sub, "codebook").context("missing codebook path")?;
            let restricted = commands::parse_restrictions(
                sub.get_many::<String>("restrict")
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            )?;
            let selection = sub.get_one::<String>("variable").map(String::as_str);
            commands::codebook(path, selection, &restricted, &config)
        }
        Some(("completions", sub)) => {
            let shell = *sub.get_one::<Shell>("shell").context("missing shell")?;
            let mut out = Vec::new();
            clap_complete::generate(shell, &mut build_cli(), "annot", &mut out);
            String::from_utf8(out).context("completions are not valid UTF-8")
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
