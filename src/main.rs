use std::{io, path::PathBuf};

use clap::{ArgAction, Parser as ClapParser, Subcommand, ValueEnum};
use briq::cli::{self, CheckOptions, CliError, OutputFormat, RunOptions};

#[derive(ClapParser)]
#[command(name = "briq")]
#[command(about = "Briq - run block-built tabular data transformation programs")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pipeline of a program and print the results
    Run {
        /// Program document (JSON)
        program: PathBuf,

        /// External table as name=path (.csv or .json); repeatable
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Validate a program and print its run order
    Check {
        /// Program document (JSON)
        program: PathBuf,
    },

    /// Print stage kinds, operators and summarize options as JSON
    Catalog,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            program,
            sources,
            pretty,
            format,
        } => run(program, sources, pretty, format),
        Commands::Check { program } => check(program),
        Commands::Catalog => {
            println!("{}", briq::to_json_pretty(&cli::catalog()));
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(log_level).init();
}

fn run(program: PathBuf, sources: Vec<String>, pretty: bool, format: Format) -> Result<bool, CliError> {
    let sources = sources
        .iter()
        .map(|arg| cli::parse_source_arg(arg))
        .collect::<Result<Vec<_>, _>>()?;

    // pretty by default when writing JSON to a terminal
    let pretty = pretty || (atty::is(atty::Stream::Stdout) && matches!(format, Format::Json));

    let options = RunOptions {
        program,
        sources,
        pretty,
        format: match format {
            Format::Json => OutputFormat::Json,
            Format::Csv => OutputFormat::Csv,
        },
    };

    let mut stdout = io::stdout().lock();
    let summary = cli::execute_run(&options, &mut stdout)?;
    if !summary.is_success() {
        eprintln!(
            "{} succeeded, {} failed, {} blocked",
            summary.succeeded, summary.failed, summary.blocked
        );
    }
    Ok(summary.is_success())
}

fn check(program: PathBuf) -> Result<bool, CliError> {
    let order = cli::execute_check(&CheckOptions { program })?;
    println!("Program is valid. Run order: {}", order.join(", "));
    Ok(true)
}
