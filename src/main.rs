use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use easyrule_gen::model::DEFAULT_INTERFACE;
use easyrule_gen::report::{write_plan, OutputFormat};
use easyrule_gen::{generate_plan, load_mapping, BlockError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate pfSense easyrule block commands from a binary solution string", long_about = None)]
struct Cli {
    /// Binary state string, e.g. 00101101. Use '-' to read it from stdin
    binary: String,

    /// File with one '<position> <address>' pair per line
    #[arg(short, long, default_value = "mapping.txt")]
    mapping: PathBuf,

    /// Firewall interface named in the generated commands
    #[arg(short, long, default_value = DEFAULT_INTERFACE)]
    interface: String,

    /// Output format for the generated commands
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Fatal `BlockError`s carry their own status; anything else is a plain failure.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BlockError>()
        .filter(|err| err.is_fatal())
        .map(BlockError::exit_code)
        .unwrap_or(1)
}

fn run(cli: &Cli) -> Result<()> {
    let mapping = load_mapping(&cli.mapping)?;
    let binary = read_binary(&cli.binary, io::stdin())?;
    let plan = generate_plan(&binary, &mapping, &cli.interface)?;

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            write_plan(&plan, &cli.interface, cli.format, BufWriter::new(file))
        }
        None => write_plan(&plan, &cli.interface, cli.format, io::stdout().lock()),
    }
}

/// Returns `arg` itself, or the trimmed contents of `stdin` when `arg` is "-".
fn read_binary<R: Read>(arg: &str, mut stdin: R) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .context("Failed to read binary string from stdin")?;
    Ok(input.trim().to_string())
}
