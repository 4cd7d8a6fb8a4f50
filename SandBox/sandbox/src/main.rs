//! # tally-run
//!
//! Runs one input through a Tally compute guest and prints the envelope.
//!
//! ## Usage
//! ```bash
//! tally-run --module target/wasm32-unknown-unknown/release/tally_wasm_guest.wasm --input "1,5,-3, 7"
//!
//! # Guest built with the scailable-abi feature, input from a file
//! tally-run -m guest.wasm --abi scailable --input-file numbers.txt -vv
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tally_sandbox::config::{DEFAULT_FUEL_LIMIT, DEFAULT_MAX_MEMORY_PAGES};
use tally_sandbox::{AbiNames, Sandbox, SandboxConfig};

#[derive(Parser)]
#[command(
    name = "tally-run",
    about = "Sum the integers in an input through a sandboxed WASM guest",
    version
)]
struct Cli {
    /// Path to the guest `.wasm` module.
    #[arg(short, long)]
    module: PathBuf,

    /// Input text, e.g. "1,5,-3, 7".
    #[arg(short, long, conflicts_with = "input_file", required_unless_present = "input_file")]
    input: Option<String>,

    /// Read the input bytes from a file instead.
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Export names to drive.
    #[arg(long, value_enum, default_value_t = Abi::Tally)]
    abi: Abi,

    /// Instruction fuel per run.
    #[arg(long, default_value_t = DEFAULT_FUEL_LIMIT)]
    fuel: u64,

    /// Linear memory cap in 64 KiB pages.
    #[arg(long, default_value_t = DEFAULT_MAX_MEMORY_PAGES)]
    max_memory_pages: u32,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Abi {
    /// allocate / compute / get_output_location / get_output_length / release
    Tally,
    /// malloc_buffer / pred / get_out_loc / get_out_len / free_buffer
    Scailable,
}

impl From<Abi> for AbiNames {
    fn from(abi: Abi) -> Self {
        match abi {
            Abi::Tally => AbiNames::TALLY,
            Abi::Scailable => AbiNames::SCAILABLE,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let input = match (&cli.input, &cli.input_file) {
        (Some(text), _) => text.clone().into_bytes(),
        (None, Some(path)) => std::fs::read(path)
            .with_context(|| format!("reading input file {}", path.display()))?,
        (None, None) => anyhow::bail!("either --input or --input-file is required"),
    };

    let config = SandboxConfig {
        max_memory_pages: cli.max_memory_pages,
        fuel_limit: cli.fuel,
        abi: cli.abi.into(),
    };

    let sandbox = Sandbox::from_file(&cli.module, config)
        .with_context(|| format!("loading guest module {}", cli.module.display()))?;
    let output = sandbox.run(&input).context("running guest")?;

    tracing::info!(value = output.value(), "done");
    println!("{}", output.text());
    Ok(())
}
