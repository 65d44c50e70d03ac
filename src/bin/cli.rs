// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Figurine CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use figurine::cli::Reporter;
use figurine::{generate_to_file, io, GeneratorConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "figurine")]
#[command(about = "Parametric low-poly humanoid generator with glTF export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// TOML configuration file (defaults to ./figurine.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file (.glb or .gltf)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Standing height in meters
    #[arg(long, value_name = "M")]
    height: Option<f64>,

    /// Disable the jeans cuffs
    #[arg(long)]
    no_cuffs: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the figure and export it
    Generate(GenerateArgs),

    /// Print the default configuration as TOML
    Params,

    /// Print counts, bounds and checksum of an exported asset
    Inspect {
        /// Input .glb or .gltf file
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Generate(args)) => generate_command(args),
        Some(Commands::Params) => params_command(),
        Some(Commands::Inspect { input, verbose }) => {
            init_tracing(verbose);
            inspect_command(&input)
        }
        Some(Commands::Version) => {
            println!("Figurine v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => generate_command(cli.generate),
    };

    if let Err(err) = result {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn generate_command(args: GenerateArgs) -> Result<()> {
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)?.with_env_overrides()?,
        None => GeneratorConfig::load()?,
    };
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(height) = args.height {
        config.params.height = height;
    }
    if args.no_cuffs {
        config.params.clothing.cuff_height = 0.0;
    }

    if args.verbose {
        Reporter::report_info(&format!("Generating {}", config.object_name));
    }

    let start = std::time::Instant::now();
    let mesh = generate_to_file(&config)?;
    Reporter::report_generated(&mesh, &config.output, start.elapsed());

    Ok(())
}

fn params_command() -> Result<()> {
    print!("{}", GeneratorConfig::default().to_toml()?);
    Ok(())
}

fn inspect_command(input: &Path) -> Result<()> {
    let asset = io::import_gltf(input)?;
    let digest = io::file_digest(input)?;
    Reporter::report_inspect(input, &asset, &digest);
    Ok(())
}
