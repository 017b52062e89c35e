use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dxd_reader::parser::{detect_dxd_format, is_dxd_file, DxdParser, FileParser, LoaderConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dxd_cli")]
#[command(about = "A CLI tool for inspecting DEWESoft DXD/DXZ recordings")]
struct Cli {
    #[arg(long, global = true, help = "Loader config JSON (defaults to the user config dir)")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quick signature check, never opens the recording
    Check {
        path: PathBuf,
    },
    /// Channel names, rates and container type as JSON
    Detect {
        path: PathBuf,
    },
    /// Per-channel metadata table
    Channels {
        path: PathBuf,
    },
    /// Print the first samples of one channel
    Dump {
        path: PathBuf,
        channel: String,
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
    /// Channel inventory for every recording under a directory
    Dataset {
        dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => LoaderConfig::from_file(path)
            .with_context(|| format!("loading config {:?}", path))?,
        None => LoaderConfig::load(),
    };

    match cli.command {
        Commands::Check { path } => {
            let plausible = is_dxd_file(&path);
            println!("{}: {}", path.display(), if plausible { "DXD" } else { "not DXD" });
        }

        Commands::Detect { path } => {
            let report = detect_dxd_format(&path, &config)
                .with_context(|| format!("detecting format of {:?}", path))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Channels { path } => {
            let df = FileParser::parse_file(&path, &config)?.collect()?;
            println!("{}", df);
        }

        Commands::Dump { path, channel, count } => {
            let mut parser = DxdParser::open_with(&path, &config)
                .with_context(|| format!("opening {:?}", path))?;
            if parser.is_inferred() {
                eprintln!("warning: channel layout was inferred, values may be approximate");
            }
            let (time, values) = parser.get_channel_data(&channel)?;
            let units = parser
                .get_channel_info(&channel)
                .map(|c| c.units.clone())
                .unwrap_or_default();
            println!("time_s\t{} [{}]", channel, units);
            for (t, v) in time.iter().zip(&values).take(count) {
                println!("{:.6}\t{}", t, v);
            }
            println!("({} samples total)", values.len());
            parser.close();
        }

        Commands::Dataset { dir } => {
            let dataset = FileParser::parse_directory(&dir, &config)?.collect()?;
            println!("Dataset shape: {:?}", dataset.shape());
            println!("{}", dataset);
        }
    }

    Ok(())
}
