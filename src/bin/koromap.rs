#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use koromap::assembler::{generate_map, GenerateOptions};
use koromap::cache::{MapCache, SqliteMapStore};
use koromap::types::{
    DisplayMode, NodeInput, PreferencePatch, SignalBucket, UpdateFrequency, UserPreferences,
};

#[derive(Parser)]
#[command(name = "koromap", version, about = "Relationship map generator CLI")]
struct Cli {
    /// Path to the local sqlite database.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a map (or print the cached one if still fresh)
    Generate {
        /// JSON file with an array of node inputs; falls back to persisted
        /// inputs, then to the default labels
        #[arg(long)]
        input: Option<PathBuf>,
        /// JSON file with a signal bucket; omit to use the random fallback
        #[arg(long)]
        signals: Option<PathBuf>,
        #[arg(long)]
        max_nodes: Option<usize>,
        /// Disable positional jitter
        #[arg(long)]
        no_jitter: bool,
        /// Fixed RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Regenerate even if a fresh map is cached
        #[arg(long)]
        force: bool,
    },
    /// Print the cached map, if fresh
    Show,
    /// Manage persisted node inputs
    Inputs {
        #[command(subcommand)]
        command: InputCommands,
    },
    /// Manage preferences
    Prefs {
        #[command(subcommand)]
        command: PrefCommands,
    },
    /// Erase cached map, node inputs, and settings
    Clear,
}

#[derive(Subcommand)]
enum InputCommands {
    /// Replace persisted node inputs from a JSON file
    Save {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print persisted node inputs
    List,
}

#[derive(Subcommand)]
enum PrefCommands {
    /// Print stored preferences
    Get,
    /// Update preference fields (unset fields keep their value)
    Set {
        #[arg(long)]
        max_nodes: Option<u8>,
        #[arg(long, value_enum)]
        update_frequency: Option<UpdateFrequencyArg>,
        #[arg(long, value_enum)]
        display_mode: Option<DisplayModeArg>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum UpdateFrequencyArg {
    Startup,
    Daily,
    Manual,
}

impl From<UpdateFrequencyArg> for UpdateFrequency {
    fn from(arg: UpdateFrequencyArg) -> Self {
        match arg {
            UpdateFrequencyArg::Startup => Self::Startup,
            UpdateFrequencyArg::Daily => Self::Daily,
            UpdateFrequencyArg::Manual => Self::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DisplayModeArg {
    Minimal,
    LabelEmphasis,
}

impl From<DisplayModeArg> for DisplayMode {
    fn from(arg: DisplayModeArg) -> Self {
        match arg {
            DisplayModeArg::Minimal => Self::Minimal,
            DisplayModeArg::LabelEmphasis => Self::LabelEmphasis,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = SqliteMapStore::new(cli.db.unwrap_or_else(SqliteMapStore::default_path))?;

    match cli.command {
        Commands::Generate {
            input,
            signals,
            max_nodes,
            no_jitter,
            seed,
            force,
        } => {
            if !force {
                if let Some(cached) = store.load_map().await? {
                    println!("{}", serde_json::to_string_pretty(&cached)?);
                    return Ok(());
                }
            }

            let inputs: Vec<NodeInput> = match input {
                Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                None => store.load_node_inputs().await?,
            };
            let bucket: Option<SignalBucket> = match signals {
                Some(path) => Some(serde_json::from_str(&std::fs::read_to_string(path)?)?),
                None => None,
            };

            let prefs = store.load_preferences().await?;
            let options = GenerateOptions {
                max_nodes: max_nodes.unwrap_or(prefs.max_nodes as usize),
                jitter_enabled: !no_jitter,
                rng_seed: seed,
            };

            let map = generate_map(&inputs, &options, bucket.as_ref(), bucket.is_some())?;
            store.store_map(&map).await?;
            if !inputs.is_empty() {
                store.store_node_inputs(&inputs).await?;
            }
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        Commands::Show => match store.load_map().await? {
            Some(map) => println!("{}", serde_json::to_string_pretty(&map)?),
            None => eprintln!("no fresh map cached"),
        },
        Commands::Inputs { command } => match command {
            InputCommands::Save { file } => {
                let inputs: Vec<NodeInput> =
                    serde_json::from_str(&std::fs::read_to_string(file)?)?;
                store.store_node_inputs(&inputs).await?;
                eprintln!("saved {} node inputs", inputs.len());
            }
            InputCommands::List => {
                let inputs = store.load_node_inputs().await?;
                println!("{}", serde_json::to_string_pretty(&inputs)?);
            }
        },
        Commands::Prefs { command } => match command {
            PrefCommands::Get => {
                let prefs = store.load_preferences().await?;
                println!("{}", serde_json::to_string_pretty(&prefs)?);
            }
            PrefCommands::Set {
                max_nodes,
                update_frequency,
                display_mode,
            } => {
                let patch = PreferencePatch {
                    max_nodes,
                    update_frequency: update_frequency.map(Into::into),
                    display_mode: display_mode.map(Into::into),
                };
                if let Some(n) = patch.max_nodes {
                    if !koromap::types::ALLOWED_MAX_NODES.contains(&n) {
                        return Err(format!("--max-nodes must be one of 6, 9, 12 (got {n})").into());
                    }
                }
                let current: UserPreferences = store.load_preferences().await?;
                let merged = current.merged(patch);
                store.store_preferences(&merged).await?;
                println!("{}", serde_json::to_string_pretty(&merged)?);
            }
        },
        Commands::Clear => {
            store.clear_all().await?;
            eprintln!("cleared local data");
        }
    }

    Ok(())
}
