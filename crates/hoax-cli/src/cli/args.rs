use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hoax",
    version,
    about = "Truth or Hoax: two versions of a historical event, one of them made up"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Config file (missing file means defaults)
    #[arg(long, global = true, env = "HOAX_CONFIG", default_value = "hoax.yaml")]
    pub config: PathBuf,

    /// SQLite database path; overrides `database` in the config
    #[arg(long, global = true, env = "HOAX_DB")]
    pub db: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP game server
    Serve(ServeArgs),
    /// Write a sample hoax.yaml
    Init(InitArgs),
    /// Load the bundled stories into an empty database
    Seed,
    /// Play rounds in the terminal
    Play(PlayArgs),
    /// Accuracy statistics
    Stats(StatsArgs),
    /// Manage stories
    Story(StoryArgs),
    /// Manage folders
    Folder(FolderArgs),
    Version,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Listen address; overrides `bind` in the config
    #[arg(long, env = "HOAX_BIND")]
    pub bind: Option<String>,

    /// Skip seeding an empty database on start
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct PlayArgs {
    /// Folder id, or `all`
    #[arg(long)]
    pub folder: Option<String>,

    /// Reuse a session id instead of minting one
    #[arg(long)]
    pub session: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub rounds: usize,

    /// Answer with this slot (`T` or `H`) instead of prompting
    #[arg(long)]
    pub choice: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub cmd: StatsSub,
}

#[derive(Subcommand, Debug)]
pub enum StatsSub {
    /// Totals for one session
    Session {
        session_id: String,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Per-story attempts and accuracy
    Stories {
        #[arg(long)]
        folder: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(clap::Args, Debug)]
pub struct StoryArgs {
    #[command(subcommand)]
    pub cmd: StorySub,
}

#[derive(clap::Args, Debug, Default)]
pub struct StoryFields {
    #[arg(long)]
    pub event: Option<String>,
    #[arg(long)]
    pub true_version: Option<String>,
    #[arg(long)]
    pub fake_version: Option<String>,
    #[arg(long)]
    pub explanation: Option<String>,
    #[arg(long)]
    pub introduction: Option<String>,
    #[arg(long)]
    pub hint: Option<String>,
    /// Folder id (defaults to General on add, unchanged on edit)
    #[arg(long)]
    pub folder: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum StorySub {
    List {
        #[arg(long)]
        folder: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    Show {
        id: String,
    },
    Add {
        #[command(flatten)]
        fields: StoryFields,
    },
    /// Replace the given fields; others keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: StoryFields,
    },
    Delete {
        id: String,
        /// Also delete the story's answers and rounds
        #[arg(long)]
        cascade: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct FolderArgs {
    #[command(subcommand)]
    pub cmd: FolderSub,
}

#[derive(Subcommand, Debug)]
pub enum FolderSub {
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    Add {
        name: String,
    },
    Rename {
        id: i64,
        name: String,
    },
    /// Delete a folder; its stories move to General
    Delete {
        id: i64,
    },
}
