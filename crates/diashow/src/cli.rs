use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "diashow")]
#[command(author, version, about)]
#[command(long_about = "A multi-display slideshow with a shared live head.\n\n\
    A speaker drives the room; every audience window follows the speaker's\n\
    slide until it detaches to browse on its own.\n\n\
    Examples:\n  \
    diashow talk.md --speaker        Present and drive the room\n  \
    diashow talk.md                  Follow the room as audience\n  \
    diashow talk.md --display notes  Follow, showing the notes panels\n  \
    diashow live follow              Watch the live head from a terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Markdown deck to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Room whose live head to follow (defaults.room, else "default")
    #[arg(long, global = true)]
    pub room: Option<String>,

    /// Directory holding the shared live heads (store.dir, else the data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Keep the live head in memory; nothing is shared with other windows
    #[arg(long, global = true)]
    pub offline: bool,

    /// Start as the speaker
    #[arg(long)]
    pub speaker: bool,

    /// Start on this slide id
    #[arg(long, value_name = "ID")]
    pub slide: Option<String>,

    /// Start on this display id
    #[arg(long, value_name = "ID")]
    pub display: Option<String>,

    /// Launch in a window instead of fullscreen
    #[arg(long)]
    pub windowed: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the slides, panels and default displays of a deck
    Outline {
        /// Markdown deck to inspect
        file: PathBuf,
    },

    /// Inspect or drive a room's live head
    Live {
        #[command(subcommand)]
        command: LiveCommands,
    },

    /// List recorded viewer positions
    Audience,

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum LiveCommands {
    /// Print the current live head
    Show,

    /// Publish a live head, as a speaker would
    Set {
        /// Slide id
        #[arg(long)]
        slide: Option<String>,

        /// Display id
        #[arg(long)]
        display: Option<String>,
    },

    /// Print every live-head change until interrupted
    Follow,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. viewer.name, defaults.room, store.dir)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load_or_default();
        let room = config.room(self.room.as_deref());

        match self.command {
            Some(Commands::Outline { file }) => crate::commands::outline::run(&file),
            Some(Commands::Live { command }) => {
                let store = config
                    .store_location(self.store_dir.as_deref(), self.offline)?
                    .open()?;
                crate::commands::live::run(command, store.as_ref(), &room)
            }
            Some(Commands::Audience) => {
                let store = config
                    .store_location(self.store_dir.as_deref(), self.offline)?
                    .open()?;
                crate::commands::audience::run(store.as_ref())
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    let options = crate::app::LaunchOptions {
                        room: self.room.map(Into::into),
                        fallback_room: config.room(None),
                        viewer: config.viewer_id(),
                        meta: config.viewer_meta(),
                        store: config.store_location(self.store_dir.as_deref(), self.offline)?,
                        speaker: self.speaker,
                        slide: self.slide.map(Into::into),
                        display: self.display.map(Into::into),
                        windowed: self.windowed,
                        theme: config.theme().map(str::to_string),
                    };
                    crate::app::run(file, options)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
