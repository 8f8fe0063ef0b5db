use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scrolldeck")]
#[command(author, version, about)]
#[command(long_about = "A scroll-driven slide deck with live widgets.\n\n\
    Slides stack vertically and snap into place as you scroll; the dot nav,\n\
    arrow keys and the revenue estimator follow along.\n\n\
    Examples:\n  \
    scrolldeck                    Present the built-in deck (fullscreen)\n  \
    scrolldeck deck.yaml          Present your own deck\n  \
    scrolldeck deck.yaml --windowed --slide 3\n  \
    scrolldeck init deck.yaml     Write the built-in deck as a starting point\n  \
    scrolldeck check deck.yaml    Validate a deck without opening a window")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Deck file (YAML) to present. Defaults to the built-in deck.
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

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

    /// Validate a deck file and print a summary
    Check {
        /// Deck file to validate
        file: PathBuf,
    },

    /// Write the built-in deck to a file as a starting point
    Init {
        /// Destination path
        #[arg(default_value = "deck.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.threshold, defaults.tracking)
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
    /// `RUST_LOG` wins; otherwise -q/-v pick the level.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "scrolldeck=debug",
            _ => "scrolldeck=trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        if self.no_color {
            colored::control::set_override(false);
        }
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Check { file }) => crate::commands::check::run(&file, self.quiet),
            Some(Commands::Init { path, force }) => crate::commands::init::run(&path, force),
            Some(Commands::Version) => {
                println!("scrolldeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(ref file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                }
                crate::app::run(self.file, self.windowed, self.slide)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_present_flags() {
        let cli = Cli::try_parse_from(["scrolldeck", "deck.yaml", "--windowed", "--slide", "3"])
            .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("deck.yaml")));
        assert!(cli.windowed);
        assert_eq!(cli.slide, Some(3));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::try_parse_from(["scrolldeck", "check", "deck.yaml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check { .. })));
    }

    #[test]
    fn test_log_filter_levels() {
        let quiet = Cli::try_parse_from(["scrolldeck", "-q", "version"]).unwrap();
        assert_eq!(quiet.log_filter(), "error");
        let chatty = Cli::try_parse_from(["scrolldeck", "-vv", "version"]).unwrap();
        assert_eq!(chatty.log_filter(), "scrolldeck=trace");
        let plain = Cli::try_parse_from(["scrolldeck"]).unwrap();
        assert_eq!(plain.log_filter(), "warn");
    }
}
