//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - inspect: summarize a document
//! - convert: rewrite a document in another file version
//! - prefs: show, reset or change stored preferences

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use olive::document::Encoding;

/// Olive - a typewriter simulator
#[derive(Parser, Debug)]
#[command(name = "olive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// File versions accepted by `convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileVersion {
    /// Version 1, verbose
    V1,
    /// Version 2, compact
    V2,
}

impl From<FileVersion> for Encoding {
    fn from(version: FileVersion) -> Self {
        match version {
            FileVersion::V1 => Encoding::Verbose,
            FileVersion::V2 => Encoding::Compact,
        }
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a .oli document
    Inspect {
        /// Document to read
        file: PathBuf,
    },

    /// Rewrite a document in another file version
    Convert {
        /// Document to read
        file: PathBuf,

        /// Target file version
        #[arg(short, long, value_enum)]
        to: FileVersion,

        /// Output path (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
}

/// Preference subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PrefsCommands {
    /// Print the effective preferences
    Show,

    /// Delete the stored preferences
    Reset,

    /// Change one preference
    Set {
        /// Preference name (defaultPaperColor, inkBleed, pageMarkers, bellSound, otherSounds)
        key: String,

        /// New value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["olive"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["olive", "-v", "inspect", "a.oli"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["olive", "prefs", "show", "-c", "/path/to/olive.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/olive.yml")));
    }

    #[test]
    fn test_inspect_command() {
        let cli = Cli::try_parse_from(["olive", "inspect", "letter.oli"]).unwrap();
        match cli.command {
            Commands::Inspect { file } => assert_eq!(file, PathBuf::from("letter.oli")),
            _ => panic!("Expected inspect command"),
        }
    }

    #[test]
    fn test_convert_command() {
        let cli = Cli::try_parse_from(["olive", "convert", "letter.oli", "--to", "v1", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Convert { file, to, output } => {
                assert_eq!(file, PathBuf::from("letter.oli"));
                assert_eq!(to, FileVersion::V1);
                assert_eq!(Encoding::from(to), Encoding::Verbose);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("Expected convert command"),
        }
    }

    #[test]
    fn test_convert_rejects_unknown_version() {
        assert!(Cli::try_parse_from(["olive", "convert", "letter.oli", "--to", "v3"]).is_err());
    }

    #[test]
    fn test_prefs_set() {
        let cli = Cli::try_parse_from(["olive", "prefs", "set", "inkBleed", "true"]).unwrap();
        match cli.command {
            Commands::Prefs {
                command: PrefsCommands::Set { key, value },
            } => {
                assert_eq!(key, "inkBleed");
                assert_eq!(value, "true");
            }
            _ => panic!("Expected prefs set command"),
        }
    }
}
