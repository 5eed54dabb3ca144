//! Command-line arguments

use clap::{Parser, Subcommand};
use raxa_core::{Action, DEFAULT_PAUSE, DEFAULT_REPEATS};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "raxa",
    version,
    about = "Control Nexa self-learning lights through TellStick Net bridges"
)]
pub struct Cli {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "raxa.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover bridges and print their announcements and status reports
    Listen {
        /// One JSON object per event
        #[arg(long)]
        json: bool,
    },
    /// Switch a configured light on
    On {
        /// Light name
        light: String,
        /// Seconds to wait for a bridge to answer discovery
        #[arg(long, default_value_t = 3)]
        settle: u64,
    },
    /// Switch a configured light off
    Off {
        /// Light name
        light: String,
        /// Seconds to wait for a bridge to answer discovery
        #[arg(long, default_value_t = 3)]
        settle: u64,
    },
    /// Dim a configured light
    Dim {
        /// Light name
        light: String,
        /// Brightness 0-255
        brightness: u8,
        /// Seconds to wait for a bridge to answer discovery
        #[arg(long, default_value_t = 3)]
        settle: u64,
    },
    /// Print the pulse train and envelope for a command (nothing is sent)
    Encode {
        /// 26-bit device code
        device_code: u32,
        /// 4-bit group code
        group_code: u8,
        /// on, off or dim
        action: Action,
        /// Dim level 0-15 (dim only)
        #[arg(long)]
        level: Option<u8>,
        /// Set the group-mode bit
        #[arg(long)]
        group_mode: bool,
        /// RF repeat count
        #[arg(long, default_value_t = DEFAULT_REPEATS)]
        repeats: u8,
        /// Pause between repeats
        #[arg(long, default_value_t = DEFAULT_PAUSE)]
        pause: u8,
    },
    /// List configured lights
    Lights,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encode() {
        let cli = Cli::try_parse_from(["raxa", "encode", "12345", "3", "dim", "--level", "7"]).unwrap();
        match cli.command {
            Command::Encode {
                device_code,
                group_code,
                action,
                level,
                repeats,
                ..
            } => {
                assert_eq!(device_code, 12345);
                assert_eq!(group_code, 3);
                assert_eq!(action, Action::Dim);
                assert_eq!(level, Some(7));
                assert_eq!(repeats, 8);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.config, PathBuf::from("raxa.toml"));
    }

    #[test]
    fn test_parse_dim_with_config() {
        let cli = Cli::try_parse_from(["raxa", "-c", "home.toml", "dim", "Kitchen", "128"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("home.toml"));
        assert!(matches!(
            cli.command,
            Command::Dim { brightness: 128, settle: 3, .. }
        ));
    }
}
