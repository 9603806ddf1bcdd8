//! CLI argument definitions and command dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::backend::Mode;
use crate::settings::PowerState;

/// zrgb - Multi-zone RGB lighting control for gaming handhelds.
///
/// Edits the layered lighting settings tree, manages animated keyframe
/// presets, and pushes configurations to the LED driver boundary.
#[derive(Parser, Debug)]
#[command(name = "zrgb", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// JSON output for scripts and agents
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (repeat for trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Device category to operate on
    #[arg(
        long,
        short = 'd',
        global = true,
        default_value = "legion-go",
        env = "ZRGB_DEVICE"
    )]
    pub device: String,

    /// Settings store directory (defaults to the per-user config dir)
    #[arg(long, global = true, env = "ZRGB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Application id context for setting reads/writes
    #[arg(long, global = true, default_value = crate::settings::DEFAULT_APP_ID)]
    pub app: String,

    /// Power-source context for setting reads/writes
    #[arg(long, global = true, default_value = "ac")]
    pub power: PowerArg,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Power-source context selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PowerArg {
    /// Connected or charging
    #[default]
    Ac,
    /// Running on battery
    Battery,
}

impl From<PowerArg> for PowerState {
    fn from(arg: PowerArg) -> Self {
        match arg {
            PowerArg::Ac => Self::Ac,
            PowerArg::Battery => Self::Battery,
        }
    }
}

/// Lighting mode selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Disabled,
    Solid,
    Breathing,
    Rainbow,
    Zoned,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Disabled => Self::Disabled,
            ModeArg::Solid => Self::Solid,
            ModeArg::Breathing => Self::Breathing,
            ModeArg::Rainbow => Self::Rainbow,
            ModeArg::Zoned => Self::Zoned,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Discovery ===
    /// Show device capabilities and zone layout
    Info,

    /// Show which controls each lighting mode supports
    Modes,

    // === Setting writes ===
    /// Change settings in the resolved app/power context
    Set(SetArgs),

    /// Enable or disable the per-app settings override
    Override(OverrideArgs),

    /// Enable or disable the AC/battery settings split
    AcSplit(AcSplitArgs),

    // === Presets ===
    /// Manage animated keyframe presets
    #[command(subcommand)]
    Preset(PresetCommands),

    // === Settings tree ===
    /// Inspect the persisted settings tree
    #[command(subcommand)]
    Settings(SettingsCommands),

    // === Utilities ===
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Hue in degrees (0-360)
    #[arg(long)]
    pub hue: Option<f32>,

    /// Saturation percent (0-100)
    #[arg(long)]
    pub saturation: Option<f32>,

    /// Brightness percent (0-100)
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Effect speed (0 slowest - 20 fastest)
    #[arg(long)]
    pub speed: Option<u8>,

    /// Discrete hardware brightness level (0-4)
    #[arg(long)]
    pub brightness_level: Option<u8>,

    /// Lighting mode
    #[arg(long)]
    pub mode: Option<ModeArg>,

    /// Skip the device-apply call, only persist
    #[arg(long, short = 'n')]
    pub no_apply: bool,
}

#[derive(Parser, Debug)]
pub struct OverrideArgs {
    /// Application id to toggle
    pub app_id: String,

    /// Disable instead of enable
    #[arg(long)]
    pub disable: bool,
}

#[derive(Parser, Debug)]
pub struct AcSplitArgs {
    /// Disable instead of enable
    #[arg(long)]
    pub disable: bool,
}

#[derive(Subcommand, Debug)]
pub enum PresetCommands {
    /// List saved presets for this device category
    List,

    /// Print a preset's timeline as JSON
    Show {
        /// Preset name
        name: String,
    },

    /// Save a timeline file as a named preset
    Save {
        /// Preset name
        name: String,

        /// Timeline JSON file (speed, brightness, keyframes)
        file: PathBuf,
    },

    /// Delete a preset
    Delete {
        /// Preset name
        name: String,
    },

    /// Apply a preset to the device and mark it active
    Apply {
        /// Preset name
        name: String,
    },

    /// Send a preset to the device without marking it active
    Preview {
        /// Preset name
        name: String,

        /// Preview only this keyframe
        #[arg(long)]
        frame: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the settings store location
    Path,

    /// Print the persisted settings tree as JSON
    Show,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_set_command() {
        let cli = Cli::parse_from(["zrgb", "set", "--hue", "120", "--speed", "5"]);
        match cli.command {
            Some(Commands::Set(args)) => {
                assert_eq!(args.hue, Some(120.0));
                assert_eq!(args.speed, Some(5));
                assert!(args.brightness.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_context_flags() {
        let cli = Cli::parse_from([
            "zrgb",
            "--device",
            "msi-claw",
            "--app",
            "game-1",
            "--power",
            "battery",
            "preset",
            "list",
        ]);
        assert_eq!(cli.device, "msi-claw");
        assert_eq!(cli.app, "game-1");
        assert!(matches!(cli.power, PowerArg::Battery));
        assert!(matches!(
            cli.command,
            Some(Commands::Preset(PresetCommands::List))
        ));
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
