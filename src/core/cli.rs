//! Command line interface

use super::settings::GameSettings;
use clap::Parser;
use std::path::PathBuf;

/// Play chess against a UCI engine; captured pieces shatter
#[derive(Parser, Debug, Default)]
#[command(name = "shatterchess", version, about)]
pub struct Cli {
    /// Engine executable (overrides the settings file)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Extra argument for the engine, repeatable
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Engine skill level, 0 to 20
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=20))]
    pub difficulty: Option<u8>,

    /// Settings file to use instead of the per-user one
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "info,shatterchess=trace"
    #[arg(long)]
    pub log: Option<String>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,
}

impl Cli {
    /// Command line values take precedence over the file
    pub fn apply(&self, settings: &mut GameSettings) {
        if let Some(engine) = &self.engine {
            settings.engine_command = engine.clone();
        }
        if !self.engine_args.is_empty() {
            settings.engine_args = self.engine_args.clone();
        }
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(log) = &self.log {
            settings.log_filter = log.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "shatterchess",
            "--engine",
            "fairy-stockfish",
            "--engine-arg",
            "--variant",
            "--engine-arg",
            "chess",
            "-d",
            "17",
        ]);
        let mut settings = GameSettings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.engine_command, "fairy-stockfish");
        assert_eq!(settings.engine_args, vec!["--variant", "chess"]);
        assert_eq!(settings.difficulty, 17);
        assert_eq!(settings.log_filter, GameSettings::default().log_filter);
    }

    #[test]
    fn test_no_flags_leave_settings_alone() {
        let cli = Cli::parse_from(["shatterchess"]);
        let mut settings = GameSettings {
            difficulty: 9,
            ..GameSettings::default()
        };
        cli.apply(&mut settings);
        assert_eq!(settings.difficulty, 9);
        assert!(!cli.save_settings);
    }

    #[test]
    fn test_difficulty_outside_skill_range_is_rejected() {
        assert!(Cli::try_parse_from(["shatterchess", "--difficulty", "21"]).is_err());
    }
}
