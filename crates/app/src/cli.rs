use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serene_core::catalog::{Category, Difficulty, TimingOverrides};
use serene_core::model::{DEFAULT_CYCLES, FeedbackSettingsDraft};
use services::PlanOverrides;

#[derive(Parser, Debug)]
#[command(name = "sereneflow")]
#[command(about = "Guided breathing sessions in the terminal", long_about = None)]
pub struct Cli {
    /// SQLite database URL or file path
    #[arg(long = "db", env = "SERENEFLOW_DB_URL", default_value = "sqlite://sereneflow.sqlite3")]
    pub db_url: String,

    /// Session tick period in milliseconds
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub tick_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse the technique library
    Library {
        /// Case-insensitive text matched against name and description
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Technique counts per category
    Categories,
    /// Show one technique in detail
    Show { id: String },
    /// Run a breathing session
    Run(RunArgs),
    /// Manage saved custom patterns
    Custom {
        #[command(subcommand)]
        action: CustomAction,
    },
    /// Totals, streak and achievements
    Progress,
    /// Recently completed sessions
    History {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Feedback settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Export sessions and saved patterns as JSON
    Export {
        /// Output file; `-` writes to stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete all sessions and saved patterns
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PhaseArgs {
    /// Inhale seconds
    #[arg(long)]
    pub inhale: Option<f64>,
    /// Hold after inhale, seconds
    #[arg(long = "hold-in")]
    pub hold_in: Option<f64>,
    /// Exhale seconds
    #[arg(long)]
    pub exhale: Option<f64>,
    /// Hold after exhale, seconds
    #[arg(long = "hold-out")]
    pub hold_out: Option<f64>,
}

impl PhaseArgs {
    pub fn overrides(self) -> TimingOverrides {
        TimingOverrides {
            inhale: self.inhale,
            hold_after_inhale: self.hold_in,
            exhale: self.exhale,
            hold_after_exhale: self.hold_out,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Technique id (see `library`) or saved pattern name. Omit it to run the
    /// `--inhale`/`--exhale` timings as an unsaved pattern.
    pub source: Option<String>,
    #[arg(long)]
    pub cycles: Option<u32>,
    #[command(flatten)]
    pub phases: PhaseArgs,
}

impl RunArgs {
    pub fn overrides(&self) -> PlanOverrides {
        PlanOverrides {
            cycles: self.cycles,
            timings: self.phases.overrides(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum CustomAction {
    /// Save or replace a pattern
    Save {
        name: String,
        #[arg(long)]
        inhale: f64,
        #[arg(long = "hold-in", default_value_t = 0.0)]
        hold_in: f64,
        #[arg(long)]
        exhale: f64,
        #[arg(long = "hold-out", default_value_t = 0.0)]
        hold_out: f64,
        #[arg(long, default_value_t = DEFAULT_CYCLES)]
        cycles: u32,
    },
    List,
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    /// Update one or more settings
    Set(SettingsUpdate),
    /// Fire the selected haptic pattern once
    TestHaptic,
    /// Play the selected sound's inhale tone
    PreviewSound,
}

#[derive(Args, Debug, Default)]
pub struct SettingsUpdate {
    #[arg(long)]
    pub haptics: Option<bool>,
    /// gentle, rhythmic, progressive, subtle, strong, guided, off
    #[arg(long)]
    pub haptic_pattern: Option<String>,
    #[arg(long)]
    pub sound: Option<bool>,
    /// gentle-bells, nature-sounds, singing-bowls, soft-tones, silent
    #[arg(long)]
    pub sound_type: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.haptics.is_none()
            && self.haptic_pattern.is_none()
            && self.sound.is_none()
            && self.sound_type.is_none()
    }

    pub fn into_draft(self) -> FeedbackSettingsDraft {
        FeedbackSettingsDraft {
            haptic_enabled: self.haptics,
            haptic_pattern: self.haptic_pattern,
            sound_enabled: self.sound,
            sound_type: self.sound_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "sereneflow",
            "--db",
            "sqlite::memory:",
            "run",
            "box-breathing",
            "--cycles",
            "3",
            "--hold-out",
            "2",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.cycles, Some(3));
        assert_eq!(overrides.timings.hold_after_exhale, Some(2.0));
        assert_eq!(overrides.timings.inhale, None);
        assert_eq!(cli.tick_ms, 100);
    }

    #[test]
    fn parses_library_filters() {
        let cli = Cli::try_parse_from([
            "sereneflow",
            "library",
            "--category",
            "pranayama",
            "--difficulty",
            "beginner",
        ])
        .unwrap();
        let Command::Library {
            category, difficulty, ..
        } = cli.command
        else {
            panic!("expected library");
        };
        assert_eq!(category, Some(Category::Pranayama));
        assert_eq!(difficulty, Some(Difficulty::Beginner));
    }

    #[test]
    fn settings_update_maps_flags_to_draft() {
        let cli = Cli::try_parse_from([
            "sereneflow",
            "settings",
            "set",
            "--sound",
            "true",
            "--sound-type",
            "singing-bowls",
        ])
        .unwrap();
        let Command::Settings {
            action: SettingsAction::Set(update),
        } = cli.command
        else {
            panic!("expected settings set");
        };
        assert!(!update.is_empty());
        let draft = update.into_draft();
        assert_eq!(draft.sound_enabled, Some(true));
        assert_eq!(draft.sound_type.as_deref(), Some("singing-bowls"));
        assert_eq!(draft.haptic_enabled, None);
    }

    #[test]
    fn run_without_source_keeps_the_timings() {
        let cli = Cli::try_parse_from(["sereneflow", "run", "--inhale", "5", "--exhale", "5"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.source, None);
        assert_eq!(args.overrides().timings.exhale, Some(5.0));
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(Cli::try_parse_from(["sereneflow", "library", "--category", "cardio"]).is_err());
    }
}
