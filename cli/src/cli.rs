//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use macro_monitor_shared::{
    ActivityLevel, HeightInput, LossRate, MacroSplitKind, Sex, WeightInput,
};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "macro-monitor", author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the profile store (overrides storage.data_dir)
    #[arg(long, global = true, env = "MM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, edit, select and delete profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Save a macro split for a profile
    Split(SplitArgs),
    /// Enter a weight and compute calorie and macro targets
    Estimate(EstimateArgs),
    /// List the named activity presets
    ActivityLevels,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Create a profile and make it current
    Create(CreateArgs),
    /// Edit a profile (the current one unless --id is given)
    Update(UpdateArgs),
    /// List all profiles
    List,
    /// Show one profile (the current one unless --id is given)
    Show {
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Select the current profile
    Select {
        #[arg(required_unless_present = "none")]
        id: Option<Uuid>,
        /// Clear the selection instead
        #[arg(long, conflicts_with = "id")]
        none: bool,
    },
    /// Permanently delete a profile
    Delete { id: Uuid },
    /// Import a profile saved by the single-profile version of the app
    ImportLegacy {
        /// File holding the legacy `userProfile` JSON blob
        file: PathBuf,
        /// The legacy `currentWeight` value, in kg
        #[arg(long)]
        weight_kg: Option<f64>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct HeightArgs {
    /// Height in centimeters
    #[arg(long, conflicts_with_all = ["feet", "inches"])]
    pub height_cm: Option<f64>,
    /// Height in feet (combine with --inches)
    #[arg(long)]
    pub feet: Option<f64>,
    /// Remaining inches
    #[arg(long, requires = "feet")]
    pub inches: Option<f64>,
}

impl HeightArgs {
    pub fn to_input(&self) -> Option<HeightInput> {
        match (self.height_cm, self.feet) {
            (Some(cm), _) => Some(HeightInput::Cm { cm }),
            (None, Some(feet)) => Some(HeightInput::FeetInches {
                feet,
                inches: self.inches.unwrap_or(0.0),
            }),
            (None, None) => None,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ActivityArgs {
    /// Activity multiplier applied to BMR (e.g. 1.55)
    #[arg(long, conflicts_with = "activity_level")]
    pub activity: Option<f64>,
    /// Named activity preset (e.g. moderately_active)
    #[arg(long)]
    pub activity_level: Option<ActivityLevel>,
}

impl ActivityArgs {
    pub fn multiplier(&self) -> Option<f64> {
        self.activity
            .or_else(|| self.activity_level.map(|level| level.multiplier()))
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub sex: Sex,
    #[arg(long)]
    pub age: u32,
    #[command(flatten)]
    pub height: HeightArgs,
    #[command(flatten)]
    pub activity: ActivityArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(long)]
    pub id: Option<Uuid>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub sex: Option<Sex>,
    #[arg(long)]
    pub age: Option<u32>,
    #[command(flatten)]
    pub height: HeightArgs,
    #[command(flatten)]
    pub activity: ActivityArgs,
    /// Body-fat percentage for the lean-mass estimate
    #[arg(long, conflicts_with = "clear_body_fat")]
    pub body_fat: Option<f64>,
    /// Forget the stored body-fat percentage
    #[arg(long)]
    pub clear_body_fat: bool,
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    #[arg(long)]
    pub id: Option<Uuid>,
    /// Which split to save: normal or lean_mass
    #[arg(long, default_value = "normal")]
    pub kind: MacroSplitKind,
    #[arg(long)]
    pub protein: f64,
    #[arg(long)]
    pub carbs: f64,
    #[arg(long)]
    pub fat: f64,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WeightArgs {
    /// Weight in kilograms
    #[arg(long, conflicts_with_all = ["stones", "pounds"])]
    pub kg: Option<f64>,
    /// Weight in stones (combine with --pounds)
    #[arg(long)]
    pub stones: Option<f64>,
    /// Remaining pounds
    #[arg(long, requires = "stones")]
    pub pounds: Option<f64>,
}

impl WeightArgs {
    pub fn to_input(&self) -> Option<WeightInput> {
        match (self.kg, self.stones) {
            (Some(kg), _) => Some(WeightInput::Kg { kg }),
            (None, Some(stones)) => Some(WeightInput::StonePounds {
                stones,
                pounds: self.pounds.unwrap_or(0.0),
            }),
            (None, None) => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Select this profile before estimating
    #[arg(long)]
    pub id: Option<Uuid>,
    // Omit to reuse the last recorded weight
    #[command(flatten)]
    pub weight: WeightArgs,
    /// Body-fat percentage; also computes the lean-mass estimate
    #[arg(long)]
    pub body_fat: Option<f64>,
    /// Weekly loss rate in lb the macros are computed for (0.5, 1.0, 1.5, 2.0)
    #[arg(long)]
    pub rate: Option<LossRate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_feet_inches() {
        let cli = Cli::try_parse_from([
            "macro-monitor",
            "profile",
            "create",
            "--name",
            "Sam",
            "--sex",
            "male",
            "--age",
            "30",
            "--feet",
            "5",
            "--inches",
            "10",
            "--activity-level",
            "moderately_active",
        ])
        .unwrap();

        let Command::Profile(ProfileCommand::Create(args)) = cli.command else {
            panic!("expected profile create");
        };
        assert_eq!(
            args.height.to_input(),
            Some(HeightInput::FeetInches { feet: 5.0, inches: 10.0 })
        );
        assert_eq!(args.activity.multiplier(), Some(1.55));
    }

    #[test]
    fn test_parse_estimate_stones_default_pounds() {
        let cli = Cli::try_parse_from(["macro-monitor", "estimate", "--stones", "12", "--rate", "1.0"])
            .unwrap();
        let Command::Estimate(args) = cli.command else {
            panic!("expected estimate");
        };
        assert_eq!(
            args.weight.to_input(),
            Some(WeightInput::StonePounds { stones: 12.0, pounds: 0.0 })
        );
        assert_eq!(args.rate, Some(LossRate::Rate10));
    }

    #[test]
    fn test_conflicting_units_rejected() {
        let result = Cli::try_parse_from([
            "macro-monitor",
            "estimate",
            "--kg",
            "80",
            "--stones",
            "12",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_sex_rejected() {
        let result = Cli::try_parse_from([
            "macro-monitor",
            "profile",
            "create",
            "--name",
            "Sam",
            "--sex",
            "other",
            "--age",
            "30",
            "--height-cm",
            "180",
            "--activity",
            "1.2",
        ]);
        assert!(result.is_err());
    }
}
