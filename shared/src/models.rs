//! Data models for Macro Monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::errors::CoreError;
use crate::units::{HeightUnit, WeightUnit};

/// Biological sex, selects the Mifflin-St Jeor branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(CoreError::InvalidProfile(format!(
                "Unrecognized sex '{}', must be one of: male, female",
                s
            ))),
        }
    }
}

/// Named activity presets
///
/// Profiles store the raw multiplier, so any positive value is accepted; the
/// presets are what a host offers in a picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    #[default]
    LightlyActive,
    /// Moderate exercise 3-5 days/week
    ModeratelyActive,
    /// Hard exercise 6-7 days/week
    VeryActive,
    /// Very hard exercise, physical job
    ExtraActive,
}

impl ActivityLevel {
    /// All presets, least to most active
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    /// Get the activity multiplier for TDEE calculation
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Little or no exercise",
            ActivityLevel::LightlyActive => "Light exercise 1-3 days/week",
            ActivityLevel::ModeratelyActive => "Moderate exercise 3-5 days/week",
            ActivityLevel::VeryActive => "Hard exercise 6-7 days/week",
            ActivityLevel::ExtraActive => "Very hard exercise or physical job",
        }
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" | "light" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" | "moderate" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "extra_active" => Ok(ActivityLevel::ExtraActive),
            _ => Err(format!("Unknown activity level: {}", s)),
        }
    }
}

/// Percentage split of daily calories across the three macronutrients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroSplit {
    pub fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
        }
    }

    pub fn total(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }
}

impl Default for MacroSplit {
    /// 35% protein, 35% carbs, 30% fat
    fn default() -> Self {
        Self::new(35.0, 35.0, 30.0)
    }
}

/// Which of a profile's two split configurations an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroSplitKind {
    /// Used with the Mifflin-St Jeor estimate
    Normal,
    /// Used with the Katch-McArdle estimate
    LeanMass,
}

impl std::str::FromStr for MacroSplitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "normal" | "mifflin" => Ok(MacroSplitKind::Normal),
            "lean_mass" | "lean" | "katch" => Ok(MacroSplitKind::LeanMass),
            _ => Err(format!("Unknown macro split kind: {}", s)),
        }
    }
}

/// Durable per-user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub sex: Sex,
    pub age: u32,
    pub height_cm: f64,
    #[serde(default)]
    pub height_unit: HeightUnit,
    pub activity_level: f64,
    #[serde(default)]
    pub macro_split: MacroSplit,
    #[serde(default)]
    pub katch_macro_split: MacroSplit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_weight_kg: Option<f64>,
    #[serde(default)]
    pub last_weight_unit: WeightUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percent: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// The split configured for the given estimation path
    pub fn split(&self, kind: MacroSplitKind) -> &MacroSplit {
        match kind {
            MacroSplitKind::Normal => &self.macro_split,
            MacroSplitKind::LeanMass => &self.katch_macro_split,
        }
    }
}

/// Biometrics captured the first time a profile is saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewProfile {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub sex: Sex,
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150 years"))]
    pub age: u32,
    #[validate(range(exclusive_min = 0.0, message = "Height must be greater than 0"))]
    pub height_cm: f64,
    #[serde(default)]
    pub height_unit: HeightUnit,
    #[validate(range(exclusive_min = 0.0, message = "Activity level must be greater than 0"))]
    pub activity_level: f64,
}

/// Partial edit of an existing profile; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub height_unit: Option<HeightUnit>,
    pub activity_level: Option<f64>,
}

/// Single-profile blob written by the first generation of the app
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProfile {
    pub sex: String,
    pub age: f64,
    pub height: f64,
    pub activity_level: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("male", Sex::Male)]
    #[case("Female", Sex::Female)]
    #[case(" m ", Sex::Male)]
    fn test_sex_parsing(#[case] tag: &str, #[case] expected: Sex) {
        assert_eq!(tag.parse::<Sex>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_sex_is_invalid_profile() {
        let err = "other".parse::<Sex>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidProfile(_)));
    }

    #[test]
    fn test_activity_presets_are_increasing() {
        let multipliers: Vec<f64> = ActivityLevel::ALL.iter().map(|a| a.multiplier()).collect();
        assert!(multipliers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!("moderately_active".parse::<ActivityLevel>().unwrap().multiplier(), 1.55);
    }

    #[test]
    fn test_default_split() {
        let split = MacroSplit::default();
        assert_eq!(split, MacroSplit::new(35.0, 35.0, 30.0));
        assert_eq!(split.total(), 100.0);
    }

    #[test]
    fn test_new_profile_derive_validation() {
        let mut profile = NewProfile {
            name: "Sam".to_string(),
            sex: Sex::Male,
            age: 30,
            height_cm: 180.0,
            height_unit: HeightUnit::Cm,
            activity_level: 1.55,
        };
        assert!(profile.validate().is_ok());

        profile.age = 0;
        assert!(profile.validate().is_err());

        profile.age = 30;
        profile.name = String::new();
        assert!(profile.validate().is_err());
    }

    #[rstest]
    #[case(0.0, 1.55)]
    #[case(-170.0, 1.55)]
    #[case(180.0, 0.0)]
    #[case(180.0, -1.2)]
    fn test_new_profile_rejects_non_positive_biometrics(
        #[case] height_cm: f64,
        #[case] activity_level: f64,
    ) {
        let profile = NewProfile {
            name: "Sam".to_string(),
            sex: Sex::Male,
            age: 30,
            height_cm,
            height_unit: HeightUnit::Cm,
            activity_level,
        };
        let errors = profile.validate().unwrap_err();
        let field = if height_cm <= 0.0 { "height_cm" } else { "activity_level" };
        assert!(errors.field_errors().contains_key(field));
    }

    #[test]
    fn test_legacy_blob_parses() {
        let legacy: LegacyProfile = serde_json::from_str(
            r#"{"sex":"female","age":41,"height":165.1,"activityLevel":1.375}"#,
        )
        .unwrap();
        assert_eq!(legacy.sex, "female");
        assert_eq!(legacy.activity_level, 1.375);
    }
}
