//! Energy expenditure and macronutrient estimation
//!
//! Computes BMR (Mifflin-St Jeor or Katch-McArdle), TDEE, the four fixed-deficit
//! weight-loss targets, and the macro breakdown for one chosen target.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Integer kcal**: Every energy output is rounded to a whole kcal, half
//!    away from zero
//! 3. **No clamping**: Negative or very low targets are returned as computed;
//!    the caller decides how to warn
//! 4. **One pipeline**: Both formulas share the TDEE → targets → macros path and
//!    differ only in how BMR is derived and which split is applied

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::models::{MacroSplit, MacroSplitKind, Sex, UserProfile};
use crate::validation::{
    labelled, validate_activity_level, validate_body_fat_percent, validate_height_cm,
    validate_weight_kg,
};

/// kcal per gram of protein
pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
/// kcal per gram of carbohydrate
pub const CARBS_KCAL_PER_GRAM: f64 = 4.0;
/// kcal per gram of fat
pub const FAT_KCAL_PER_GRAM: f64 = 9.0;

/// Energy in one pound of body fat, used to map deficits to weekly loss
pub const KCAL_PER_POUND_FAT: i32 = 3500;

fn round_kcal(value: f64) -> i32 {
    value.round() as i32
}

// ============================================================================
// BMR
// ============================================================================

/// BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    /// Mifflin-St Jeor, uses sex, age, height and weight
    #[default]
    MifflinStJeor,
    /// Katch-McArdle, uses lean body mass
    KatchMcArdle,
}

impl BmrFormula {
    /// The profile split applied to results of this formula
    pub fn split_kind(&self) -> MacroSplitKind {
        match self {
            BmrFormula::MifflinStJeor => MacroSplitKind::Normal,
            BmrFormula::KatchMcArdle => MacroSplitKind::LeanMass,
        }
    }
}

/// Calculate Basal Metabolic Rate using Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn compute_bmr(sex: Sex, age_years: u32, height_cm: f64, weight_kg: f64) -> CoreResult<i32> {
    if age_years == 0 {
        return Err(CoreError::InvalidProfile(labelled(
            "age",
            "Age must be at least 1 year",
        )));
    }
    validate_height_cm(height_cm)
        .map_err(|msg| CoreError::InvalidProfile(labelled("height_cm", &msg)))?;
    validate_weight_kg(weight_kg)
        .map_err(|msg| CoreError::InvalidProfile(labelled("weight_kg", &msg)))?;

    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    let bmr = match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    };
    Ok(round_kcal(bmr))
}

/// Calculate BMR using Katch-McArdle equation
///
/// LBM = weight × (1 - body_fat_percent/100)
/// BMR = 370 + 21.6 × LBM(kg)
///
/// Body fat outside 5-50% is rejected as an implausible entry.
pub fn compute_lean_mass_bmr(weight_kg: f64, body_fat_percent: f64) -> CoreResult<i32> {
    validate_weight_kg(weight_kg)
        .map_err(|msg| CoreError::InvalidProfile(labelled("weight_kg", &msg)))?;
    validate_body_fat_percent(body_fat_percent)
        .map_err(|msg| CoreError::OutOfRange(labelled("body_fat_percent", &msg)))?;

    let lean_body_mass = weight_kg * (1.0 - body_fat_percent / 100.0);
    Ok(round_kcal(370.0 + 21.6 * lean_body_mass))
}

// ============================================================================
// TDEE and Weight-Loss Targets
// ============================================================================

/// Calculate Total Daily Energy Expenditure
///
/// TDEE = BMR × Activity Multiplier
pub fn compute_tdee(bmr: i32, activity_level: f64) -> CoreResult<i32> {
    validate_activity_level(activity_level)
        .map_err(|msg| CoreError::InvalidProfile(labelled("activity_level", &msg)))?;
    Ok(round_kcal(bmr as f64 * activity_level))
}

/// Weekly weight-loss rate a daily target is derived for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LossRate {
    /// 0.5 lb/week
    #[serde(rename = "rate05")]
    Rate05,
    /// 1.0 lb/week
    #[serde(rename = "rate10")]
    Rate10,
    /// 1.5 lb/week
    #[default]
    #[serde(rename = "rate15")]
    Rate15,
    /// 2.0 lb/week
    #[serde(rename = "rate20")]
    Rate20,
}

impl LossRate {
    pub const ALL: [LossRate; 4] = [
        LossRate::Rate05,
        LossRate::Rate10,
        LossRate::Rate15,
        LossRate::Rate20,
    ];

    /// Daily deficit in kcal
    pub fn deficit_kcal(&self) -> i32 {
        match self {
            LossRate::Rate05 => 250,
            LossRate::Rate10 => 500,
            LossRate::Rate15 => 750,
            LossRate::Rate20 => 1000,
        }
    }

    /// Approximate loss in pounds per week for this deficit
    pub fn pounds_per_week(&self) -> f64 {
        (self.deficit_kcal() * 7) as f64 / KCAL_PER_POUND_FAT as f64
    }
}

impl std::str::FromStr for LossRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rate05" | "0.5" => Ok(LossRate::Rate05),
            "rate10" | "1" | "1.0" => Ok(LossRate::Rate10),
            "rate15" | "1.5" => Ok(LossRate::Rate15),
            "rate20" | "2" | "2.0" => Ok(LossRate::Rate20),
            _ => Err(format!(
                "Unknown loss rate: {} (expected 0.5, 1.0, 1.5 or 2.0)",
                s
            )),
        }
    }
}

/// Daily calorie targets for each weekly loss rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightLossTargets {
    pub rate05: i32,
    pub rate10: i32,
    pub rate15: i32,
    pub rate20: i32,
}

impl WeightLossTargets {
    pub fn get(&self, rate: LossRate) -> i32 {
        match rate {
            LossRate::Rate05 => self.rate05,
            LossRate::Rate10 => self.rate10,
            LossRate::Rate15 => self.rate15,
            LossRate::Rate20 => self.rate20,
        }
    }
}

/// Calculate the four weight-loss targets from TDEE
///
/// Targets are not clamped and may be negative for very low TDEE.
pub fn compute_weight_loss_targets(tdee: i32) -> WeightLossTargets {
    let target = |rate: LossRate| tdee.saturating_sub(rate.deficit_kcal());
    WeightLossTargets {
        rate05: target(LossRate::Rate05),
        rate10: target(LossRate::Rate10),
        rate15: target(LossRate::Rate15),
        rate20: target(LossRate::Rate20),
    }
}

// ============================================================================
// Macros
// ============================================================================

/// One macronutrient's share of the daily target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroAmount {
    pub kcal: i32,
    pub grams: i32,
    pub percent: f64,
}

impl MacroAmount {
    fn from_share(daily_calories: i32, percent: f64, kcal_per_gram: f64) -> Self {
        let kcal = round_kcal(daily_calories as f64 * percent / 100.0);
        let grams = round_kcal(kcal as f64 / kcal_per_gram);
        Self {
            kcal,
            grams,
            percent,
        }
    }
}

/// Protein, carb and fat amounts for one daily target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroBreakdown {
    pub protein: MacroAmount,
    pub carbs: MacroAmount,
    pub fat: MacroAmount,
}

/// Split a daily calorie target into macronutrients
///
/// Each kcal share is rounded on its own, so the three may not add up to
/// `daily_calories` exactly. The split is used as given and need not sum to
/// 100 here.
pub fn compute_macros(daily_calories: i32, split: &MacroSplit) -> MacroBreakdown {
    MacroBreakdown {
        protein: MacroAmount::from_share(daily_calories, split.protein, PROTEIN_KCAL_PER_GRAM),
        carbs: MacroAmount::from_share(daily_calories, split.carbs, CARBS_KCAL_PER_GRAM),
        fat: MacroAmount::from_share(daily_calories, split.fat, FAT_KCAL_PER_GRAM),
    }
}

// ============================================================================
// Result Bundle
// ============================================================================

/// Inputs for one estimation run
#[derive(Debug, Clone, Copy)]
pub struct EstimationInput<'a> {
    pub profile: &'a UserProfile,
    pub weight_kg: f64,
    /// Overrides the profile's stored body fat for the lean-mass path
    pub body_fat_percent: Option<f64>,
}

impl<'a> EstimationInput<'a> {
    pub fn new(profile: &'a UserProfile, weight_kg: f64) -> Self {
        Self {
            profile,
            weight_kg,
            body_fat_percent: None,
        }
    }

    pub fn with_body_fat(mut self, body_fat_percent: f64) -> Self {
        self.body_fat_percent = Some(body_fat_percent);
        self
    }
}

/// Complete estimation output for one formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub formula: BmrFormula,
    pub bmr: i32,
    pub tdee: i32,
    pub weight_loss_targets: WeightLossTargets,
    /// Rate the macros were computed for
    pub target: LossRate,
    pub daily_calories: i32,
    pub macros: MacroBreakdown,
}

/// Run the full estimation for a profile and weight
pub fn estimate(
    input: &EstimationInput<'_>,
    formula: BmrFormula,
    target: LossRate,
) -> CoreResult<ResultBundle> {
    let profile = input.profile;
    let bmr = match formula {
        BmrFormula::MifflinStJeor => {
            compute_bmr(profile.sex, profile.age, profile.height_cm, input.weight_kg)?
        }
        BmrFormula::KatchMcArdle => {
            let body_fat = input
                .body_fat_percent
                .or(profile.body_fat_percent)
                .ok_or_else(|| {
                    CoreError::InvalidProfile(labelled(
                        "body_fat_percent",
                        "Required for the lean-mass estimate",
                    ))
                })?;
            compute_lean_mass_bmr(input.weight_kg, body_fat)?
        }
    };

    bundle_from_bmr(
        formula,
        bmr,
        profile.activity_level,
        profile.split(formula.split_kind()),
        target,
    )
}

fn bundle_from_bmr(
    formula: BmrFormula,
    bmr: i32,
    activity_level: f64,
    split: &MacroSplit,
    target: LossRate,
) -> CoreResult<ResultBundle> {
    let tdee = compute_tdee(bmr, activity_level)?;
    let weight_loss_targets = compute_weight_loss_targets(tdee);
    let daily_calories = weight_loss_targets.get(target);

    Ok(ResultBundle {
        formula,
        bmr,
        tdee,
        weight_loss_targets,
        target,
        daily_calories,
        macros: compute_macros(daily_calories, split),
    })
}
