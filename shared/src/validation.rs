//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Uses both custom validators and the `validator` crate for derive macros
//! (see [`crate::models::NewProfile`]).

use crate::models::MacroSplit;

/// Lowest body-fat percentage accepted for the lean-mass formula
pub const BODY_FAT_MIN_PERCENT: f64 = 5.0;
/// Highest body-fat percentage accepted for the lean-mass formula
pub const BODY_FAT_MAX_PERCENT: f64 = 50.0;

/// Tolerance when checking that a macro split sums to 100
const SPLIT_SUM_TOLERANCE: f64 = 1e-9;

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    Ok(())
}

/// Validate age in whole years
pub fn validate_age(age: u32) -> Result<(), String> {
    if age == 0 {
        return Err("Age must be at least 1 year".to_string());
    }
    if age > 150 {
        return Err("Age cannot exceed 150 years".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm <= 0.0 {
        return Err("Height must be greater than 0 cm".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight_kg(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg <= 0.0 {
        return Err("Weight must be greater than 0 kg".to_string());
    }
    Ok(())
}

/// Validate activity multiplier
pub fn validate_activity_level(multiplier: f64) -> Result<(), String> {
    if multiplier.is_nan() || multiplier.is_infinite() {
        return Err("Activity level must be a valid number".to_string());
    }
    if multiplier <= 0.0 {
        return Err("Activity level must be greater than 0".to_string());
    }
    Ok(())
}

/// Validate body-fat percentage against the plausibility window
pub fn validate_body_fat_percent(percent: f64) -> Result<(), String> {
    if !(BODY_FAT_MIN_PERCENT..=BODY_FAT_MAX_PERCENT).contains(&percent) {
        return Err(format!(
            "Body fat must be between {}% and {}%, got {}",
            BODY_FAT_MIN_PERCENT, BODY_FAT_MAX_PERCENT, percent
        ));
    }
    Ok(())
}

/// Validate a macro split entered by the user
///
/// Each percentage must be finite and non-negative, and the three must sum
/// to 100.
pub fn validate_macro_split(split: &MacroSplit) -> Result<(), String> {
    for (label, value) in [
        ("Protein", split.protein),
        ("Carbs", split.carbs),
        ("Fat", split.fat),
    ] {
        if !value.is_finite() {
            return Err(format!("{} percentage must be a valid number", label));
        }
        if value < 0.0 {
            return Err(format!("{} percentage cannot be negative", label));
        }
    }

    let total = split.total();
    if (total - 100.0).abs() > SPLIT_SUM_TOLERANCE {
        return Err(format!("Percentages must add up to 100, got {}", total));
    }
    Ok(())
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "name" => "Name",
        "sex" => "Sex",
        "age" => "Age",
        "height_cm" => "Height",
        "weight_kg" => "Current Weight",
        "activity_level" => "Activity Level",
        "body_fat_percent" => "Body Fat",
        "macro_split" => "Macro Split",
        "katch_macro_split" => "Lean-Mass Macro Split",
        _ => field_name,
    }
}

/// Prefix a validation message with the field's display label
pub fn labelled(field_name: &str, message: &str) -> String {
    format!("{}: {}", get_field_display_label(field_name), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Sam").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_validate_age() {
        assert!(validate_age(30).is_ok());
        assert!(validate_age(0).is_err());
        assert!(validate_age(151).is_err());
    }

    #[rstest]
    #[case(180.0, true)]
    #[case(0.1, true)]
    #[case(0.0, false)]
    #[case(-5.0, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn test_validate_height_cm(#[case] height: f64, #[case] valid: bool) {
        assert_eq!(validate_height_cm(height).is_ok(), valid);
    }

    #[rstest]
    #[case(1.2, true)]
    #[case(0.0, false)]
    #[case(-1.55, false)]
    #[case(f64::NAN, false)]
    fn test_validate_activity_level(#[case] multiplier: f64, #[case] valid: bool) {
        assert_eq!(validate_activity_level(multiplier).is_ok(), valid);
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight_kg(80.0).is_ok());
        assert!(validate_weight_kg(0.0).is_err());
        assert!(validate_weight_kg(f64::NAN).is_err());
    }

    #[rstest]
    #[case(5.0, true)]
    #[case(20.0, true)]
    #[case(50.0, true)]
    #[case(4.9, false)]
    #[case(50.1, false)]
    #[case(f64::NAN, false)]
    fn test_validate_body_fat(#[case] percent: f64, #[case] valid: bool) {
        assert_eq!(validate_body_fat_percent(percent).is_ok(), valid);
    }

    #[test]
    fn test_validate_macro_split() {
        assert!(validate_macro_split(&MacroSplit::new(35.0, 35.0, 30.0)).is_ok());
        assert!(validate_macro_split(&MacroSplit::new(40.0, 40.0, 30.0)).is_err());
        assert!(validate_macro_split(&MacroSplit::new(110.0, -10.0, 0.0)).is_err());
        assert!(validate_macro_split(&MacroSplit::new(f64::NAN, 50.0, 50.0)).is_err());
        assert!(validate_macro_split(&MacroSplit::new(0.0, 0.0, 100.0)).is_ok());
    }

    #[test]
    fn test_labelled_messages() {
        assert_eq!(labelled("height_cm", "too short"), "Height: too short");
        assert_eq!(labelled("unknown_field", "bad"), "unknown_field: bad");
    }
}
