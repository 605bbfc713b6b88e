//! Unit conversion module
//!
//! Heights and weights are entered either metric or imperial and normalized to
//! centimeters and kilograms before they reach the estimation engine. The
//! engine never sees anything but metric values.
//!
//! # Design Principles
//!
//! 1. **Closed unit sets**: Unit tags are enums, so an unknown unit cannot be
//!    represented past the parsing boundary
//! 2. **No rounding**: Conversions are exact double-precision arithmetic;
//!    rounding happens in the engine
//! 3. **Display helpers only go backwards**: cm → ft/in and kg → st/lb exist
//!    for redisplay and are never fed into a calculation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Inches per foot
pub const INCHES_PER_FOOT: f64 = 12.0;
/// Kilograms per stone
pub const KG_PER_STONE: f64 = 6.35029318;
/// Kilograms per pound
pub const KG_PER_POUND: f64 = 0.453592;
/// Pounds per stone
pub const POUNDS_PER_STONE: i64 = 14;

// ============================================================================
// Weight
// ============================================================================

/// Unit family a weight was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    #[serde(rename = "stone_lb")]
    StonePounds,
}

impl WeightUnit {
    /// Get the unit tag
    pub fn tag(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::StonePounds => "stone_lb",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "stone_lb" | "st_lb" | "stone" | "stones" => Ok(WeightUnit::StonePounds),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

/// A raw weight measurement tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum WeightInput {
    Kg { kg: f64 },
    #[serde(rename = "stone_lb")]
    StonePounds { stones: f64, pounds: f64 },
}

impl WeightInput {
    /// Normalize to kilograms
    pub fn to_kg(&self) -> f64 {
        match *self {
            WeightInput::Kg { kg } => kg,
            WeightInput::StonePounds { stones, pounds } => {
                stones * KG_PER_STONE + pounds * KG_PER_POUND
            }
        }
    }

    /// The unit family this measurement was entered in
    pub fn unit(&self) -> WeightUnit {
        match self {
            WeightInput::Kg { .. } => WeightUnit::Kg,
            WeightInput::StonePounds { .. } => WeightUnit::StonePounds,
        }
    }
}

/// Convert a tagged weight measurement to kilograms
pub fn weight_to_kg(input: WeightInput) -> f64 {
    input.to_kg()
}

// ============================================================================
// Height
// ============================================================================

/// Unit family a height was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightUnit {
    #[default]
    Cm,
    #[serde(rename = "ft_in")]
    FeetInches,
}

impl HeightUnit {
    /// Get the unit tag
    pub fn tag(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::FeetInches => "ft_in",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for HeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(HeightUnit::Cm),
            "ft_in" | "ft" | "feet" | "ft/in" | "feet/inches" => Ok(HeightUnit::FeetInches),
            _ => Err(format!("Unknown height unit: {}", s)),
        }
    }
}

/// A raw height measurement tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum HeightInput {
    Cm { cm: f64 },
    #[serde(rename = "ft_in")]
    FeetInches { feet: f64, inches: f64 },
}

impl HeightInput {
    /// Normalize to centimeters
    pub fn to_cm(&self) -> f64 {
        match *self {
            HeightInput::Cm { cm } => cm,
            HeightInput::FeetInches { feet, inches } => {
                (feet * INCHES_PER_FOOT + inches) * CM_PER_INCH
            }
        }
    }

    /// The unit family this measurement was entered in
    pub fn unit(&self) -> HeightUnit {
        match self {
            HeightInput::Cm { .. } => HeightUnit::Cm,
            HeightInput::FeetInches { .. } => HeightUnit::FeetInches,
        }
    }
}

/// Convert a tagged height measurement to centimeters
pub fn height_to_cm(input: HeightInput) -> f64 {
    input.to_cm()
}

// ============================================================================
// Display Helpers
// ============================================================================

/// Represents height in feet and inches for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeetInchesHeight {
    pub feet: i32,
    pub inches: f64,
}

impl FeetInchesHeight {
    /// Split a metric height into whole feet and remaining whole inches
    ///
    /// The total is rounded before splitting, so `inches` is always in 0..12.
    pub fn from_cm(cm: f64) -> Self {
        let total_inches = (cm / CM_PER_INCH).round() as i32;
        let per_foot = INCHES_PER_FOOT as i32;
        Self {
            feet: total_inches.div_euclid(per_foot),
            inches: total_inches.rem_euclid(per_foot) as f64,
        }
    }
}

impl fmt::Display for FeetInchesHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{:.0}\"", self.feet, self.inches)
    }
}

/// Represents weight in stones and pounds for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StonePoundsWeight {
    pub stones: i32,
    pub pounds: f64,
}

impl StonePoundsWeight {
    /// Split a metric weight into whole stones and remaining pounds
    ///
    /// Pounds are rounded to a tenth before splitting, so the remainder is
    /// always below 14.
    pub fn from_kg(kg: f64) -> Self {
        let tenths = (kg / KG_PER_POUND * 10.0).round() as i64;
        let tenths_per_stone = POUNDS_PER_STONE * 10;
        Self {
            stones: tenths.div_euclid(tenths_per_stone) as i32,
            pounds: tenths.rem_euclid(tenths_per_stone) as f64 / 10.0,
        }
    }
}

impl fmt::Display for StonePoundsWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}st {:.1}lb", self.stones, self.pounds)
    }
}
