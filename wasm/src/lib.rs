//! Macro Monitor WASM Module
//!
//! Browser bindings for the estimation core. Plain numeric calculations take
//! and return numbers; anything structured crosses the boundary as JSON.

use macro_monitor_shared::{
    compute_bmr, compute_lean_mass_bmr, compute_macros, compute_tdee,
    compute_weight_loss_targets, session, BmrFormula, CoreError, HeightInput, LossRate,
    MacroSplit, MacroSplitKind, NewProfile, ProfileStore, ProfileUpdate, Sex, WeightInput,
};
use serde::Serialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_error)
}

fn parse_id(id: &str) -> Result<Uuid, JsError> {
    id.parse().map_err(js_error)
}

fn sex(is_male: bool) -> Sex {
    if is_male {
        Sex::Male
    } else {
        Sex::Female
    }
}

/// Convert a tagged height (`{"unit":"ft_in","feet":5,"inches":10}`) to cm
#[wasm_bindgen]
pub fn height_to_cm(height_json: &str) -> Result<f64, JsError> {
    let input: HeightInput = serde_json::from_str(height_json).map_err(js_error)?;
    Ok(input.to_cm())
}

/// Convert a tagged weight (`{"unit":"stone_lb","stones":12,"pounds":8}`) to kg
#[wasm_bindgen]
pub fn weight_to_kg(weight_json: &str) -> Result<f64, JsError> {
    let input: WeightInput = serde_json::from_str(weight_json).map_err(js_error)?;
    Ok(input.to_kg())
}

/// Mifflin-St Jeor BMR in kcal/day
#[wasm_bindgen]
pub fn calculate_bmr(
    is_male: bool,
    age_years: u32,
    height_cm: f64,
    weight_kg: f64,
) -> Result<i32, JsError> {
    compute_bmr(sex(is_male), age_years, height_cm, weight_kg).map_err(js_error)
}

/// Katch-McArdle BMR in kcal/day
#[wasm_bindgen]
pub fn calculate_lean_mass_bmr(weight_kg: f64, body_fat_percent: f64) -> Result<i32, JsError> {
    compute_lean_mass_bmr(weight_kg, body_fat_percent).map_err(js_error)
}

/// Calculate TDEE (Total Daily Energy Expenditure)
#[wasm_bindgen]
pub fn calculate_tdee(bmr: i32, activity_multiplier: f64) -> Result<i32, JsError> {
    compute_tdee(bmr, activity_multiplier).map_err(js_error)
}

/// Daily targets for every loss rate, as JSON
#[wasm_bindgen]
pub fn calculate_weight_loss_targets(tdee: i32) -> Result<String, JsError> {
    to_json(&compute_weight_loss_targets(tdee))
}

/// Macro breakdown for a daily target, as JSON
#[wasm_bindgen]
pub fn calculate_macros(
    daily_calories: i32,
    protein_percent: f64,
    carbs_percent: f64,
    fat_percent: f64,
) -> Result<String, JsError> {
    let split = MacroSplit::new(protein_percent, carbs_percent, fat_percent);
    to_json(&compute_macros(daily_calories, &split))
}

/// Profile store living in the page; the host persists `to_json()` itself
#[wasm_bindgen]
#[derive(Default)]
pub struct ProfileStoreHandle {
    store: ProfileStore,
}

#[wasm_bindgen]
impl ProfileStoreHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from the blob written by `to_json`
    pub fn from_json(json: &str) -> Result<ProfileStoreHandle, JsError> {
        let store = ProfileStore::from_json(json).map_err(js_error)?;
        Ok(Self { store })
    }

    pub fn to_json(&self) -> Result<String, JsError> {
        self.store.to_json().map_err(js_error)
    }

    /// All profiles as a JSON array
    pub fn list(&self) -> Result<String, JsError> {
        let profiles: Vec<_> = self.store.list().collect();
        to_json(&profiles)
    }

    /// Current profile as JSON, or `None` when nothing is selected
    pub fn current(&self) -> Result<Option<String>, JsError> {
        self.store.current().map(to_json).transpose()
    }

    pub fn current_id(&self) -> Option<String> {
        self.store.current_id().map(|id| id.to_string())
    }

    /// Select a profile; an empty id clears the selection
    pub fn set_current(&mut self, id: &str) -> Result<(), JsError> {
        let id = if id.is_empty() { None } else { Some(parse_id(id)?) };
        self.store.set_current(id).map_err(js_error)
    }

    /// Create a profile from `NewProfile` JSON; returns its id
    pub fn create(&mut self, profile_json: &str) -> Result<String, JsError> {
        let new: NewProfile = serde_json::from_str(profile_json).map_err(js_error)?;
        let id = self.store.create(new).map_err(js_error)?;
        Ok(id.to_string())
    }

    /// Apply a partial `ProfileUpdate` JSON
    pub fn update(&mut self, id: &str, update_json: &str) -> Result<(), JsError> {
        let update: ProfileUpdate = serde_json::from_str(update_json).map_err(js_error)?;
        self.store.update(parse_id(id)?, update).map_err(js_error)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), JsError> {
        self.store.delete(parse_id(id)?).map(|_| ()).map_err(js_error)
    }

    /// Record a tagged weight for the current profile
    pub fn record_weight(&mut self, weight_json: &str) -> Result<(), JsError> {
        let weight: WeightInput = serde_json::from_str(weight_json).map_err(js_error)?;
        let id = self.store.current_id().ok_or_else(|| js_error(CoreError::NoCurrentProfile))?;
        self.store
            .record_weight(id, weight.to_kg(), weight.unit())
            .map_err(js_error)
    }

    /// Save a split; `kind` is `normal` or `lean_mass`
    pub fn set_macro_split(
        &mut self,
        id: &str,
        kind: &str,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Result<(), JsError> {
        let kind: MacroSplitKind = kind.parse().map_err(js_error)?;
        self.store
            .set_macro_split(parse_id(id)?, kind, MacroSplit::new(protein, carbs, fat))
            .map_err(js_error)
    }

    /// Import the single-profile legacy blob
    pub fn import_legacy(&mut self, json: &str, weight_kg: Option<f64>) -> Result<String, JsError> {
        let id = self.store.import_legacy(json, weight_kg).map_err(js_error)?;
        Ok(id.to_string())
    }

    /// Result bundle for the current profile at its last weight, as JSON
    ///
    /// `lean_mass` selects Katch-McArdle, which needs `body_fat_percent` or a
    /// stored value. `rate` takes the loss-rate forms `0.5`..`2.0`.
    pub fn estimate(
        &self,
        lean_mass: bool,
        body_fat_percent: Option<f64>,
        rate: &str,
    ) -> Result<String, JsError> {
        let formula = if lean_mass {
            BmrFormula::KatchMcArdle
        } else {
            BmrFormula::MifflinStJeor
        };
        let rate: LossRate = rate.parse().map_err(js_error)?;
        let bundle = session::compute(&self.store, formula, body_fat_percent, rate).map_err(js_error)?;
        to_json(&bundle)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn rejects_invalid_inputs_across_the_boundary() {
        assert!(calculate_bmr(true, 0, 180.0, 80.0).is_err());
        assert!(calculate_lean_mass_bmr(80.0, 60.0).is_err());
        assert!(weight_to_kg(r#"{"unit":"lb","pounds":150}"#).is_err());

        let mut handle = ProfileStoreHandle::new();
        assert!(handle.record_weight(r#"{"unit":"kg","kg":80}"#).is_err());
        assert!(handle.set_current("not-a-uuid").is_err());
        assert!(handle.estimate(false, None, "1.5").is_err());
    }

    #[wasm_bindgen_test]
    fn estimates_through_the_store_handle() {
        let mut handle = ProfileStoreHandle::new();
        handle
            .create(r#"{"name":"Sam","sex":"male","age":30,"height_cm":180,"activity_level":1.55}"#)
            .unwrap();
        handle.record_weight(r#"{"unit":"kg","kg":80}"#).unwrap();
        let bundle: serde_json::Value =
            serde_json::from_str(&handle.estimate(false, None, "2.0").unwrap()).unwrap();
        assert_eq!(bundle["daily_calories"], 1759);
    }
}
