//! Profile store
//!
//! Owns every [`UserProfile`] plus the pointer to the current one. The store is
//! a plain value: the host loads it, passes it by reference to whatever needs
//! it, and serializes it back out. There is no process-wide instance.
//!
//! Mutations are all-or-nothing: a failed validation leaves the record as it
//! was.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{CoreError, CoreResult};
use crate::models::{
    LegacyProfile, MacroSplit, MacroSplitKind, NewProfile, ProfileUpdate, Sex, UserProfile,
};
use crate::units::{HeightUnit, WeightUnit};
use crate::validation::{
    labelled, validate_activity_level, validate_age, validate_body_fat_percent,
    validate_height_cm, validate_macro_split, validate_name, validate_weight_kg,
};

/// Name given to a profile imported from the single-profile legacy format
pub const LEGACY_PROFILE_NAME: &str = "Default";

/// All profiles plus the current-profile pointer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStore {
    profiles: BTreeMap<Uuid, UserProfile>,
    #[serde(default)]
    current_id: Option<Uuid>,
}

fn check_biometrics(profile: &UserProfile) -> CoreResult<()> {
    validate_name(&profile.name).map_err(|msg| CoreError::InvalidProfile(labelled("name", &msg)))?;
    validate_age(profile.age).map_err(|msg| CoreError::InvalidProfile(labelled("age", &msg)))?;
    validate_height_cm(profile.height_cm)
        .map_err(|msg| CoreError::InvalidProfile(labelled("height_cm", &msg)))?;
    validate_activity_level(profile.activity_level)
        .map_err(|msg| CoreError::InvalidProfile(labelled("activity_level", &msg)))?;
    Ok(())
}

impl ProfileStore {
    /// Create an empty store with no current profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a store from persisted parts
    ///
    /// A current id that names no profile is dropped.
    pub fn from_parts(profiles: BTreeMap<Uuid, UserProfile>, current_id: Option<Uuid>) -> Self {
        let current_id = match current_id {
            Some(id) if !profiles.contains_key(&id) => {
                warn!(profile_id = %id, "Current profile id does not exist, clearing it");
                None
            }
            other => other,
        };
        Self {
            profiles,
            current_id,
        }
    }

    /// Load from the combined JSON form (`{"profiles": {...}, "current_id": ...}`)
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let raw: ProfileStore = serde_json::from_str(json)?;
        Ok(Self::from_parts(raw.profiles, raw.current_id))
    }

    /// Serialize to the combined JSON form
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a profile-map blob plus a separately stored current id
    pub fn restore(profiles_json: &str, current_id: Option<Uuid>) -> CoreResult<Self> {
        let profiles: BTreeMap<Uuid, UserProfile> = serde_json::from_str(profiles_json)?;
        Ok(Self::from_parts(profiles, current_id))
    }

    /// Serialize only the profile map
    pub fn profiles_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.profiles)?)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// All profiles, ordered by id
    pub fn list(&self) -> impl Iterator<Item = &UserProfile> {
        self.profiles.values()
    }

    pub fn get(&self, id: Uuid) -> CoreResult<&UserProfile> {
        self.profiles
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Profile {}", id)))
    }

    fn get_mut(&mut self, id: Uuid) -> CoreResult<&mut UserProfile> {
        self.profiles
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Profile {}", id)))
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current_id
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.current_id.and_then(|id| self.profiles.get(&id))
    }

    /// Select a profile as current, or clear the selection with `None`
    pub fn set_current(&mut self, id: Option<Uuid>) -> CoreResult<()> {
        if let Some(id) = id {
            self.get(id)?;
        }
        self.current_id = id;
        debug!(profile_id = ?id, "Current profile changed");
        Ok(())
    }

    /// Create a profile from first-time biometrics and make it current
    ///
    /// Both macro splits start at 35/35/30.
    pub fn create(&mut self, new: NewProfile) -> CoreResult<Uuid> {
        let new = NewProfile {
            name: new.name.trim().to_string(),
            ..new
        };
        new.validate()?;

        let now = Utc::now();
        let profile = UserProfile {
            id: Uuid::new_v4(),
            name: new.name,
            sex: new.sex,
            age: new.age,
            height_cm: new.height_cm,
            height_unit: new.height_unit,
            activity_level: new.activity_level,
            macro_split: MacroSplit::default(),
            katch_macro_split: MacroSplit::default(),
            last_weight_kg: None,
            last_weight_unit: WeightUnit::default(),
            body_fat_percent: None,
            created_at: now,
            updated_at: now,
        };
        check_biometrics(&profile)?;

        let id = profile.id;
        self.profiles.insert(id, profile);
        self.current_id = Some(id);
        debug!(profile_id = %id, "Profile created");
        Ok(id)
    }

    /// Merge the present fields of `update` into an existing profile
    ///
    /// Macro splits, weight and body fat are never touched here.
    pub fn update(&mut self, id: Uuid, update: ProfileUpdate) -> CoreResult<()> {
        let mut candidate = self.get(id)?.clone();
        if let Some(name) = update.name {
            candidate.name = name.trim().to_string();
        }
        if let Some(sex) = update.sex {
            candidate.sex = sex;
        }
        if let Some(age) = update.age {
            candidate.age = age;
        }
        if let Some(height_cm) = update.height_cm {
            candidate.height_cm = height_cm;
        }
        if let Some(height_unit) = update.height_unit {
            candidate.height_unit = height_unit;
        }
        if let Some(activity_level) = update.activity_level {
            candidate.activity_level = activity_level;
        }
        check_biometrics(&candidate)?;

        candidate.updated_at = Utc::now();
        self.profiles.insert(id, candidate);
        debug!(profile_id = %id, "Profile updated");
        Ok(())
    }

    /// Permanently remove a profile, clearing current if it pointed here
    pub fn delete(&mut self, id: Uuid) -> CoreResult<UserProfile> {
        let removed = self
            .profiles
            .remove(&id)
            .ok_or_else(|| CoreError::NotFound(format!("Profile {}", id)))?;
        if self.current_id == Some(id) {
            self.current_id = None;
        }
        debug!(profile_id = %id, "Profile deleted");
        Ok(removed)
    }

    /// Store the last entered weight and the unit it was entered in
    pub fn record_weight(&mut self, id: Uuid, weight_kg: f64, unit: WeightUnit) -> CoreResult<()> {
        validate_weight_kg(weight_kg)
            .map_err(|msg| CoreError::InvalidProfile(labelled("weight_kg", &msg)))?;
        let profile = self.get_mut(id)?;
        profile.last_weight_kg = Some(weight_kg);
        profile.last_weight_unit = unit;
        profile.updated_at = Utc::now();
        debug!(profile_id = %id, weight_kg, unit = %unit, "Weight recorded");
        Ok(())
    }

    /// Store or clear the body-fat percentage used by the lean-mass path
    pub fn record_body_fat(&mut self, id: Uuid, body_fat_percent: Option<f64>) -> CoreResult<()> {
        if let Some(percent) = body_fat_percent {
            validate_body_fat_percent(percent)
                .map_err(|msg| CoreError::OutOfRange(labelled("body_fat_percent", &msg)))?;
        }
        let profile = self.get_mut(id)?;
        profile.body_fat_percent = body_fat_percent;
        profile.updated_at = Utc::now();
        debug!(profile_id = %id, body_fat_percent = ?body_fat_percent, "Body fat recorded");
        Ok(())
    }

    /// Replace one of the profile's macro splits; it must sum to 100
    pub fn set_macro_split(
        &mut self,
        id: Uuid,
        kind: MacroSplitKind,
        split: MacroSplit,
    ) -> CoreResult<()> {
        let field = match kind {
            MacroSplitKind::Normal => "macro_split",
            MacroSplitKind::LeanMass => "katch_macro_split",
        };
        validate_macro_split(&split).map_err(|msg| CoreError::InvalidSplit(labelled(field, &msg)))?;

        let profile = self.get_mut(id)?;
        match kind {
            MacroSplitKind::Normal => profile.macro_split = split,
            MacroSplitKind::LeanMass => profile.katch_macro_split = split,
        }
        profile.updated_at = Utc::now();
        debug!(profile_id = %id, kind = ?kind, "Macro split saved");
        Ok(())
    }

    /// Import the single-profile legacy blob as a new current profile
    ///
    /// `weight_kg` is the separately stored last weight, if there was one.
    pub fn import_legacy(&mut self, json: &str, weight_kg: Option<f64>) -> CoreResult<Uuid> {
        let legacy: LegacyProfile = serde_json::from_str(json)?;
        let sex: Sex = legacy.sex.parse()?;
        if !legacy.age.is_finite() || legacy.age < 1.0 {
            return Err(CoreError::InvalidProfile(labelled(
                "age",
                "Age must be at least 1 year",
            )));
        }

        let id = self.create(NewProfile {
            name: LEGACY_PROFILE_NAME.to_string(),
            sex,
            age: legacy.age.round() as u32,
            height_cm: legacy.height,
            height_unit: HeightUnit::Cm,
            activity_level: legacy.activity_level,
        })?;
        if let Some(weight_kg) = weight_kg {
            if let Err(e) = self.record_weight(id, weight_kg, WeightUnit::Kg) {
                warn!(error = %e, "Ignoring invalid legacy weight");
            }
        }
        debug!(profile_id = %id, "Legacy profile imported");
        Ok(id)
    }
}
