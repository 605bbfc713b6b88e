//! Per-user session state machine
//!
//! ```text
//! NoProfile → ProfileDraft → ProfileSaved → WeightEntered → ResultsComputed
//!                  ↑              │                ↑               │
//!                  └──── edit ────┘                └── re-entry ───┘
//! ```
//!
//! `WeightEntered` and `ResultsComputed` both refine `ProfileSaved`, so an edit
//! is allowed from either and discards the results. The lean-mass bundle is a
//! parallel branch off an entered weight; computing it never touches the
//! primary bundle.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{CoreError, CoreResult};
use crate::estimation::{estimate, BmrFormula, EstimationInput, LossRate, ResultBundle};
use crate::models::{NewProfile, ProfileUpdate};
use crate::store::ProfileStore;
use crate::units::WeightInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoProfile,
    ProfileDraft,
    ProfileSaved,
    WeightEntered,
    ResultsComputed,
}

impl SessionState {
    fn has_saved_profile(&self) -> bool {
        matches!(
            self,
            SessionState::ProfileSaved | SessionState::WeightEntered | SessionState::ResultsComputed
        )
    }

    fn has_weight(&self) -> bool {
        matches!(self, SessionState::WeightEntered | SessionState::ResultsComputed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::NoProfile => "no_profile",
            SessionState::ProfileDraft => "profile_draft",
            SessionState::ProfileSaved => "profile_saved",
            SessionState::WeightEntered => "weight_entered",
            SessionState::ResultsComputed => "results_computed",
        };
        f.write_str(name)
    }
}

/// Drives one user's path from profile entry to computed targets
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    /// Whether the open draft edits the current profile or starts a new one
    editing: bool,
    target: LossRate,
    results: Option<ResultBundle>,
    lean_mass_results: Option<ResultBundle>,
}

impl Session {
    /// Fresh session with nothing saved yet
    pub fn new(target: LossRate) -> Self {
        Self {
            state: SessionState::NoProfile,
            editing: false,
            target,
            results: None,
            lean_mass_results: None,
        }
    }

    /// Pick up where a returning user left off
    ///
    /// A current profile with a stored weight has its results recomputed
    /// straight away.
    pub fn resume(store: &ProfileStore, target: LossRate) -> CoreResult<Self> {
        let mut session = Self::new(target);
        let Some(profile) = store.current() else {
            return Ok(session);
        };

        session.state = SessionState::ProfileSaved;
        if profile.last_weight_kg.is_some() {
            session.state = SessionState::WeightEntered;
            session.results = Some(compute(store, BmrFormula::MifflinStJeor, None, target)?);
            session.state = SessionState::ResultsComputed;
        }
        debug!(profile_id = %profile.id, state = %session.state, "Session resumed");
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> LossRate {
        self.target
    }

    pub fn results(&self) -> Option<&ResultBundle> {
        self.results.as_ref()
    }

    pub fn lean_mass_results(&self) -> Option<&ResultBundle> {
        self.lean_mass_results.as_ref()
    }

    fn transition_error(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            from: self.state.to_string(),
            action,
        }
    }

    /// Open the profile form, either for a first profile or to edit one
    pub fn begin_profile(&mut self) -> CoreResult<()> {
        if self.state != SessionState::NoProfile && !self.state.has_saved_profile() {
            return Err(self.transition_error("edit profile"));
        }
        self.editing = self.state.has_saved_profile();
        self.state = SessionState::ProfileDraft;
        self.results = None;
        self.lean_mass_results = None;
        Ok(())
    }

    /// Save the drafted biometrics
    ///
    /// A draft opened from a saved state updates the current profile; one
    /// opened from `NoProfile` always creates a new profile, which becomes
    /// current.
    pub fn save_profile(&mut self, store: &mut ProfileStore, draft: NewProfile) -> CoreResult<Uuid> {
        if self.state != SessionState::ProfileDraft {
            return Err(self.transition_error("save profile"));
        }

        let id = if self.editing {
            let id = store.current_id().ok_or(CoreError::NoCurrentProfile)?;
            store.update(
                id,
                ProfileUpdate {
                    name: Some(draft.name),
                    sex: Some(draft.sex),
                    age: Some(draft.age),
                    height_cm: Some(draft.height_cm),
                    height_unit: Some(draft.height_unit),
                    activity_level: Some(draft.activity_level),
                },
            )?;
            id
        } else {
            store.create(draft)?
        };

        self.state = SessionState::ProfileSaved;
        info!(profile_id = %id, "Profile saved");
        Ok(id)
    }

    /// Record a weight for the current profile and compute its results
    pub fn enter_weight(
        &mut self,
        store: &mut ProfileStore,
        weight: WeightInput,
    ) -> CoreResult<&ResultBundle> {
        if !self.state.has_saved_profile() {
            return Err(self.transition_error("enter weight"));
        }
        let id = store.current_id().ok_or(CoreError::NoCurrentProfile)?;
        store.record_weight(id, weight.to_kg(), weight.unit())?;

        self.state = SessionState::WeightEntered;
        self.results = None;
        self.lean_mass_results = None;

        let bundle = compute(store, BmrFormula::MifflinStJeor, None, self.target)?;
        self.state = SessionState::ResultsComputed;
        Ok(self.results.insert(bundle))
    }

    /// Compute the lean-mass bundle alongside the primary one
    ///
    /// The body-fat percentage is stored on the profile for next time.
    pub fn compute_lean_mass(
        &mut self,
        store: &mut ProfileStore,
        body_fat_percent: f64,
    ) -> CoreResult<&ResultBundle> {
        if !self.state.has_weight() {
            return Err(self.transition_error("compute lean-mass estimate"));
        }
        let id = store.current_id().ok_or(CoreError::NoCurrentProfile)?;
        store.record_body_fat(id, Some(body_fat_percent))?;

        let bundle = compute(store, BmrFormula::KatchMcArdle, Some(body_fat_percent), self.target)?;
        Ok(self.lean_mass_results.insert(bundle))
    }

    /// Choose a different weight-loss rate and refresh any computed bundles
    pub fn set_target(&mut self, store: &ProfileStore, target: LossRate) -> CoreResult<()> {
        self.target = target;
        if self.results.is_some() {
            self.results = Some(compute(store, BmrFormula::MifflinStJeor, None, target)?);
        }
        if self.lean_mass_results.is_some() {
            self.lean_mass_results = Some(compute(store, BmrFormula::KatchMcArdle, None, target)?);
        }
        Ok(())
    }
}

/// Estimate for the current profile at its last recorded weight
pub fn compute(
    store: &ProfileStore,
    formula: BmrFormula,
    body_fat_percent: Option<f64>,
    target: LossRate,
) -> CoreResult<ResultBundle> {
    let profile = store.current().ok_or(CoreError::NoCurrentProfile)?;
    let weight_kg = profile.last_weight_kg.ok_or_else(|| {
        CoreError::InvalidProfile("No weight recorded for this profile yet".to_string())
    })?;

    let mut input = EstimationInput::new(profile, weight_kg);
    input.body_fat_percent = body_fat_percent;
    estimate(&input, formula, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use crate::units::{HeightUnit, WeightUnit};

    fn draft() -> NewProfile {
        NewProfile {
            name: "Sam".to_string(),
            sex: Sex::Male,
            age: 30,
            height_cm: 180.0,
            height_unit: HeightUnit::Cm,
            activity_level: 1.55,
        }
    }

    fn saved_session(store: &mut ProfileStore) -> Session {
        let mut session = Session::new(LossRate::Rate15);
        session.begin_profile().unwrap();
        session.save_profile(store, draft()).unwrap();
        session
    }

    #[test]
    fn test_happy_path() {
        let mut store = ProfileStore::new();
        let mut session = Session::new(LossRate::default());
        assert_eq!(session.state(), SessionState::NoProfile);

        session.begin_profile().unwrap();
        assert_eq!(session.state(), SessionState::ProfileDraft);

        session.save_profile(&mut store, draft()).unwrap();
        assert_eq!(session.state(), SessionState::ProfileSaved);

        let bundle = session
            .enter_weight(&mut store, WeightInput::Kg { kg: 80.0 })
            .unwrap();
        assert_eq!(bundle.tdee, 2759);
        assert_eq!(bundle.daily_calories, 2009);
        assert_eq!(session.state(), SessionState::ResultsComputed);
        assert_eq!(store.current().unwrap().last_weight_kg, Some(80.0));
    }

    #[test]
    fn test_weight_unit_is_persisted() {
        let mut store = ProfileStore::new();
        let mut session = saved_session(&mut store);
        session
            .enter_weight(&mut store, WeightInput::StonePounds { stones: 12.0, pounds: 8.0 })
            .unwrap();

        let profile = store.current().unwrap();
        assert_eq!(profile.last_weight_unit, WeightUnit::StonePounds);
        assert!((profile.last_weight_kg.unwrap() - 79.83225416).abs() < 1e-9);
    }

    #[test]
    fn test_reentering_weight_recomputes() {
        let mut store = ProfileStore::new();
        let mut session = saved_session(&mut store);
        session.enter_weight(&mut store, WeightInput::Kg { kg: 80.0 }).unwrap();
        let bundle = session.enter_weight(&mut store, WeightInput::Kg { kg: 90.0 }).unwrap();
        // BMR 1880, round(1880 * 1.55) = 2914
        assert_eq!(bundle.bmr, 1880);
        assert_eq!(bundle.tdee, 2914);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut store = ProfileStore::new();
        let mut session = Session::new(LossRate::default());

        let err = session.save_profile(&mut store, draft()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let err = session
            .enter_weight(&mut store, WeightInput::Kg { kg: 80.0 })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        let err = session.compute_lean_mass(&mut store, 20.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));

        session.begin_profile().unwrap();
        let err = session.begin_profile().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot edit profile while in state profile_draft"
        );
    }

    #[test]
    fn test_edit_updates_current_profile() {
        let mut store = ProfileStore::new();
        let mut session = saved_session(&mut store);
        session.enter_weight(&mut store, WeightInput::Kg { kg: 80.0 }).unwrap();

        session.begin_profile().unwrap();
        assert!(session.results().is_none());
        let id = session
            .save_profile(&mut store, NewProfile { age: 40, ..draft() })
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().age, 40);
        assert_eq!(store.get(id).unwrap().last_weight_kg, Some(80.0));
    }

    #[test]
    fn test_new_draft_never_overwrites_current_profile() {
        let mut store = ProfileStore::new();
        let existing = store.create(draft()).unwrap();

        let mut session = Session::new(LossRate::default());
        session.begin_profile().unwrap();
        let id = session
            .save_profile(&mut store, NewProfile { name: "Robin".to_string(), ..draft() })
            .unwrap();

        assert_ne!(id, existing);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(existing).unwrap().name, "Sam");
        assert_eq!(store.current_id(), Some(id));
    }

    #[test]
    fn test_edit_after_resume_updates_in_place() {
        let mut store = ProfileStore::new();
        let existing = store.create(draft()).unwrap();

        let mut session = Session::resume(&store, LossRate::default()).unwrap();
        session.begin_profile().unwrap();
        let id = session
            .save_profile(&mut store, NewProfile { name: "Robin".to_string(), ..draft() })
            .unwrap();

        assert_eq!(id, existing);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(existing).unwrap().name, "Robin");
    }

    #[test]
    fn test_lean_mass_branch_keeps_primary_results() {
        let mut store = ProfileStore::new();
        let mut session = saved_session(&mut store);
        let primary = session
            .enter_weight(&mut store, WeightInput::Kg { kg: 80.0 })
            .unwrap()
            .clone();

        let lean = session.compute_lean_mass(&mut store, 20.0).unwrap();
        assert_eq!(lean.bmr, 1752);
        assert_eq!(lean.formula, BmrFormula::KatchMcArdle);

        assert_eq!(session.results(), Some(&primary));
        assert_eq!(session.state(), SessionState::ResultsComputed);
        assert_eq!(store.current().unwrap().body_fat_percent, Some(20.0));
    }

    #[test]
    fn test_lean_mass_out_of_range_keeps_state() {
        let mut store = ProfileStore::new();
        let mut session = saved_session(&mut store);
        session.enter_weight(&mut store, WeightInput::Kg { kg: 80.0 }).unwrap();

        let err = session.compute_lean_mass(&mut store, 3.0).unwrap_err();
        assert!(matches!(err, CoreError::OutOfRange(_)));
        assert!(session.lean_mass_results().is_none());
        assert!(session.results().is_some());
    }

    #[test]
    fn test_set_target_recomputes() {
        let mut store = ProfileStore::new();
        let mut session = saved_session(&mut store);
        session.enter_weight(&mut store, WeightInput::Kg { kg: 80.0 }).unwrap();
        session.compute_lean_mass(&mut store, 20.0).unwrap();

        session.set_target(&store, LossRate::Rate05).unwrap();
        assert_eq!(session.results().unwrap().daily_calories, 2509);
        assert_eq!(session.lean_mass_results().unwrap().target, LossRate::Rate05);
    }

    #[test]
    fn test_resume_returning_user() {
        let mut store = ProfileStore::new();
        let id = store.create(draft()).unwrap();

        let session = Session::resume(&store, LossRate::default()).unwrap();
        assert_eq!(session.state(), SessionState::ProfileSaved);
        assert!(session.results().is_none());

        store.record_weight(id, 80.0, WeightUnit::Kg).unwrap();
        let session = Session::resume(&store, LossRate::default()).unwrap();
        assert_eq!(session.state(), SessionState::ResultsComputed);
        assert_eq!(session.results().unwrap().bmr, 1780);
    }

    #[test]
    fn test_resume_without_profile() {
        let store = ProfileStore::new();
        let session = Session::resume(&store, LossRate::default()).unwrap();
        assert_eq!(session.state(), SessionState::NoProfile);
    }

    #[test]
    fn test_compute_requires_current_and_weight() {
        let mut store = ProfileStore::new();
        let err = compute(&store, BmrFormula::MifflinStJeor, None, LossRate::Rate15).unwrap_err();
        assert!(matches!(err, CoreError::NoCurrentProfile));

        store.create(draft()).unwrap();
        let err = compute(&store, BmrFormula::MifflinStJeor, None, LossRate::Rate15).unwrap_err();
        assert!(matches!(err, CoreError::InvalidProfile(_)));
    }
}
