//! Command handlers
//!
//! Each handler works on an in-memory [`ProfileStore`] and returns a JSON value
//! for stdout. The store is written back only when a handler changed it.

use macro_monitor_shared::{
    ActivityLevel, CoreError, FeetInchesHeight, HeightUnit, LossRate, MacroSplit, NewProfile,
    ProfileStore, ProfileUpdate, ResultBundle, Session, StonePoundsWeight, UserProfile,
    WeightUnit,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cli::{Cli, Command, CreateArgs, EstimateArgs, ProfileCommand, SplitArgs, UpdateArgs};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::storage::FileProfileRepository;

/// Handler output plus whether the store must be saved
pub struct Outcome {
    pub output: Value,
    pub changed: bool,
}

impl Outcome {
    fn read(output: Value) -> Self {
        Self {
            output,
            changed: false,
        }
    }

    fn write(output: Value) -> Self {
        Self {
            output,
            changed: true,
        }
    }
}

/// Profile as shown to the caller, with the redisplay helpers filled in
#[derive(Debug, Serialize)]
pub struct ProfileView<'a> {
    #[serde(flatten)]
    pub profile: &'a UserProfile,
    pub is_current: bool,
    pub height_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_weight_display: Option<String>,
}

impl<'a> ProfileView<'a> {
    pub fn new(profile: &'a UserProfile, current_id: Option<Uuid>) -> Self {
        let height_display = match profile.height_unit {
            HeightUnit::Cm => format!("{:.1} cm", profile.height_cm),
            HeightUnit::FeetInches => FeetInchesHeight::from_cm(profile.height_cm).to_string(),
        };
        let last_weight_display = profile.last_weight_kg.map(|kg| match profile.last_weight_unit {
            WeightUnit::Kg => format!("{:.1} kg", kg),
            WeightUnit::StonePounds => StonePoundsWeight::from_kg(kg).to_string(),
        });

        Self {
            profile,
            is_current: current_id == Some(profile.id),
            height_display,
            last_weight_display,
        }
    }
}

#[derive(Debug, Serialize)]
struct EstimateOutput<'a> {
    profile_id: Uuid,
    weight_kg: f64,
    results: Option<&'a ResultBundle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lean_mass_results: Option<&'a ResultBundle>,
}

/// Load the store, run one command, save if needed, and render the output
pub fn execute(cli: Cli, config: &AppConfig) -> CliResult<String> {
    let repo = match &cli.data_dir {
        Some(dir) => FileProfileRepository::new(
            dir,
            &config.storage.profiles_file,
            &config.storage.current_file,
        ),
        None => FileProfileRepository::from_config(&config.storage),
    };

    let mut store = repo.load()?;
    let outcome = dispatch(cli.command, &mut store, config)?;
    if outcome.changed {
        repo.save(&store)?;
    }
    Ok(serde_json::to_string_pretty(&outcome.output)?)
}

/// Run one command against an already loaded store
pub fn dispatch(command: Command, store: &mut ProfileStore, config: &AppConfig) -> CliResult<Outcome> {
    match command {
        Command::Profile(cmd) => profile(cmd, store),
        Command::Split(args) => split(args, store),
        Command::Estimate(args) => estimate(args, store, config),
        Command::ActivityLevels => Ok(Outcome::read(activity_levels())),
    }
}

fn resolve_id(store: &ProfileStore, id: Option<Uuid>) -> CliResult<Uuid> {
    match id {
        Some(id) => Ok(id),
        None => Ok(store.current_id().ok_or(CoreError::NoCurrentProfile)?),
    }
}

fn view(store: &ProfileStore, id: Uuid) -> CliResult<Value> {
    let profile = store.get(id)?;
    Ok(serde_json::to_value(ProfileView::new(profile, store.current_id()))?)
}

fn profile(cmd: ProfileCommand, store: &mut ProfileStore) -> CliResult<Outcome> {
    match cmd {
        ProfileCommand::Create(args) => {
            let id = create(args, store)?;
            info!(profile_id = %id, "Profile created");
            Ok(Outcome::write(view(store, id)?))
        }
        ProfileCommand::Update(args) => {
            let id = update(args, store)?;
            Ok(Outcome::write(view(store, id)?))
        }
        ProfileCommand::List => {
            let current_id = store.current_id();
            let profiles: Vec<ProfileView<'_>> = store
                .list()
                .map(|p| ProfileView::new(p, current_id))
                .collect();
            Ok(Outcome::read(json!({ "profiles": profiles, "current_id": current_id })))
        }
        ProfileCommand::Show { id } => {
            let id = resolve_id(store, id)?;
            Ok(Outcome::read(view(store, id)?))
        }
        ProfileCommand::Select { id, none } => {
            let id = if none { None } else { id };
            store.set_current(id)?;
            Ok(Outcome::write(json!({ "current_id": store.current_id() })))
        }
        ProfileCommand::Delete { id } => {
            let removed = store.delete(id)?;
            info!(profile_id = %id, "Profile deleted");
            Ok(Outcome::write(json!({
                "deleted": removed.id,
                "current_id": store.current_id(),
            })))
        }
        ProfileCommand::ImportLegacy { file, weight_kg } => {
            let json = fs::read_to_string(&file).map_err(|e| {
                CliError::BadRequest(format!("Cannot read {}: {}", file.display(), e))
            })?;
            let id = store.import_legacy(&json, weight_kg)?;
            Ok(Outcome::write(view(store, id)?))
        }
    }
}

fn create(args: CreateArgs, store: &mut ProfileStore) -> CliResult<Uuid> {
    let height = args
        .height
        .to_input()
        .ok_or_else(|| CliError::BadRequest("Height is required (--height-cm or --feet)".into()))?;
    let activity_level = args.activity.multiplier().ok_or_else(|| {
        CliError::BadRequest("Activity is required (--activity or --activity-level)".into())
    })?;

    Ok(store.create(NewProfile {
        name: args.name,
        sex: args.sex,
        age: args.age,
        height_cm: height.to_cm(),
        height_unit: height.unit(),
        activity_level,
    })?)
}

fn update(args: UpdateArgs, store: &mut ProfileStore) -> CliResult<Uuid> {
    let id = resolve_id(store, args.id)?;
    let height = args.height.to_input();

    store.update(
        id,
        ProfileUpdate {
            name: args.name,
            sex: args.sex,
            age: args.age,
            height_cm: height.map(|h| h.to_cm()),
            height_unit: height.map(|h| h.unit()),
            activity_level: args.activity.multiplier(),
        },
    )?;

    if args.clear_body_fat {
        store.record_body_fat(id, None)?;
    } else if let Some(body_fat) = args.body_fat {
        store.record_body_fat(id, Some(body_fat))?;
    }
    Ok(id)
}

fn split(args: SplitArgs, store: &mut ProfileStore) -> CliResult<Outcome> {
    let id = resolve_id(store, args.id)?;
    store.set_macro_split(id, args.kind, MacroSplit::new(args.protein, args.carbs, args.fat))?;
    Ok(Outcome::write(view(store, id)?))
}

fn estimate(args: EstimateArgs, store: &mut ProfileStore, config: &AppConfig) -> CliResult<Outcome> {
    if let Some(id) = args.id {
        store.set_current(Some(id))?;
    }
    if store.current_id().is_none() {
        return Err(CoreError::NoCurrentProfile.into());
    }
    let rate = args.rate.unwrap_or(config.estimation.default_rate);
    let mut session = Session::resume(store, rate)?;

    let mut changed = args.id.is_some();
    if let Some(weight) = args.weight.to_input() {
        session.enter_weight(store, weight)?;
        changed = true;
    } else if session.results().is_none() {
        return Err(CliError::BadRequest(
            "No weight recorded yet; pass --kg or --stones/--pounds".into(),
        ));
    }

    // A stored body-fat percentage keeps the lean-mass estimate coming back
    let stored_body_fat = store.current().and_then(|p| p.body_fat_percent);
    if let Some(body_fat) = args.body_fat.or(stored_body_fat) {
        session.compute_lean_mass(store, body_fat)?;
        changed |= args.body_fat.is_some();
    }

    let profile = store.current().ok_or(CoreError::NoCurrentProfile)?;
    for bundle in [session.results(), session.lean_mass_results()].into_iter().flatten() {
        if bundle.daily_calories < config.estimation.low_intake_warning_kcal {
            warn!(
                formula = ?bundle.formula,
                daily_calories = bundle.daily_calories,
                threshold = config.estimation.low_intake_warning_kcal,
                "Daily target is below the low-intake threshold"
            );
        }
    }

    let output = EstimateOutput {
        profile_id: profile.id,
        weight_kg: profile.last_weight_kg.unwrap_or_default(),
        results: session.results(),
        lean_mass_results: session.lean_mass_results(),
    };
    Ok(Outcome {
        output: serde_json::to_value(output)?,
        changed,
    })
}

fn activity_levels() -> Value {
    let presets: Vec<Value> = ActivityLevel::ALL
        .iter()
        .map(|level| {
            json!({
                "level": level,
                "multiplier": level.multiplier(),
                "description": level.description(),
            })
        })
        .collect();
    let rates: Vec<Value> = LossRate::ALL
        .iter()
        .map(|rate| {
            json!({
                "rate": rate,
                "pounds_per_week": rate.pounds_per_week(),
                "deficit_kcal": rate.deficit_kcal(),
            })
        })
        .collect();
    json!({ "activity_levels": presets, "loss_rates": rates })
}
