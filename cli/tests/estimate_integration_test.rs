//! Integration tests for the estimate command

mod common;

use macro_monitor_cli::error::{EXIT_INVALID_INPUT, EXIT_NO_PROFILE};

#[test]
fn test_estimate_reference_profile() {
    let app = common::TestApp::new();
    let id = app.create_sam();

    let body = app.run(&["estimate", "--kg", "80"]).unwrap();
    assert_eq!(body["profile_id"], id.as_str());
    assert_eq!(body["weight_kg"], 80.0);

    let results = &body["results"];
    assert_eq!(results["formula"], "mifflin_st_jeor");
    assert_eq!(results["bmr"], 1780);
    assert_eq!(results["tdee"], 2759);
    assert_eq!(results["weight_loss_targets"]["rate05"], 2509);
    assert_eq!(results["weight_loss_targets"]["rate20"], 1759);
    assert_eq!(results["target"], "rate15");
    assert_eq!(results["daily_calories"], 2009);
    assert_eq!(results["macros"]["protein"]["kcal"], 703);
    assert_eq!(results["macros"]["protein"]["grams"], 176);
    assert_eq!(results["macros"]["fat"]["kcal"], 603);
    assert_eq!(results["macros"]["fat"]["grams"], 67);
    assert!(body.get("lean_mass_results").is_none());
}

#[test]
fn test_estimate_reuses_stored_weight() {
    let app = common::TestApp::new();
    app.create_sam();
    app.run(&["estimate", "--kg", "80"]).unwrap();

    let body = app.run(&["estimate", "--rate", "1.0"]).unwrap();
    assert_eq!(body["results"]["daily_calories"], 2259);
    assert_eq!(body["results"]["target"], "rate10");
}

#[test]
fn test_estimate_stone_pounds_recorded_in_kg() {
    let app = common::TestApp::new();
    app.create_sam();

    let body = app.run(&["estimate", "--stones", "12", "--pounds", "8"]).unwrap();
    let weight_kg = body["weight_kg"].as_f64().unwrap();
    assert!((weight_kg - 79.8323).abs() < 1e-3);

    let shown = app.run(&["profile", "show"]).unwrap();
    assert_eq!(shown["last_weight_unit"], "stone_lb");
    assert_eq!(shown["last_weight_display"], "12st 8.0lb");
}

#[test]
fn test_estimate_lean_mass_alongside() {
    let app = common::TestApp::new();
    app.create_sam();

    let body = app.run(&["estimate", "--kg", "80", "--body-fat", "20"]).unwrap();
    let lean = &body["lean_mass_results"];
    assert_eq!(lean["formula"], "katch_mc_ardle");
    assert_eq!(lean["bmr"], 1752);
    assert_eq!(lean["tdee"], 2716);
    assert_eq!(body["results"]["bmr"], 1780);

    // Stored body fat brings the lean-mass estimate back on the next run
    let again = app.run(&["estimate"]).unwrap();
    assert_eq!(again["lean_mass_results"]["bmr"], 1752);
}

#[test]
fn test_estimate_body_fat_out_of_range() {
    let app = common::TestApp::new();
    app.create_sam();
    let err = app
        .run(&["estimate", "--kg", "80", "--body-fat", "4"])
        .unwrap_err();
    assert_eq!(err.code(), "OUT_OF_RANGE");
}

#[test]
fn test_estimate_without_weight_is_bad_request() {
    let app = common::TestApp::new();
    app.create_sam();
    let err = app.run(&["estimate"]).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
}

#[test]
fn test_estimate_without_profile() {
    let app = common::TestApp::new();
    let err = app.run(&["estimate", "--kg", "80"]).unwrap_err();
    assert_eq!(err.code(), "NO_CURRENT_PROFILE");
    assert_eq!(err.exit_code(), EXIT_NO_PROFILE);
}

#[test]
fn test_estimate_invalid_weight() {
    let app = common::TestApp::new();
    app.create_sam();
    let err = app.run(&["estimate", "--kg", "0"]).unwrap_err();
    assert_eq!(err.code(), "INVALID_PROFILE");
}

#[test]
fn test_activity_levels_listing() {
    let app = common::TestApp::new();
    let body = app.run(&["activity-levels"]).unwrap();
    let levels = body["activity_levels"].as_array().unwrap();
    assert_eq!(levels.len(), 5);
    assert_eq!(levels[0]["multiplier"], 1.2);
    assert_eq!(body["loss_rates"].as_array().unwrap().len(), 4);
    assert_eq!(body["loss_rates"][3]["deficit_kcal"], 1000);
}
