use reservation_cancel::config::AppConfig;
use reservation_cancel::data::{split_labels, CsvSource, ReservationSource, StaticTimeZones};
use reservation_cancel::features::FlagValue;
use reservation_cancel::model::{
    CancellationModel, Fitted, FittedLogisticRegression, LogisticRegression, ModelError,
};
use reservation_cancel::report::{build_booked_report, write_report_csv};
use reservation_cancel::IndividualReservation;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const HEADER: &str = "id,user_id,promo_code_id,location,created_at,pickup,dropoff,\
insurance_corporate,insurance_silvercar,insurance_personal,booking_application,time_zone,current_state\n";

/// Users 0..8; long lead times and promo codes cancel.
fn write_reservations(path: &Path, n: usize, booked: bool) {
    let mut text = HEADER.to_string();
    for i in 0..n {
        let cancelled = i % 3 == 0;
        let pickup = 43000.0 + i as f64 * 0.75;
        let lead = if cancelled { 45.0 } else { 3.0 };
        let promo = if cancelled { "7" } else { "" };
        let state = match (booked, cancelled) {
            (true, _) => "booked",
            (false, true) => "cancelled",
            (false, false) => "finished",
        };
        let zone = if i % 2 == 0 { "pst" } else { "est" };
        writeln!(
            text,
            "{},{},{},{},{},{},{},f,{},{},web,{},{}",
            i,
            i % 8,
            promo,
            i % 4,
            pickup - lead,
            pickup,
            pickup + 2.0,
            if i % 5 == 0 { "t" } else { "f" },
            if i % 5 == 1 { "t" } else { "f" },
            zone,
            state,
        )
        .unwrap();
    }
    fs::write(path, text).unwrap();
}

fn write_users(path: &Path) {
    let mut text = "id,postal_code,updated_at,created_at\n".to_string();
    for id in 0..8 {
        let postal = if id % 2 == 0 { "94107" } else { "" };
        writeln!(text, "{},{},{},{}", id, postal, 42950 + id, 42900).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn config_in(dir: &Path) -> AppConfig {
    let toml = format!(
        r#"
[model]
learning_rate = 0.5
max_epochs = 150
batch_size = 16

[data]
past_reservations = "{past}"
booked_reservations = "{booked}"
users = "{users}"
time_zones = "{zones}"
model_path = "{model}"
"#,
        past = dir.join("past.csv").display(),
        booked = dir.join("booked.csv").display(),
        users = dir.join("users.csv").display(),
        zones = dir.join("zones.csv").display(),
        model = dir.join("model.bin").display(),
    );
    let path = dir.join("config.toml");
    fs::write(&path, toml).unwrap();
    AppConfig::load_from_path(&path).unwrap()
}

#[test]
fn train_save_load_and_report() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = config_in(dir.path());
    assert_eq!(config.model.max_epochs, 150);
    assert_eq!(config.model.threshold, 0.5);

    write_reservations(&config.data.past_reservations, 60, false);
    write_reservations(&config.data.booked_reservations, 12, true);
    write_users(&config.data.users);
    fs::write(&config.data.time_zones, "location,time_zone\n0,pst\n1,est\n")?;

    let source = CsvSource::from_config(&config.data);
    let rows = source.load_rows(false)?;
    let labels = split_labels(&rows);
    assert_eq!(labels.sum(), 20.0);

    let model = CancellationModel::new(LogisticRegression::from_config(&config.model), &config)
        .fit(&rows, &labels)?;
    assert!(model.score(&rows, &labels)? > 0.9);

    model.save_to_file(&config.data.model_path)?;
    let loaded =
        CancellationModel::<FittedLogisticRegression, Fitted>::load_from_file(&config.data.model_path)?;

    let booked = source.load_rows(true)?;
    let (augmented, proba) = loaded.transform_and_predict(&booked)?;
    assert_eq!(proba, model.predict_proba(&booked)?);

    let report = build_booked_report(&augmented, &proba, &config.report)?;
    assert_eq!(report.len(), booked.len());
    let report_path = dir.path().join("booked_report.csv");
    write_report_csv(&report_path, &report)?;
    let written = fs::read_to_string(&report_path)?;
    assert_eq!(written.lines().count(), booked.len() + 1);

    let lookup = StaticTimeZones::from_csv(&config.data.time_zones)?;
    let input = IndividualReservation {
        created_at: "2017-09-01 12:00".to_string(),
        pickup: "2017-10-15 10:00".to_string(),
        dropoff: "2017-10-18 10:00".to_string(),
        insurance: "Corporate".to_string(),
        location: 0,
        past_finished: 4.0,
        past_cancellations: 1.0,
        used_promo: FlagValue::from("Yes"),
        credit_card: FlagValue::from("yes"),
        web_booking: FlagValue::Bool(true),
        modified_profile: FlagValue::Number(0.0),
    };
    let individual = loaded.predict_individual_proba(&input, &lookup)?;
    assert!((0.0..=1.0).contains(&individual));
    Ok(())
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = CancellationModel::<FittedLogisticRegression, Fitted>::load_from_file(
        dir.path().join("missing.bin"),
    );
    assert!(matches!(result, Err(ModelError::Io(_))));
}

#[test]
fn load_from_corrupt_file_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.bin");
    fs::write(&path, [0xffu8; 8]).unwrap();

    let result = CancellationModel::<FittedLogisticRegression, Fitted>::load_from_file(&path);
    assert!(matches!(result, Err(ModelError::Serialization(_))));
}
