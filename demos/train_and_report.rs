//! Train a cancellation model, score booked reservations and answer one
//! interactive query.
//!
//! With a config path argument the data files it names are used. Without one,
//! a small synthetic data set is written to a temporary directory first.
//!
//! Run with: cargo run --example train_and_report [-- config/config.toml]
//! Log level: RUST_LOG=reservation_cancel=debug

use anyhow::{Context, Result};
use reservation_cancel::{
    config::AppConfig,
    data::{split_labels, CsvSource, ReservationSource, StaticTimeZones},
    model::{CancellationModel, Fitted, FittedLogisticRegression, LogisticRegression},
    report::{build_booked_report, write_report_csv},
    IndividualReservation,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RESERVATION_HEADER: &str = "id,user_id,promo_code_id,location,created_at,pickup,dropoff,\
insurance_corporate,insurance_silvercar,insurance_personal,booking_application,time_zone,current_state";

const INDIVIDUAL: &str = r#"{
    "created_at": "2018-02-01 09:15",
    "pickup": "2018-03-09 11:00",
    "dropoff": "2018-03-12 11:00",
    "insurance": "Personal",
    "location": 2,
    "past_finished": 3,
    "past_cancellations": 2,
    "used_promo": "Yes",
    "credit_card": true,
    "web_booking": "No",
    "modified_profile": 0
}"#;

fn write_synthetic_data(dir: &Path) -> Result<AppConfig> {
    let mut config = AppConfig::default();
    config.data.past_reservations = dir.join("past_reservations.csv");
    config.data.booked_reservations = dir.join("booked_reservations.csv");
    config.data.users = dir.join("users.csv");
    config.data.time_zones = dir.join("time_zones.csv");
    config.data.model_path = dir.join("model.bin");

    for (path, n, booked) in [
        (&config.data.past_reservations, 400, false),
        (&config.data.booked_reservations, 25, true),
    ] {
        let mut text = format!("{RESERVATION_HEADER}\n");
        for i in 0..n {
            let user = (i * 7) % 60;
            let flaky = user % 5 == 0;
            let cancelled = if flaky { i % 3 != 0 } else { i % 6 == 0 };
            let pickup = 43100.0 + i as f64 * 0.4;
            let lead = if cancelled { 30.0 + (i % 20) as f64 } else { 2.0 + (i % 9) as f64 };
            let state = match (booked, cancelled) {
                (true, _) => "booked",
                (false, true) => "cancelled",
                (false, false) => "finished",
            };
            writeln!(
                text,
                "{i},{user},{promo},{loc},{created},{pickup},{dropoff},{corp},f,{pers},{app},{tz},{state}",
                promo = if i % 4 == 0 { "11" } else { "" },
                loc = i % 4,
                created = pickup - lead,
                dropoff = pickup + 1.0 + (i % 6) as f64,
                corp = if i % 10 == 0 { "t" } else { "f" },
                pers = if i % 10 == 1 { "t" } else { "f" },
                app = if i % 3 == 0 { "web" } else { "ios" },
                tz = if i % 4 < 2 { "pst" } else { "est" },
            )?;
        }
        fs::write(path, text)?;
    }

    let mut users = "id,postal_code,updated_at,created_at\n".to_string();
    for id in 0..60 {
        let postal = if id % 3 == 0 { "" } else { "94107" };
        writeln!(users, "{id},{postal},{},{}", 42800 + id % 40, 42790)?;
    }
    fs::write(&config.data.users, users)?;
    fs::write(
        &config.data.time_zones,
        "location,time_zone\n0,pst\n1,pst\n2,est\n3,est\n",
    )?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scratch = tempfile::tempdir()?;
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => write_synthetic_data(scratch.path())?,
    };

    let source = CsvSource::from_config(&config.data);
    let past = source.load_rows(false).context("loading past reservations")?;
    let labels = split_labels(&past);

    let classifier = LogisticRegression::from_config(&config.model);
    let model = CancellationModel::new(classifier, &config).fit(&past, &labels)?;
    let accuracy = model.score(&past, &labels)?;
    info!(accuracy, "training accuracy");
    model.save_to_file(&config.data.model_path)?;

    let model = CancellationModel::<FittedLogisticRegression, Fitted>::load_from_file(
        &config.data.model_path,
    )?;

    let booked = source.load_rows(true).context("loading booked reservations")?;
    let (augmented, proba) = model.transform_and_predict(&booked)?;
    let report = build_booked_report(&augmented, &proba, &config.report)?;
    let report_path = config.data.model_path.with_file_name("booked_report.csv");
    write_report_csv(&report_path, &report)?;
    for row in report.iter().take(5) {
        println!(
            "{:>6?} {:>10} {:<16} ${:<6?} {:<10} p={:.2}",
            row.id,
            row.pickup.as_deref().unwrap_or("-"),
            row.month.as_deref().unwrap_or("-"),
            row.price,
            row.insurance,
            row.probability
        );
    }

    let lookup = StaticTimeZones::from_csv(&config.data.time_zones)?;
    let input: IndividualReservation = serde_json::from_str(INDIVIDUAL)?;
    let probability = model.predict_individual_proba(&input, &lookup)?;
    let decision = model.predict_individual(&input, &lookup)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "probability": probability,
            "likely_cancellation": decision == 1,
        }))?
    );

    Ok(())
}
