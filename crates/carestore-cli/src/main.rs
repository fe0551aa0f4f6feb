use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;
use tracing::info;

use carestore_core::app::{logged_events, total_logged};
use carestore_core::domain::{
    Adherence, OutcomeValue, Schedule, TargetValue, TaskVersion, VersionId,
};
use carestore_core::impls::InMemoryCareStore;
use carestore_core::observability::{AdherenceSummary, init_tracing};
use carestore_core::ports::{IdGenerator, SystemClock, UlidGenerator};
use carestore_core::{DateRange, EngineBuilder, EngineConfig};

#[derive(Serialize)]
struct DayReport {
    date: NaiveDate,
    adherence: Adherence,
    mg_logged: f64,
    doses_logged: f64,
}

#[derive(Serialize)]
struct Report {
    range: DateRange,
    summary: AdherenceSummary,
    days: Vec<DayReport>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // (A) 設定とログ: 引数があれば TOML として読む
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(path.as_deref())?;
    init_tracing(&config.logging);

    // (B) ストアと engine を用意
    let store = Arc::new(InMemoryCareStore::new());
    let engine = EngineBuilder::new()
        .with_store(store.clone())
        .with_config(config)
        .build()?;

    // (C) 途中で用量が変わる服薬 task と、adherence に数えない日記 task
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid demo date")?;
    let morning = first_day.and_hms_opt(9, 0, 0).ok_or("invalid demo time")?.and_utc();
    let ids = UlidGenerator::new(SystemClock);

    let v1 = TaskVersion::new(
        "meds",
        ids.generate_version_id(),
        Schedule::daily(morning).with_targets(vec![TargetValue::measure("mg", 10.0)]),
    )
    .with_title("Blood pressure medication");
    let v2 = v1.supersede(
        ids.generate_version_id(),
        Schedule::daily(morning + TimeDelta::days(3))
            .with_targets(vec![TargetValue::measure("mg", 20.0)]),
    );
    let journal = TaskVersion::new(
        "journal",
        ids.generate_version_id(),
        Schedule::daily(morning + TimeDelta::hours(11)),
    )
    .with_impacts_adherence(false);

    let (v1_id, v2_id): (VersionId, VersionId) = (v1.version_id, v2.version_id);
    for version in [v1, v2, journal] {
        store.put_version(version).await?;
    }

    // (D) いくつかの occurrence に値を記録
    let doses = [(v1_id, 0, 10.0), (v1_id, 1, 5.0), (v2_id, 0, 20.0), (v2_id, 2, 10.0)];
    for (version_id, index, mg) in doses {
        let at = engine.fetch_event(version_id, index).await?.occurrence.start;
        let value = OutcomeValue::new(mg, at + TimeDelta::minutes(5)).with_units("mg");
        engine.log_values(version_id, index, vec![value]).await?;
    }
    engine.log_value(v2_id, 1, "skipped, felt dizzy").await?;
    engine.remove_value(v2_id, 1, 0).await?;

    // (E) 1 週間分の adherence と insight を JSON で出力
    let range = DateRange::days_from(first_day, 7);
    let adherence = engine.compute_adherence(None, range).await?;
    let mg = engine
        .compute_insights("meds", range, |events| total_logged(events, Some("mg")))
        .await?;
    let logged = engine
        .compute_insights("meds", range, logged_events)
        .await?;

    let summary = AdherenceSummary::from_days(&adherence);
    info!(?summary, "computed adherence");

    let days = range
        .dates()
        .into_iter()
        .zip(adherence)
        .zip(mg.into_iter().zip(logged))
        .map(|((date, adherence), (mg_logged, doses_logged))| DayReport {
            date,
            adherence,
            mg_logged,
            doses_logged,
        })
        .collect();
    let report = Report {
        range,
        summary,
        days,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
