use chrono::{Duration, NaiveDate, Offset, TimeZone, Utc};
use rand::Rng;
use sensorchart::{
    Catalog, CatalogLabeler, Domain, Engine, Measurement, Sensor, SensorType, Value, Window,
};
use std::time::Instant;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const TEMPERATURE: u64 = 1;
const HUMIDITY: u64 = 2;

fn generate(start: NaiveDate, days: i64, sensors: &[(u64, u64, Value)]) -> Vec<Measurement> {
    let mut rng = rand::thread_rng();
    let mut measurements = vec![];

    let Some(start) = start.and_hms_opt(0, 0, 0) else {
        return measurements;
    };
    let start = Utc.from_utc_datetime(&start);

    for &(sensor, metric, base) in sensors {
        for idx in 0..(days * 24 * 12) {
            let ts = start + Duration::minutes(idx * 5);

            // Some sensors drop out every now and then
            if rng.gen_bool(0.02) {
                measurements.push(Measurement::missing(ts, metric).sensor(sensor));
                continue;
            }

            let value: Value = (base + rng.gen_range(-5.0..5.0)).max(0.0);
            measurements.push(Measurement::new(value, ts, metric).sensor(sensor));
        }
    }

    measurements
}

fn main() -> sensorchart::Result<()> {
    env_logger::builder()
        .filter_module("sensorchart", log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let catalog = Catalog::new(
        [
            Sensor {
                id: 1,
                name: "North wall".into(),
                type_id: Some(10),
            },
            Sensor {
                id: 2,
                name: "Greenhouse".into(),
                type_id: Some(10),
            },
            Sensor {
                id: 3,
                name: "Greenhouse".into(),
                type_id: Some(20),
            },
        ],
        [
            SensorType {
                id: 10,
                name: "Temperature".into(),
            },
            SensorType {
                id: 20,
                name: "Humidity".into(),
            },
        ],
    );
    let labeler = CatalogLabeler::new(&catalog);

    let Some(start) = NaiveDate::from_ymd_opt(2024, 10, 25) else {
        return Ok(());
    };
    let Some(last_year) = NaiveDate::from_ymd_opt(2023, 10, 25) else {
        return Ok(());
    };

    let sensors = [
        (1, TEMPERATURE, 18.0),
        (2, TEMPERATURE, 26.0),
        (3, HUMIDITY, 70.0),
    ];

    let measurements = generate(start, 14, &sensors);
    let comparison = generate(last_year, 14, &sensors)
        .into_iter()
        .map(|mut m| {
            // NOTE: Shift onto this year's time axis
            m.timestamp += Duration::days(366);
            m
        })
        .collect::<Vec<_>>();

    log::info!("generated {} measurements", measurements.len());

    let engine = Engine::new();

    for days in [0, 3, 13] {
        let window = Window::new(start, start + Duration::days(days));

        // NOTE: Normally the fetch only returns readings of the window
        let in_window = measurements
            .iter()
            .filter(|m| window.contains(&m.timestamp, Utc.fix()))
            .cloned()
            .collect::<Vec<_>>();

        let instant = Instant::now();

        let series = engine.chart(
            &in_window,
            &window,
            &labeler,
            Domain::new(Some(0.0), Some(100.0)),
        );

        log::info!(
            "{days} day span: {} points x {} series at {} in {:?}",
            series.len(),
            series.labels.len(),
            series.granularity,
            instant.elapsed(),
        );
    }

    let window = Window::new(start, start + Duration::days(13));

    let instant = Instant::now();
    let merged = engine.compare(
        &measurements,
        &comparison,
        &window,
        &labeler,
        Domain::default(),
    )?;
    log::info!("merged {} rows in {:?}", merged.len(), instant.elapsed());

    if let Some(first) = merged.first() {
        log::info!("first row: {first:?}");
    }

    for metric in ["metrica_1", "metrica_2"] {
        let thresholds = engine.recommend(&measurements, &window, metric, &labeler)?;
        log::info!("{metric} thresholds: {thresholds:#?}");
    }

    Ok(())
}
