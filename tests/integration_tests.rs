use bike_collision_report::loader::load_and_clean;
use bike_collision_report::reports::{
    severity_by_time, street_frequency, summarize, totals_by_year,
};
use bike_collision_report::types::{StreetColumn, TimeUnit};
use chrono::NaiveDate;

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/collisions.csv"
);

#[test]
fn test_full_pipeline() {
    let (records, report) = load_and_clean(FIXTURE).expect("fixture should load");

    assert_eq!(records.len(), 12);
    assert_eq!(report.total_rows, 12);
    // Row 3 has one blank (ARTLIGHT), row 4 has seven.
    assert_eq!(report.filled_cells, 8);
    // Sentinel time on row 2, empty time on row 5.
    assert_eq!(report.zeroed_hours, 2);

    // Sorted ascending by date.
    assert!(records.windows(2).all(|w| w[0].date <= w[1].date));

    // Forward-fill repeated the previous row's context on the blank row.
    let filled = records
        .iter()
        .find(|r| r.date == NaiveDate::from_ymd_opt(2010, 7, 4).unwrap())
        .unwrap();
    assert_eq!(filled.weather, "Clear");
    assert_eq!(filled.accident_site, "Intersection");
    assert_eq!(filled.road_authority, "1");
    // The blank ARTLIGHT on the preceding row itself carried from earlier.
    assert_eq!(filled.artificial_light, "None");

    // Sentinel and empty times normalize to hour 0.
    let sentinel = records
        .iter()
        .find(|r| r.date == NaiveDate::from_ymd_opt(2010, 5, 11).unwrap())
        .unwrap();
    assert_eq!(sentinel.hour, 0);
    let blank_time = records
        .iter()
        .find(|r| r.date == NaiveDate::from_ymd_opt(2010, 9, 18).unwrap())
        .unwrap();
    assert_eq!(blank_time.hour, 0);
}

#[test]
fn test_totals_by_year_table() {
    let (records, _) = load_and_clean(FIXTURE).unwrap();
    let rows = totals_by_year(&records).unwrap();

    let labels: Vec<&str> = rows.iter().map(|r| r.year.as_str()).collect();
    assert_eq!(labels, ["2010", "2011", "Total"]);

    assert_eq!(rows[0].injuries, 6);
    assert_eq!(rows[0].fatalities, 1);
    assert_eq!(rows[1].injuries, 4);
    assert_eq!(rows[1].fatalities, 0);

    let total = rows.last().unwrap();
    assert_eq!(total.injuries, 10);
    assert_eq!(total.fatalities, 1);

    // The Total percentage is the sum of the per-year percentages.
    let pct_sum: f64 = rows[..rows.len() - 1].iter().map(|r| r.pct_of_injuries).sum();
    assert!((total.pct_of_injuries - pct_sum).abs() < 1e-9);
    assert!((rows[0].pct_of_injuries - 600.0 / 11.0).abs() < 1e-9);
}

#[test]
fn test_severity_counts_conserve_record_count() {
    let (records, _) = load_and_clean(FIXTURE).unwrap();
    for unit in TimeUnit::ALL {
        let rows = severity_by_time(&records, unit).unwrap();
        let sum: u64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(sum as usize, records.len(), "unit {}", unit.label());
    }
}

#[test]
fn test_street_frequency_threshold() {
    let (records, _) = load_and_clean(FIXTURE).unwrap();

    let filtered = street_frequency(&records, StreetColumn::Primary, 5).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].street, "Albert St");
    assert_eq!(filtered[0].accidents, 7);
    assert!(filtered.iter().all(|r| r.accidents >= 5));

    // Unfiltered counts cover the whole dataset.
    let all = street_frequency(&records, StreetColumn::Primary, 1).unwrap();
    let total: u64 = all.iter().map(|r| r.accidents).sum();
    assert_eq!(total as usize, records.len());
}

#[test]
fn test_loading_twice_is_idempotent() {
    let (first, _) = load_and_clean(FIXTURE).unwrap();
    let (second, _) = load_and_clean(FIXTURE).unwrap();
    assert_eq!(first, second);

    assert_eq!(
        totals_by_year(&first).unwrap(),
        totals_by_year(&second).unwrap()
    );
    assert_eq!(
        severity_by_time(&first, TimeUnit::Weekday).unwrap(),
        severity_by_time(&second, TimeUnit::Weekday).unwrap()
    );
    assert_eq!(summarize(&first), summarize(&second));
}
