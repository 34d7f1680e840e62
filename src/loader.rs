use crate::error::LoadError;
use crate::types::{CollisionRecord, RawRow, Severity};
use crate::util::{normalize_hour, parse_count};
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use std::io::Read;

/// Cleaning diagnostics printed after a load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub filled_cells: usize,
    pub zeroed_hours: usize,
}

/// Last-seen cell values, carried row to row in file order.
///
/// Blank cells repeat the previous row's value. This mirrors the cleaning
/// step the published figures were computed with; it deliberately conflates
/// "unknown" with "same as the previous incident" and biases streaks of
/// missing data toward the last reported value. Known limitation, kept.
#[derive(Default)]
struct Carry {
    injuries: Option<String>,
    fatalities: Option<String>,
    severity: Option<String>,
    accident_site: Option<String>,
    weather: Option<String>,
    road_surface: Option<String>,
    road_condition: Option<String>,
    natural_light: Option<String>,
    artificial_light: Option<String>,
    road_authority: Option<String>,
    street_primary: Option<String>,
    street_secondary: Option<String>,
}

/// Take a cell, falling back to the carried value when it is blank.
///
/// A blank cell on the first row has nothing to fall back to; the load
/// contract makes that fatal rather than inventing a category.
fn fill(
    slot: &mut Option<String>,
    cell: Option<String>,
    column: &'static str,
    row: usize,
    filled_cells: &mut usize,
) -> Result<String, LoadError> {
    let trimmed = cell.as_deref().map(str::trim).unwrap_or("");
    if !trimmed.is_empty() {
        let value = trimmed.to_string();
        *slot = Some(value.clone());
        return Ok(value);
    }
    match slot {
        Some(prev) => {
            *filled_cells += 1;
            Ok(prev.clone())
        }
        None => Err(LoadError::LeadingMissing { row, column }),
    }
}

/// Load and clean the collision export at `path`.
///
/// Either every row parses into a `CollisionRecord` or the whole load
/// fails; there is no partial-success mode. The returned records are
/// sorted ascending by date, so first-encountered bucket order downstream
/// is chronological.
pub fn load_and_clean(path: &str) -> Result<(Vec<CollisionRecord>, LoadReport), LoadError> {
    let rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_string(),
            source,
        })?;
    load_from_csv(rdr)
}

/// Same pipeline over any reader; the path variant delegates here.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Vec<CollisionRecord>, LoadReport), LoadError> {
    load_from_csv(ReaderBuilder::new().flexible(true).from_reader(reader))
}

fn load_from_csv<R: Read>(
    mut rdr: csv::Reader<R>,
) -> Result<(Vec<CollisionRecord>, LoadReport), LoadError> {
    let mut records: Vec<CollisionRecord> = Vec::new();
    let mut carry = Carry::default();
    let mut filled_cells = 0usize;
    let mut zeroed_hours = 0usize;
    let mut row = 0usize;

    for result in rdr.deserialize::<RawRow>() {
        row += 1;
        let raw = result.map_err(|source| LoadError::Malformed { row, source })?;

        // The date is the one cell that is never filled: without it there
        // is no calendar bucket for the record at all.
        let date_cell = raw.acc_date.as_deref().map(str::trim).unwrap_or("");
        let date: NaiveDate =
            NaiveDate::parse_from_str(date_cell, "%Y-%m-%d").map_err(|_| LoadError::InvalidDate {
                row,
                value: date_cell.to_string(),
            })?;
        let weekday = date.format("%a").to_string();
        let month = date.format("%b").to_string();

        let time_cell = raw.acc_time.as_deref();
        let hour = normalize_hour(time_cell).ok_or_else(|| LoadError::InvalidTime {
            row,
            value: time_cell.unwrap_or("").to_string(),
        })?;
        // Count sentinel/blank zeroes separately from genuine midnight.
        let trimmed_time = time_cell.map(str::trim).unwrap_or("");
        let hour_digits = &trimmed_time[..trimmed_time.len().saturating_sub(2)];
        if trimmed_time.is_empty() || hour_digits.is_empty() || hour_digits == "99" {
            zeroed_hours += 1;
        }

        let injuries_cell = fill(&mut carry.injuries, raw.injuries, "NOINJ", row, &mut filled_cells)?;
        let injuries = parse_count(&injuries_cell).ok_or_else(|| LoadError::InvalidCount {
            row,
            column: "NOINJ",
            value: injuries_cell.clone(),
        })?;

        let fatalities_cell = fill(
            &mut carry.fatalities,
            raw.fatalities,
            "NOKILLED",
            row,
            &mut filled_cells,
        )?;
        let fatalities = parse_count(&fatalities_cell).ok_or_else(|| LoadError::InvalidCount {
            row,
            column: "NOKILLED",
            value: fatalities_cell.clone(),
        })?;

        let severity_cell = fill(
            &mut carry.severity,
            raw.severity,
            "SEVERITY",
            row,
            &mut filled_cells,
        )?;
        let severity = Severity::parse(&severity_cell).ok_or_else(|| LoadError::InvalidSeverity {
            row,
            value: severity_cell.clone(),
        })?;

        let accident_site = fill(
            &mut carry.accident_site,
            raw.accident_site,
            "ACCSITE",
            row,
            &mut filled_cells,
        )?;
        let weather = fill(&mut carry.weather, raw.weather, "WEATHER", row, &mut filled_cells)?;
        let road_surface = fill(
            &mut carry.road_surface,
            raw.road_surface,
            "ROADSURF",
            row,
            &mut filled_cells,
        )?;
        let road_condition = fill(
            &mut carry.road_condition,
            raw.road_condition,
            "ROADCOND",
            row,
            &mut filled_cells,
        )?;
        let natural_light = fill(
            &mut carry.natural_light,
            raw.natural_light,
            "NATLIGHT",
            row,
            &mut filled_cells,
        )?;
        let artificial_light = fill(
            &mut carry.artificial_light,
            raw.artificial_light,
            "ARTLIGHT",
            row,
            &mut filled_cells,
        )?;
        let road_authority = fill(
            &mut carry.road_authority,
            raw.road_authority,
            "ROADAUTH",
            row,
            &mut filled_cells,
        )?;
        let street_primary = fill(
            &mut carry.street_primary,
            raw.street_primary,
            "USTREET1",
            row,
            &mut filled_cells,
        )?;
        let street_secondary = fill(
            &mut carry.street_secondary,
            raw.street_secondary,
            "USTREET2",
            row,
            &mut filled_cells,
        )?;

        records.push(CollisionRecord {
            date,
            year: date.year(),
            month,
            weekday,
            hour,
            injuries,
            fatalities,
            severity,
            accident_site,
            weather,
            road_surface,
            road_condition,
            natural_light,
            artificial_light,
            road_authority,
            street_primary,
            street_secondary,
        });
    }

    records.sort_by_key(|r| r.date);

    let report = LoadReport {
        total_rows: row,
        filled_cells,
        zeroed_hours,
    };
    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "ACCNO,ACCDATE,ACCTIME,NOINJ,NOKILLED,SEVERITY,ACCSITE,WEATHER,ROADSURF,ROADCOND,NATLIGHT,ARTLIGHT,ROADAUTH,USTREET1,USTREET2\n";

    fn load(rows: &str) -> Result<(Vec<CollisionRecord>, LoadReport), LoadError> {
        let csv = format!("{HEADER}{rows}");
        load_from_reader(Cursor::new(csv))
    }

    #[test]
    fn test_derives_calendar_fields_and_hour() {
        let (records, report) = load(
            "1,2015-06-17,1430,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n",
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.year, 2015);
        assert_eq!(r.month, "Jun");
        assert_eq!(r.weekday, "Wed");
        assert_eq!(r.hour, 14);
        assert_eq!(r.severity, Severity::PersonalInjury);
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.filled_cells, 0);
    }

    #[test]
    fn test_forward_fill_repeats_previous_row() {
        let (records, report) = load(concat!(
            "1,2015-06-17,1430,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n",
            "2,2015-06-18,900,,,,,Snow,,,,,,Broad St,\n",
        ))
        .unwrap();
        let r = &records[1];
        assert_eq!(r.injuries, 1);
        assert_eq!(r.fatalities, 0);
        assert_eq!(r.severity, Severity::PersonalInjury);
        assert_eq!(r.accident_site, "Intersection");
        assert_eq!(r.weather, "Snow");
        assert_eq!(r.road_surface, "Dry");
        assert_eq!(r.street_primary, "Broad St");
        assert_eq!(r.street_secondary, "4th Ave");
        // 10 blank cells filled on row 2 (weather and USTREET1 were present).
        assert_eq!(report.filled_cells, 10);
    }

    #[test]
    fn test_leading_blank_is_fatal() {
        let err = load(",2015-06-17,1430,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,,4th Ave\n")
            .unwrap_err();
        match err {
            LoadError::LeadingMissing { row: 1, column } => assert_eq!(column, "USTREET1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_date_is_fatal() {
        let err = load("1,17/06/2015,1430,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn test_sentinel_times_zero_the_hour() {
        let (records, report) = load(concat!(
            "1,2015-06-17,99,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n",
            "2,2015-06-18,,0,0,1,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n",
        ))
        .unwrap();
        assert_eq!(records[0].hour, 0);
        assert_eq!(records[1].hour, 0);
        assert_eq!(report.zeroed_hours, 2);
    }

    #[test]
    fn test_out_of_range_hour_is_fatal() {
        let err = load("1,2015-06-17,2560,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n")
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidTime { row: 1, .. }));
    }

    #[test]
    fn test_records_sorted_by_date() {
        let (records, _) = load(concat!(
            "1,2016-01-02,900,1,0,2,Intersection,Clear,Dry,Normal,Daylight,None,1,Albert St,4th Ave\n",
            "2,2015-12-31,900,0,0,1,Intersection,Clear,Dry,Normal,Daylight,None,1,Broad St,7th Ave\n",
        ))
        .unwrap();
        assert!(records[0].date < records[1].date);
        assert_eq!(records[0].street_primary, "Broad St");
    }
}
