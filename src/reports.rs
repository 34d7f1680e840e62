use crate::error::ReportError;
use crate::types::{
    CollisionRecord, Factor, FactorCount, FactorCountRow, Severity, SeverityCount,
    SeverityCountRow, StreetColumn, StreetCount, StreetCountRow, SummaryStats, TimeUnit,
    YearTotals, YearTotalsRow,
};
use crate::util::{format_number, percentage};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Summed injuries and fatalities per year, each year's injuries as a share
/// of the dataset-wide injuries-plus-fatalities total, and a synthetic
/// trailing `Total` row holding the column sums. Ascending year, Total last.
pub fn totals_by_year(data: &[CollisionRecord]) -> Result<Vec<YearTotals>, ReportError> {
    if data.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut by_year: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for r in data {
        let e = by_year.entry(r.year).or_insert((0, 0));
        e.0 += u64::from(r.injuries);
        e.1 += u64::from(r.fatalities);
    }

    let grand_injuries: u64 = by_year.values().map(|(inj, _)| inj).sum();
    let grand_fatalities: u64 = by_year.values().map(|(_, fat)| fat).sum();
    let grand_total = grand_injuries + grand_fatalities;

    let mut rows: Vec<YearTotals> = Vec::with_capacity(by_year.len() + 1);
    let mut pct_sum = 0.0;
    for (year, (injuries, fatalities)) in by_year {
        let pct = percentage(injuries, grand_total);
        pct_sum += pct;
        rows.push(YearTotals {
            year: year.to_string(),
            injuries,
            fatalities,
            pct_of_injuries: pct,
        });
    }
    rows.push(YearTotals {
        year: "Total".to_string(),
        injuries: grand_injuries,
        fatalities: grand_fatalities,
        pct_of_injuries: pct_sum,
    });
    Ok(rows)
}

/// Count of records per (time bucket, severity) pair, in first-encountered
/// order of both keys. The order is part of the contract: the exported
/// table is the chart's axis order.
pub fn severity_by_time(
    data: &[CollisionRecord],
    time_unit: TimeUnit,
) -> Result<Vec<SeverityCount>, ReportError> {
    if data.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut order: Vec<(String, Severity)> = Vec::new();
    let mut counts: HashMap<(String, Severity), u64> = HashMap::new();
    for r in data {
        let key = (time_unit.key(r), r.severity);
        match counts.get_mut(&key) {
            Some(n) => *n += 1,
            None => {
                counts.insert(key.clone(), 1);
                order.push(key);
            }
        }
    }

    Ok(order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            SeverityCount {
                time_value: key.0,
                severity: key.1,
                count,
            }
        })
        .collect())
}

/// Count of records per (time bucket, factor value) pair, first-encountered
/// order, for the selected contextual factor.
pub fn severity_by_factor_and_time(
    data: &[CollisionRecord],
    factor: Factor,
    time_unit: TimeUnit,
) -> Result<Vec<FactorCount>, ReportError> {
    if data.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut order: Vec<(String, String)> = Vec::new();
    let mut counts: HashMap<(String, String), u64> = HashMap::new();
    for r in data {
        let key = (time_unit.key(r), factor.value(r).to_string());
        match counts.get_mut(&key) {
            Some(n) => *n += 1,
            None => {
                counts.insert(key.clone(), 1);
                order.push(key);
            }
        }
    }

    Ok(order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            FactorCount {
                time_value: key.0,
                factor_value: key.1,
                count,
            }
        })
        .collect())
}

/// Accident count per street, filtered to streets with at least `min_count`
/// reported collisions, descending count; ties keep first-seen order.
pub fn street_frequency(
    data: &[CollisionRecord],
    column: StreetColumn,
    min_count: u64,
) -> Result<Vec<StreetCount>, ReportError> {
    if data.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for r in data {
        let street = column.value(r);
        match counts.get_mut(street) {
            Some(n) => *n += 1,
            None => {
                counts.insert(street.to_string(), 1);
                order.push(street.to_string());
            }
        }
    }

    let mut rows: Vec<(usize, StreetCount)> = order
        .into_iter()
        .enumerate()
        .filter_map(|(seen, street)| {
            let accidents = counts[&street];
            if accidents >= min_count {
                Some((seen, StreetCount { street, accidents }))
            } else {
                None
            }
        })
        .collect();
    rows.sort_by(|a, b| b.1.accidents.cmp(&a.1.accidents).then(a.0.cmp(&b.0)));
    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

/// Dataset-wide figures for `summary.json`.
pub fn summarize(data: &[CollisionRecord]) -> SummaryStats {
    let total_injuries: u64 = data.iter().map(|r| u64::from(r.injuries)).sum();
    let total_fatalities: u64 = data.iter().map(|r| u64::from(r.fatalities)).sum();
    let fatal_collisions = data
        .iter()
        .filter(|r| r.severity == Severity::Fatal)
        .count();
    let mut streets: HashSet<&str> = HashSet::new();
    let mut years: HashSet<i32> = HashSet::new();
    for r in data {
        streets.insert(r.street_primary.as_str());
        streets.insert(r.street_secondary.as_str());
        years.insert(r.year);
    }
    let avg_injuries_per_year = if years.is_empty() {
        0.0
    } else {
        total_injuries as f64 / years.len() as f64
    };
    SummaryStats {
        total_collisions: data.len(),
        total_injuries,
        total_fatalities,
        fatal_collisions,
        distinct_streets: streets.len(),
        avg_injuries_per_year,
    }
}

// Display rendering: column renaming and number formatting only.

pub fn render_year_totals(rows: &[YearTotals]) -> Vec<YearTotalsRow> {
    rows.iter()
        .map(|r| YearTotalsRow {
            year: r.year.clone(),
            injuries: r.injuries,
            fatalities: r.fatalities,
            pct_of_injuries: format_number(r.pct_of_injuries, 2),
        })
        .collect()
}

pub fn render_severity_counts(rows: &[SeverityCount]) -> Vec<SeverityCountRow> {
    rows.iter()
        .map(|r| SeverityCountRow {
            period: r.time_value.clone(),
            severity: r.severity.label().to_string(),
            collisions: r.count,
        })
        .collect()
}

pub fn render_factor_counts(rows: &[FactorCount]) -> Vec<FactorCountRow> {
    rows.iter()
        .map(|r| FactorCountRow {
            period: r.time_value.clone(),
            factor_value: r.factor_value.clone(),
            collisions: r.count,
        })
        .collect()
}

pub fn render_street_counts(rows: &[StreetCount]) -> Vec<StreetCountRow> {
    rows.iter()
        .map(|r| StreetCountRow {
            street: r.street.clone(),
            accidents: r.accidents,
        })
        .collect()
}
