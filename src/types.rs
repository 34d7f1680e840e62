use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::ReportError;

/// The columns of the collision export this report reads. The source file
/// carries 46 columns; everything not listed here is ignored by the reader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "ACCDATE")]
    pub acc_date: Option<String>,
    #[serde(rename = "ACCTIME")]
    pub acc_time: Option<String>,
    #[serde(rename = "NOINJ")]
    pub injuries: Option<String>,
    #[serde(rename = "NOKILLED")]
    pub fatalities: Option<String>,
    #[serde(rename = "SEVERITY")]
    pub severity: Option<String>,
    #[serde(rename = "ACCSITE")]
    pub accident_site: Option<String>,
    #[serde(rename = "WEATHER")]
    pub weather: Option<String>,
    #[serde(rename = "ROADSURF")]
    pub road_surface: Option<String>,
    #[serde(rename = "ROADCOND")]
    pub road_condition: Option<String>,
    #[serde(rename = "NATLIGHT")]
    pub natural_light: Option<String>,
    #[serde(rename = "ARTLIGHT")]
    pub artificial_light: Option<String>,
    #[serde(rename = "ROADAUTH")]
    pub road_authority: Option<String>,
    #[serde(rename = "USTREET1")]
    pub street_primary: Option<String>,
    #[serde(rename = "USTREET2")]
    pub street_secondary: Option<String>,
}

/// One cleaned collision record. Calendar fields are derived from `ACCDATE`,
/// `hour` from `ACCTIME`; every categorical cell has been forward-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRecord {
    pub date: NaiveDate,
    pub year: i32,
    pub month: String,
    pub weekday: String,
    pub hour: u32,
    pub injuries: u32,
    pub fatalities: u32,
    pub severity: Severity,
    pub accident_site: String,
    pub weather: String,
    pub road_surface: String,
    pub road_condition: String,
    pub natural_light: String,
    pub artificial_light: String,
    pub road_authority: String,
    pub street_primary: String,
    pub street_secondary: String,
}

/// Outcome classification of a collision, level codes 1-3 in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    PropertyDamageOnly,
    PersonalInjury,
    Fatal,
}

impl Severity {
    /// Accepts the numeric level code or the spelled-out label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" | "Property Damage Only" => Some(Self::PropertyDamageOnly),
            "2" | "Personal Injury" => Some(Self::PersonalInjury),
            "3" | "Fatal" => Some(Self::Fatal),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PropertyDamageOnly => "Property Damage Only",
            Self::PersonalInjury => "Personal Injury",
            Self::Fatal => "Fatal",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The seven contextual attributes a report pass can group severity by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Weather,
    RoadSurface,
    RoadCondition,
    AccidentSite,
    NaturalLight,
    ArtificialLight,
    RoadAuthority,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::Weather,
        Factor::RoadSurface,
        Factor::RoadCondition,
        Factor::AccidentSite,
        Factor::NaturalLight,
        Factor::ArtificialLight,
        Factor::RoadAuthority,
    ];

    /// Column name in the source export.
    pub fn column_name(self) -> &'static str {
        match self {
            Factor::Weather => "WEATHER",
            Factor::RoadSurface => "ROADSURF",
            Factor::RoadCondition => "ROADCOND",
            Factor::AccidentSite => "ACCSITE",
            Factor::NaturalLight => "NATLIGHT",
            Factor::ArtificialLight => "ARTLIGHT",
            Factor::RoadAuthority => "ROADAUTH",
        }
    }

    /// Human-readable name, as the original report labeled its choices.
    pub fn label(self) -> &'static str {
        match self {
            Factor::Weather => "Weather",
            Factor::RoadSurface => "Road surface",
            Factor::RoadCondition => "Road condition",
            Factor::AccidentSite => "Accident site",
            Factor::NaturalLight => "Natural light",
            Factor::ArtificialLight => "Artificial light",
            Factor::RoadAuthority => "Road authority",
        }
    }

    /// Resolve a column name into a factor; unknown names violate the
    /// report contract.
    pub fn parse(name: &str) -> Result<Self, ReportError> {
        Factor::ALL
            .into_iter()
            .find(|f| f.column_name() == name)
            .ok_or_else(|| ReportError::InvalidParameter {
                kind: "factor",
                name: name.to_string(),
            })
    }

    pub fn value<'a>(&self, record: &'a CollisionRecord) -> &'a str {
        match self {
            Factor::Weather => &record.weather,
            Factor::RoadSurface => &record.road_surface,
            Factor::RoadCondition => &record.road_condition,
            Factor::AccidentSite => &record.accident_site,
            Factor::NaturalLight => &record.natural_light,
            Factor::ArtificialLight => &record.artificial_light,
            Factor::RoadAuthority => &record.road_authority,
        }
    }
}

/// Temporal granularity for bucketing counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Year,
    Month,
    Weekday,
    Hour,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 4] = [
        TimeUnit::Year,
        TimeUnit::Month,
        TimeUnit::Weekday,
        TimeUnit::Hour,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Month => "month",
            TimeUnit::Weekday => "weekday",
            TimeUnit::Hour => "hour",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ReportError> {
        TimeUnit::ALL
            .into_iter()
            .find(|u| u.label() == name)
            .ok_or_else(|| ReportError::InvalidParameter {
                kind: "time unit",
                name: name.to_string(),
            })
    }

    /// Bucket key for a record at this granularity. Keys are strings so
    /// they double as axis labels in the exported tables.
    pub fn key(&self, record: &CollisionRecord) -> String {
        match self {
            TimeUnit::Year => record.year.to_string(),
            TimeUnit::Month => record.month.clone(),
            TimeUnit::Weekday => record.weekday.clone(),
            TimeUnit::Hour => record.hour.to_string(),
        }
    }
}

/// Which of the two intersecting-street columns to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreetColumn {
    Primary,
    Secondary,
}

impl StreetColumn {
    pub fn column_name(self) -> &'static str {
        match self {
            StreetColumn::Primary => "USTREET1",
            StreetColumn::Secondary => "USTREET2",
        }
    }

    pub fn value<'a>(&self, record: &'a CollisionRecord) -> &'a str {
        match self {
            StreetColumn::Primary => &record.street_primary,
            StreetColumn::Secondary => &record.street_secondary,
        }
    }
}

// Aggregate values. These stay numeric; rendering into display rows happens
// in the report layer.

#[derive(Debug, Clone, PartialEq)]
pub struct YearTotals {
    /// Four-digit year, or "Total" for the synthetic trailing row.
    pub year: String,
    pub injuries: u64,
    pub fatalities: u64,
    pub pct_of_injuries: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeverityCount {
    pub time_value: String,
    pub severity: Severity,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorCount {
    pub time_value: String,
    pub factor_value: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreetCount {
    pub street: String,
    pub accidents: u64,
}

// Display rows for table previews and CSV export.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearTotalsRow {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "Injuries")]
    #[tabled(rename = "Injuries")]
    pub injuries: u64,
    #[serde(rename = "Fatalities")]
    #[tabled(rename = "Fatalities")]
    pub fatalities: u64,
    #[serde(rename = "PctOfInjuries")]
    #[tabled(rename = "PctOfInjuries")]
    pub pct_of_injuries: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SeverityCountRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Severity")]
    #[tabled(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "Collisions")]
    #[tabled(rename = "Collisions")]
    pub collisions: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FactorCountRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "FactorValue")]
    #[tabled(rename = "FactorValue")]
    pub factor_value: String,
    #[serde(rename = "Collisions")]
    #[tabled(rename = "Collisions")]
    pub collisions: u64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StreetCountRow {
    #[serde(rename = "Street")]
    #[tabled(rename = "Street")]
    pub street: String,
    #[serde(rename = "Accidents")]
    #[tabled(rename = "Accidents")]
    pub accidents: u64,
}

/// Dataset-wide figures exported to `summary.json`.
#[derive(Debug, Serialize, PartialEq)]
pub struct SummaryStats {
    pub total_collisions: usize,
    pub total_injuries: u64,
    pub total_fatalities: u64,
    pub fatal_collisions: usize,
    pub distinct_streets: usize,
    pub avg_injuries_per_year: f64,
}
