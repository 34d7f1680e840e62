use thiserror::Error;

/// Failures while loading the collision export. The load is all-or-nothing:
/// the first bad row aborts with one of these.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: malformed record: {source}")]
    Malformed {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: missing or unparseable date {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: time {value:?} does not normalize to an hour in 0..=23")]
    InvalidTime { row: usize, value: String },

    #[error("row {row}: invalid {column} count {value:?}")]
    InvalidCount {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: unrecognized severity {value:?}")]
    InvalidSeverity { row: usize, value: String },

    #[error("row {row}: {column} is empty and no earlier row has a value to carry forward")]
    LeadingMissing { row: usize, column: &'static str },
}

/// Failures while aggregating for a report pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Unknown factor or time-unit name. Selections come from closed
    /// enumerations, so hitting this means a caller broke the contract.
    #[error("unknown {kind} {name:?}")]
    InvalidParameter { kind: &'static str, name: String },

    #[error("no data to display: the loaded dataset is empty")]
    EmptyDataset,
}
