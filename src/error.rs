use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Stock,
    Demand,
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Table::Stock => write!(f, "stock"),
            Table::Demand => write!(f, "demand"),
        }
    }
}

/// Input rejected before any optimization work starts. Rows are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{table} row {row}: {field} '{text}' is not an integer")]
    NotAnInteger {
        table: Table,
        row: usize,
        field: &'static str,
        text: String,
    },

    #[error("{table} row {row}: expected LENGTH and QUANTITY, got '{text}'")]
    Malformed {
        table: Table,
        row: usize,
        text: String,
    },

    #[error("{table} row {row}: length must be positive, got {value}")]
    NonPositiveLength { table: Table, row: usize, value: i64 },

    #[error("{table} row {row}: quantity must not be negative, got {value}")]
    NegativeQuantity { table: Table, row: usize, value: i64 },

    #[error("{table} row {row}: {field} {value} is out of range")]
    OutOfRange {
        table: Table,
        row: usize,
        field: &'static str,
        value: i64,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("solver {solver} failed: {reason}")]
    Solver {
        solver: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
