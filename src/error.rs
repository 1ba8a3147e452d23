use thiserror::Error;

use crate::operator::Operator;

#[derive(Debug, Error)]
pub enum DrillError {
    /// The configuration produced no problems, so a session cannot start.
    #[error("configuration produced no problems; widen an operand range or raise a sample count")]
    EmptyPool,
    #[error("{operator} operand range is inverted: {min}..{max}")]
    InvalidRange { operator: Operator, min: i64, max: i64 },
    #[error("{operator} operand range {min}..{max} reaches past ±{limit}")]
    RangeTooWide {
        operator: Operator,
        min: i64,
        max: i64,
        limit: i64,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DrillError>;
