use serde::{Deserialize, Serialize};

/// The arithmetic operations a drill can contain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    /// Generation order used when building a problem set.
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    /// `None` when the result does not fit in an `i64`.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Operator::Add => lhs.checked_add(rhs),
            Operator::Subtract => lhs.checked_sub(rhs),
            Operator::Multiply => lhs.checked_mul(rhs),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
        }
    }
}
