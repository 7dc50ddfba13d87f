//! Recall grades

use serde::{Deserialize, Serialize};

/// Grade error type
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeError {
    /// Numeric grade outside {0, 1, 2}
    #[error("Grade must be 0 (bad), 1 (medium) or 2 (good), got {0}")]
    OutOfRange(i64),
    /// Text that names no grade
    #[error("Unrecognized grade: {0}")]
    Unrecognized(String),
}

/// Recall quality reported for a reviewed card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Grade {
    /// Not recalled
    Bad = 0,
    /// Recalled with effort
    Medium = 1,
    /// Recalled easily
    Good = 2,
}

impl Grade {
    /// All grades, worst first
    pub const ALL: [Grade; 3] = [Grade::Bad, Grade::Medium, Grade::Good];

    /// Numeric value (0, 1 or 2)
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// True for grades that count as a successful recall
    pub fn is_pass(self) -> bool {
        self >= Grade::Medium
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Bad => "bad",
            Grade::Medium => "medium",
            Grade::Good => "good",
        }
    }
}

impl TryFrom<i64> for Grade {
    type Error = GradeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Grade::Bad),
            1 => Ok(Grade::Medium),
            2 => Ok(Grade::Good),
            other => Err(GradeError::OutOfRange(other)),
        }
    }
}

impl From<Grade> for i64 {
    fn from(grade: Grade) -> Self {
        grade.as_i64()
    }
}

impl std::str::FromStr for Grade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Grade::try_from(value);
        }
        match trimmed.to_lowercase().as_str() {
            "bad" | "b" => Ok(Grade::Bad),
            "medium" | "m" => Ok(Grade::Medium),
            "good" | "g" => Ok(Grade::Good),
            _ => Err(GradeError::Unrecognized(s.to_string())),
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
