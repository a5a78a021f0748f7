use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Canonical term enumeration. The catalog service addresses terms by
/// numeric code (1 = Winter, 2 = Fall); display labels live in one place
/// here rather than inline at call sites. An unknown code is an error, not a
/// "Semester {n}" fallback: the enumeration is closed and a stray code means
/// schema drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Semester {
    Winter,
    Fall,
}

impl Semester {
    /// Option table for term pickers, in display order.
    pub const ALL: [Semester; 2] = [Semester::Winter, Semester::Fall];

    pub fn from_code(code: i32) -> Result<Self, CatalogError> {
        match code {
            1 => Ok(Semester::Winter),
            2 => Ok(Semester::Fall),
            other => Err(CatalogError::UnknownSemester(other)),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Semester::Winter => 1,
            Semester::Fall => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Semester::Winter => "Winter",
            Semester::Fall => "Fall",
        }
    }
}

impl TryFrom<i32> for Semester {
    type Error = CatalogError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Semester::from_code(code)
    }
}

impl From<Semester> for i32 {
    fn from(semester: Semester) -> i32 {
        semester.code()
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
