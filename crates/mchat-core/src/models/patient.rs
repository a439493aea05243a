use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::age::age_in_months;
use crate::error::CoreError;

/// Role of the person administering the screening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ExaminerPosition {
    Director,
    Manager,
    #[default]
    Teacher,
    Specialist,
}

impl ExaminerPosition {
    pub const ALL: [ExaminerPosition; 4] = [
        ExaminerPosition::Director,
        ExaminerPosition::Manager,
        ExaminerPosition::Teacher,
        ExaminerPosition::Specialist,
    ];

    /// Short lowercase name accepted by [`FromStr`].
    pub fn key(self) -> &'static str {
        match self {
            ExaminerPosition::Director => "director",
            ExaminerPosition::Manager => "manager",
            ExaminerPosition::Teacher => "teacher",
            ExaminerPosition::Specialist => "specialist",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExaminerPosition::Director => "Director / Deputy Director",
            ExaminerPosition::Manager => "Manager",
            ExaminerPosition::Teacher => "Teacher",
            ExaminerPosition::Specialist => "Specialist",
        }
    }
}

impl fmt::Display for ExaminerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExaminerPosition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|position| position.key() == key)
            .ok_or(CoreError::InvalidAnswer(key))
    }
}

/// Identifying information entered alongside the questionnaire.
///
/// Age is not stored; it is derived from `birth_date` and `test_date` on
/// demand so it can never disagree with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PatientInfo {
    #[serde(default = "today")]
    pub test_date: jiff::civil::Date,
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub home_name: String,
    #[serde(default)]
    pub birth_date: Option<jiff::civil::Date>,
    #[serde(default)]
    pub examiner_name: String,
    #[serde(default)]
    pub examiner_position: ExaminerPosition,
}

fn today() -> jiff::civil::Date {
    jiff::Zoned::now().date()
}

impl PatientInfo {
    /// Blank patient record dated `test_date`.
    pub fn new(test_date: jiff::civil::Date) -> Self {
        Self {
            test_date,
            child_name: String::new(),
            home_name: String::new(),
            birth_date: None,
            examiner_name: String::new(),
            examiner_position: ExaminerPosition::default(),
        }
    }

    /// Age in whole months at `test_date`, or 0 without a birth date.
    pub fn age_in_months(&self) -> u32 {
        self.birth_date
            .map(|birth| age_in_months(birth, self.test_date))
            .unwrap_or(0)
    }
}
