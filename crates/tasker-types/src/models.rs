use serde::{Deserialize, Serialize};

/// Account role. Teachers author courses; students subscribe and submit
/// solutions. Assigned at registration and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
}

impl UserRole {
    pub fn code(self) -> i64 {
        match self {
            UserRole::Student => 0,
            UserRole::Teacher => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(UserRole::Student),
            1 => Some(UserRole::Teacher),
            _ => None,
        }
    }

    pub fn is_teacher(self) -> bool {
        matches!(self, UserRole::Teacher)
    }
}

/// Grading state of a submitted solution. New and resubmitted solutions sit
/// in `Waiting` until the course teacher marks them; a marked solution can
/// be re-marked at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionStatus {
    Waiting,
    Incorrect,
    Correct,
}

impl SolutionStatus {
    pub fn code(self) -> i64 {
        match self {
            SolutionStatus::Waiting => 1,
            SolutionStatus::Incorrect => 2,
            SolutionStatus::Correct => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SolutionStatus::Waiting),
            2 => Some(SolutionStatus::Incorrect),
            3 => Some(SolutionStatus::Correct),
            _ => None,
        }
    }

    pub fn from_is_correct(is_correct: bool) -> Self {
        if is_correct {
            SolutionStatus::Correct
        } else {
            SolutionStatus::Incorrect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_codes_roundtrip() {
        for role in [UserRole::Student, UserRole::Teacher] {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
        assert_eq!(UserRole::from_code(7), None);
    }

    #[test]
    fn status_codes_roundtrip() {
        for status in [
            SolutionStatus::Waiting,
            SolutionStatus::Incorrect,
            SolutionStatus::Correct,
        ] {
            assert_eq!(SolutionStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SolutionStatus::from_code(0), None);
    }

    #[test]
    fn role_serializes_as_lowercase_name() {
        let json = serde_json::to_string(&UserRole::Teacher).unwrap();
        assert_eq!(json, "\"teacher\"");
        let back: UserRole = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(back, UserRole::Student);
    }
}
