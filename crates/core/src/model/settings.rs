use thiserror::Error;

/// Key of the singleton global earnings goal setting.
pub const GLOBAL_GOAL_KEY: &str = "global_goal";

/// Goal applied when no global goal has been stored yet.
pub const DEFAULT_GLOBAL_GOAL: f64 = 5000.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("global goal must be a positive number")]
    InvalidGlobalGoal,
}

/// Unvalidated global goal update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalGoalDraft {
    pub global_goal: f64,
}

impl GlobalGoalDraft {
    /// Validate the draft into a usable goal value.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidGlobalGoal` unless the goal is a
    /// positive finite number.
    pub fn validate(self) -> Result<f64, SettingsError> {
        if !self.global_goal.is_finite() || self.global_goal <= 0.0 {
            return Err(SettingsError::InvalidGlobalGoal);
        }
        Ok(self.global_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_positive_goal() {
        let goal = GlobalGoalDraft { global_goal: 8000.0 }.validate().unwrap();
        assert!((goal - 8000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_zero_negative_and_nan() {
        for bad in [0.0, -5.0, f64::NAN] {
            let err = GlobalGoalDraft { global_goal: bad }.validate().unwrap_err();
            assert_eq!(err, SettingsError::InvalidGlobalGoal);
        }
    }
}
