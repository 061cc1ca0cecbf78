//! Yes/No flag normalisation for interactive input.

use super::FeatureError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A flag as typed by a user: a boolean, a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FlagValue {
    /// Map the flag to 0 or 1.
    ///
    /// | input | value |
    /// |-------|-------|
    /// | `Yes`, `yes`, `Y`, `true`, `True`, `1`, boolean `true`, number 1 | 1 |
    /// | `No`, `no`, `N`, `false`, `False`, `0`, boolean `false`, number 0 | 0 |
    ///
    /// Anything else is [`FeatureError::InvalidFlag`].
    pub fn normalize(&self, field: &'static str) -> Result<f64, FeatureError> {
        let value = match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Number(n) if *n == 1.0 => Some(true),
            FlagValue::Number(n) if *n == 0.0 => Some(false),
            FlagValue::Number(_) => None,
            FlagValue::Text(text) => match text.trim() {
                "Yes" | "yes" | "Y" | "true" | "True" | "1" => Some(true),
                "No" | "no" | "N" | "false" | "False" | "0" => Some(false),
                _ => None,
            },
        };

        value
            .map(|b| if b { 1.0 } else { 0.0 })
            .ok_or_else(|| FeatureError::InvalidFlag {
                field,
                value: self.to_string(),
            })
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Number(n) => write!(f, "{}", n),
            FlagValue::Text(text) => write!(f, "{:?}", text),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

/// Display form of a 0/1 flag.
pub fn yes_no(value: f64) -> &'static str {
    if value == 1.0 {
        "Yes"
    } else {
        "No"
    }
}
