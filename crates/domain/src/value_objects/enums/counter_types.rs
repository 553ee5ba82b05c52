use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The two usage tiers tracked per user. Minute windows are checked before day
/// windows wherever both apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CounterType {
    PerMinute,
    PerDay,
}

impl CounterType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "per_minute" => Some(CounterType::PerMinute),
            "per_day" => Some(CounterType::PerDay),
            _ => None,
        }
    }
}

impl Display for CounterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counter_type = match self {
            CounterType::PerMinute => "per_minute",
            CounterType::PerDay => "per_day",
        };
        write!(f, "{}", counter_type)
    }
}
