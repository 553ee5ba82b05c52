use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Input,
    Output,
}

impl AssetKind {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "input" => Some(AssetKind::Input),
            "output" => Some(AssetKind::Output),
            _ => None,
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            AssetKind::Input => "input",
            AssetKind::Output => "output",
        };
        write!(f, "{}", kind)
    }
}
