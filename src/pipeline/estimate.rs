use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::first_present;

/// Hair tone classes the upstream estimator reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HairTone {
    Black,
    DarkBrown,
    MediumBrown,
    LightBrown,
    Blonde,
    Auburn,
    Red,
    Grey,
    Unknown,
}

impl HairTone {
    pub fn parse(tone: &str) -> Self {
        match tone.trim().to_ascii_lowercase().as_str() {
            "black" => Self::Black,
            "dark_brown" => Self::DarkBrown,
            "medium_brown" => Self::MediumBrown,
            "light_brown" => Self::LightBrown,
            "blonde" => Self::Blonde,
            "auburn" => Self::Auburn,
            "red" => Self::Red,
            "grey" | "gray" => Self::Grey,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBrown => "dark brown",
            Self::MediumBrown => "medium brown",
            Self::LightBrown => "light brown",
            Self::Blonde => "blonde",
            Self::Auburn => "auburn",
            Self::Red => "red",
            Self::Grey => "grey",
            Self::Unknown => "unknown",
        }
    }
}

/// What the image estimator said about the photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HairEstimate {
    pub tone: Option<HairTone>,
    pub hair_hex: Option<String>,
}

impl HairEstimate {
    /// An estimate that only carries a color.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self {
            tone: None,
            hair_hex: Some(hex.into()),
        }
    }

    /// Pick `tone` and `hair_hex` (or `hairHex`) out of an estimator reply.
    /// Missing or non-string values are treated as absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        let string = |keys: &[&str]| match first_present(map, keys) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Self {
            tone: string(&["tone"]).map(|tone| HairTone::parse(&tone)),
            hair_hex: string(&["hair_hex", "hairHex"]),
        }
    }

    /// Parse an estimator reply. Text that is not JSON yields an empty
    /// estimate rather than an error.
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                warn!("estimate is not valid JSON ({err}), treating it as empty");
                Self::default()
            }
        }
    }

    /// Read an estimator reply from a file, or from stdin when `path` is `-`.
    pub fn read(path: &Path) -> Result<Self> {
        let text = if path == Path::new("-") {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read estimate from stdin")?;
            text
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read estimate: {}", path.display()))?
        };
        Ok(Self::from_json_str(&text))
    }
}
