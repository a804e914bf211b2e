use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a strict parse of one of the enums below fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// How the scheduler may place work on agents created from a template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UsageMode {
    /// Use the agent as much as possible.
    #[default]
    Normal,
    /// Only run jobs whose label expression matches the agent.
    Exclusive,
}

impl UsageMode {
    pub const ALL: [UsageMode; 2] = [UsageMode::Normal, UsageMode::Exclusive];

    /// Human-readable description, also accepted as input.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            UsageMode::Normal => "Use this node as much as possible",
            UsageMode::Exclusive => "Only build jobs with label expressions matching this node",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UsageMode::Normal => "NORMAL",
            UsageMode::Exclusive => "EXCLUSIVE",
        }
    }

    /// Case-insensitive match against mode names and descriptions.
    /// Anything unrecognised falls back to [`UsageMode::Normal`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|m| raw.eq_ignore_ascii_case(m.as_str()) || raw.eq_ignore_ascii_case(m.description()))
            .unwrap_or_default()
    }
}

/// How the controller connects to a freshly provisioned agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LaunchMethod {
    /// Controller opens an interactive shell session to the VM.
    #[default]
    #[serde(rename = "SSH")]
    Ssh,
    /// Agent process on the VM calls back to the controller.
    #[serde(rename = "JNLP")]
    Jnlp,
}

impl LaunchMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LaunchMethod::Ssh => "SSH",
            LaunchMethod::Jnlp => "JNLP",
        }
    }

    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for LaunchMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SSH" => Ok(LaunchMethod::Ssh),
            "JNLP" => Ok(LaunchMethod::Jnlp),
            _ => Err(ParseEnumError {
                kind: "launch method",
                value: s.to_string(),
                expected: "SSH, JNLP",
            }),
        }
    }
}

/// Guest operating system family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OsType {
    #[default]
    Linux,
    Windows,
}

impl OsType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OsType::Linux => "Linux",
            OsType::Windows => "Windows",
        }
    }

    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for OsType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_trim = s.trim();
        if s_trim.eq_ignore_ascii_case("linux") {
            Ok(OsType::Linux)
        } else if s_trim.eq_ignore_ascii_case("windows") {
            Ok(OsType::Windows)
        } else {
            Err(ParseEnumError {
                kind: "OS type",
                value: s.to_string(),
                expected: "Linux, Windows",
            })
        }
    }
}

/// Storage account redundancy tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum StorageSku {
    #[default]
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
}

impl StorageSku {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StorageSku::StandardLrs => "Standard_LRS",
            StorageSku::PremiumLrs => "Premium_LRS",
        }
    }

    /// Blank or unknown input resolves to the standard tier.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for StorageSku {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_trim = s.trim();
        if s_trim.eq_ignore_ascii_case("Standard_LRS") {
            Ok(StorageSku::StandardLrs)
        } else if s_trim.eq_ignore_ascii_case("Premium_LRS") {
            Ok(StorageSku::PremiumLrs)
        } else {
            Err(ParseEnumError {
                kind: "storage account type",
                value: s.to_string(),
                expected: "Standard_LRS, Premium_LRS",
            })
        }
    }
}

/// Stage of the agent lifecycle at which a provisioning failure was observed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The deployment request itself failed.
    Provisioning,
    /// The VM was created but failed afterwards (init script, launch).
    PostProvisioning,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Provisioning => write!(f, "provisioning"),
            FailureStage::PostProvisioning => write!(f, "post-provisioning"),
        }
    }
}
