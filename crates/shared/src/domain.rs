use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseStatusError;

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id_newtype!(ControlId);

/// Category a control belongs to. Serialized as its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlArea {
    Firewalls,
    #[serde(rename = "Secure Configuration")]
    SecureConfiguration,
    #[serde(rename = "User Access Control")]
    UserAccessControl,
    #[serde(rename = "Malware Protection")]
    MalwareProtection,
    #[serde(rename = "Patch Management")]
    PatchManagement,
}

impl ControlArea {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Firewalls => "Firewalls",
            Self::SecureConfiguration => "Secure Configuration",
            Self::UserAccessControl => "User Access Control",
            Self::MalwareProtection => "Malware Protection",
            Self::PatchManagement => "Patch Management",
        }
    }
}

impl fmt::Display for ControlArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlStatus {
    #[default]
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In progress")]
    InProgress,
    Done,
}

impl ControlStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Done => "Done",
        }
    }

    /// Checklist marker used in the handoff message.
    pub fn marker(self) -> &'static str {
        match self {
            Self::NotStarted => "[ ]",
            Self::InProgress => "[~]",
            Self::Done => "[✓]",
        }
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ControlStatus {
    type Err = ParseStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "not started" | "todo" => Ok(Self::NotStarted),
            "in progress" | "wip" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseStatusError {
                input: raw.to_string(),
            }),
        }
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlDefinition {
    pub id: &'static str,
    pub area: ControlArea,
    pub label: &'static str,
}

impl ControlDefinition {
    pub fn initial_state(&self) -> ControlState {
        ControlState {
            id: ControlId::from(self.id),
            area: self.area,
            label: self.label.to_string(),
            status: ControlStatus::NotStarted,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub id: ControlId,
    pub area: ControlArea,
    pub label: String,
    pub status: ControlStatus,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub email: String,
}

/// Complete persisted and exported unit of state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSnapshot {
    pub company: CompanyInfo,
    pub controls: Vec<ControlState>,
}

impl ReadinessSnapshot {
    pub fn control(&self, id: &str) -> Option<&ControlState> {
        self.controls.iter().find(|control| control.id == id)
    }

    pub fn control_mut(&mut self, id: &str) -> Option<&mut ControlState> {
        self.controls.iter_mut().find(|control| control.id == id)
    }

    pub fn count_with_status(&self, status: ControlStatus) -> usize {
        self.controls
            .iter()
            .filter(|control| control.status == status)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessMetrics {
    pub done: usize,
    pub total: usize,
    pub percent: u8,
}

impl ReadinessMetrics {
    /// Rounds half up using integer arithmetic. `total` must be non-zero.
    pub fn new(done: usize, total: usize) -> Self {
        let done = done.min(total);
        let percent = if total == 0 {
            0
        } else {
            (done * 200 + total) / (2 * total)
        };
        Self {
            done,
            total,
            percent: percent as u8,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}/{} controls complete ({}%)",
            self.done, self.total, self.percent
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub not_started: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusBreakdown {
    pub fn count(&self, status: ControlStatus) -> usize {
        match status {
            ControlStatus::NotStarted => self.not_started,
            ControlStatus::InProgress => self.in_progress,
            ControlStatus::Done => self.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&ControlStatus::InProgress).expect("encode");
        assert_eq!(json, "\"In progress\"");
        let parsed: ControlStatus = serde_json::from_str("\"Not started\"").expect("decode");
        assert_eq!(parsed, ControlStatus::NotStarted);
    }

    #[test]
    fn unknown_status_value_is_not_representable() {
        assert!(serde_json::from_str::<ControlStatus>("\"Blocked\"").is_err());
    }

    #[test]
    fn parses_cli_status_aliases() {
        assert_eq!(
            "in-progress".parse::<ControlStatus>().expect("parse"),
            ControlStatus::InProgress
        );
        assert_eq!(
            "NOT_STARTED".parse::<ControlStatus>().expect("parse"),
            ControlStatus::NotStarted
        );
        assert_eq!(
            "Done".parse::<ControlStatus>().expect("parse"),
            ControlStatus::Done
        );
        assert!("finished".parse::<ControlStatus>().is_err());
    }

    #[test]
    fn area_serializes_as_display_name() {
        let json = serde_json::to_string(&ControlArea::PatchManagement).expect("encode");
        assert_eq!(json, "\"Patch Management\"");
    }

    #[test]
    fn metrics_round_half_up() {
        assert_eq!(ReadinessMetrics::new(1, 8).percent, 13);
        assert_eq!(ReadinessMetrics::new(1, 200).percent, 1);
        assert_eq!(ReadinessMetrics::new(1, 3).percent, 33);
        assert_eq!(ReadinessMetrics::new(2, 3).percent, 67);
    }

    #[test]
    fn metrics_stay_within_bounds_for_every_count() {
        for total in 1..=64 {
            assert_eq!(ReadinessMetrics::new(0, total).percent, 0);
            assert_eq!(ReadinessMetrics::new(total, total).percent, 100);
            for done in 0..=total {
                let metrics = ReadinessMetrics::new(done, total);
                let exact = done as f64 * 100.0 / total as f64;
                assert!(
                    (f64::from(metrics.percent) - exact).abs() <= 0.5 + 1e-9,
                    "done={done} total={total}"
                );
                assert!(metrics.percent <= 100);
            }
        }
    }

    #[test]
    fn summary_string_matches_export_format() {
        assert_eq!(
            ReadinessMetrics::new(3, 10).summary(),
            "3/10 controls complete (30%)"
        );
    }
}
