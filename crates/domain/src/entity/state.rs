//! Entity state — the hub's state string, with the common values made explicit.

use serde::{Deserialize, Serialize};

/// Operational state of an entity as reported by the hub.
///
/// The hub transports states as free-form strings (`"on"`, `"21.5"`,
/// `"playing"`, …). The well-known values get their own variant, everything
/// else is kept verbatim in [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
    Other(String),
}

impl EntityState {
    /// Whether the entity is reachable (anything but [`Unavailable`](Self::Unavailable)).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for EntityState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            "unknown" => Self::Unknown,
            "unavailable" => Self::Unavailable,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for EntityState {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<EntityState> for String {
    fn from(state: EntityState) -> Self {
        match state {
            EntityState::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_unavailable_when_state_is_unavailable() {
        assert!(!EntityState::Unavailable.is_available());
        assert!(EntityState::Unknown.is_available());
    }

    #[test]
    fn should_default_to_unknown() {
        assert_eq!(EntityState::default(), EntityState::Unknown);
    }

    #[test]
    fn should_parse_known_states() {
        assert_eq!(EntityState::from("on"), EntityState::On);
        assert_eq!(EntityState::from("off"), EntityState::Off);
        assert_eq!(EntityState::from("unavailable"), EntityState::Unavailable);
    }

    #[test]
    fn should_keep_free_form_state_verbatim() {
        let state = EntityState::from("21.5");
        assert_eq!(state, EntityState::Other("21.5".to_string()));
        assert_eq!(state.to_string(), "21.5");
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let json = serde_json::to_string(&EntityState::On).unwrap();
        assert_eq!(json, "\"on\"");
        let parsed: EntityState = serde_json::from_str("\"playing\"").unwrap();
        assert_eq!(parsed, EntityState::Other("playing".to_string()));
    }
}
