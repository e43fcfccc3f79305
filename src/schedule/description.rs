//! Declarative encounter descriptions
//!
//! This is the caller-facing input format. It deserializes from JSON or
//! TOML; see `EncounterDescription::load`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::Millis;

/// A complete encounter: time window plus declared actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncounterDescription {
    /// Shortest the encounter can last
    #[serde(default)]
    pub min_time_millis: Millis,
    /// Longest the encounter can last
    #[serde(default)]
    pub max_time_millis: Millis,
    #[serde(default)]
    pub events: Vec<DeclaredAction>,
}

/// One declared action, tagged by `kind`
///
/// Only `Spawn` carries fields the simulator acts on. The remaining kinds
/// are accepted so descriptions round-trip, but produce no events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclaredAction {
    Spawn(SpawnAction),
    Movement(LooseAction),
    #[serde(alias = "lust")]
    Bloodlust(LooseAction),
    #[serde(alias = "crowd_control")]
    Stun(LooseAction),
    #[serde(alias = "damage_over_time")]
    Damage(LooseAction),
    #[serde(alias = "invuln")]
    Invulnerability(LooseAction),
    /// Any kind this build does not know about
    #[serde(other)]
    Unknown,
}

impl DeclaredAction {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DeclaredAction::Spawn(_) => "spawn",
            DeclaredAction::Movement(_) => "movement",
            DeclaredAction::Bloodlust(_) => "bloodlust",
            DeclaredAction::Stun(_) => "stun",
            DeclaredAction::Damage(_) => "damage",
            DeclaredAction::Invulnerability(_) => "invulnerability",
            DeclaredAction::Unknown => "unknown",
        }
    }

    /// Declared timestamp, if the kind carries one
    pub fn timestamp(&self) -> Option<Millis> {
        match self {
            DeclaredAction::Spawn(spawn) => Some(spawn.timestamp_millis),
            DeclaredAction::Movement(a)
            | DeclaredAction::Bloodlust(a)
            | DeclaredAction::Stun(a)
            | DeclaredAction::Damage(a)
            | DeclaredAction::Invulnerability(a) => Some(a.timestamp_millis),
            DeclaredAction::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnAction {
    #[serde(default)]
    pub timestamp_millis: Millis,
    pub enemy: EnemySpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub health_estimator: HealthSelector,
}

/// Payload of a kind with no implemented effect; only the timestamp is read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LooseAction {
    #[serde(default)]
    pub timestamp_millis: Millis,
}

/// Requested health curve preset, as written by the caller
///
/// Parsing never fails: anything that is not a known preset name, including
/// numbers and `null`, is kept verbatim in `Unrecognized` and resolved by the
/// schedule builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSelector", into = "String")]
pub enum HealthSelector {
    Uniform,
    Burst,
    Execute,
    BurstAndExecute,
    Unrecognized(String),
}

impl Default for HealthSelector {
    fn default() -> Self {
        HealthSelector::Unrecognized(String::new())
    }
}

impl From<String> for HealthSelector {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().replace('-', "_").as_str() {
            "uniform" => HealthSelector::Uniform,
            "burst" => HealthSelector::Burst,
            "execute" => HealthSelector::Execute,
            "burst_and_execute" => HealthSelector::BurstAndExecute,
            _ => HealthSelector::Unrecognized(raw),
        }
    }
}

/// Any scalar a caller might write for a preset
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Name(String),
    Other(serde_json::Value),
}

impl From<RawSelector> for HealthSelector {
    fn from(raw: RawSelector) -> Self {
        match raw {
            RawSelector::Name(name) => HealthSelector::from(name),
            RawSelector::Other(value) => HealthSelector::Unrecognized(value.to_string()),
        }
    }
}

impl From<&str> for HealthSelector {
    fn from(raw: &str) -> Self {
        HealthSelector::from(raw.to_string())
    }
}

impl From<HealthSelector> for String {
    fn from(selector: HealthSelector) -> Self {
        match selector {
            HealthSelector::Uniform => "uniform".to_string(),
            HealthSelector::Burst => "burst".to_string(),
            HealthSelector::Execute => "execute".to_string(),
            HealthSelector::BurstAndExecute => "burst_and_execute".to_string(),
            HealthSelector::Unrecognized(raw) => raw,
        }
    }
}

impl EncounterDescription {
    pub fn new(min_time_millis: Millis, max_time_millis: Millis) -> Self {
        Self {
            min_time_millis,
            max_time_millis,
            events: Vec::new(),
        }
    }

    /// Builder-style helper for declaring a spawn
    pub fn with_spawn(
        mut self,
        timestamp_millis: Millis,
        name: impl Into<String>,
        health_estimator: impl Into<HealthSelector>,
    ) -> Self {
        self.events.push(DeclaredAction::Spawn(SpawnAction {
            timestamp_millis,
            enemy: EnemySpec {
                name: name.into(),
                health_estimator: health_estimator.into(),
            },
        }));
        self
    }

    pub fn with_action(mut self, action: DeclaredAction) -> Self {
        self.events.push(action);
        self
    }

    /// Reject descriptions that cannot be simulated meaningfully
    ///
    /// The window must satisfy `min <= max`, and no spawn may be scheduled
    /// past `max`, since it could never fire.
    pub fn validate(&self) -> Result<()> {
        if self.max_time_millis < self.min_time_millis {
            return Err(SimError::InvalidTimeWindow {
                min: self.min_time_millis,
                max: self.max_time_millis,
            });
        }
        for (index, action) in self.events.iter().enumerate() {
            if let DeclaredAction::Spawn(spawn) = action {
                if spawn.timestamp_millis > self.max_time_millis {
                    return Err(SimError::EventOutsideWindow {
                        index,
                        timestamp: spawn.timestamp_millis,
                        max: self.max_time_millis,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a description from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_description() {
        let json = r#"{
            "min_time_millis": 0,
            "max_time_millis": 10000,
            "events": [
                { "kind": "spawn", "timestamp_millis": 500,
                  "enemy": { "name": "Boss", "health_estimator": "uniform" } },
                { "kind": "movement", "timestamp_millis": 700, "distance": 12 },
                { "kind": "lust", "timestamp_millis": 0 },
                { "kind": "teleport", "timestamp_millis": 900 }
            ]
        }"#;
        let desc = EncounterDescription::from_json_str(json).unwrap();
        assert_eq!(desc.max_time_millis, 10000);
        assert_eq!(desc.events.len(), 4);
        match &desc.events[0] {
            DeclaredAction::Spawn(spawn) => {
                assert_eq!(spawn.timestamp_millis, 500);
                assert_eq!(spawn.enemy.name, "Boss");
                assert_eq!(spawn.enemy.health_estimator, HealthSelector::Uniform);
            }
            other => panic!("expected spawn, got {:?}", other),
        }
        assert_eq!(desc.events[1].kind_name(), "movement");
        assert_eq!(desc.events[2].kind_name(), "bloodlust");
        assert_eq!(desc.events[3], DeclaredAction::Unknown);
    }

    #[test]
    fn test_parse_toml_description() {
        let toml_str = r#"
            min_time_millis = 180000
            max_time_millis = 300000

            [[events]]
            kind = "spawn"
            timestamp_millis = 0
            enemy = { name = "Boss", health_estimator = "burst-and-execute" }

            [[events]]
            kind = "crowd_control"
            timestamp_millis = 60000
        "#;
        let desc = EncounterDescription::from_toml_str(toml_str).unwrap();
        assert_eq!(desc.min_time_millis, 180000);
        assert_eq!(desc.events[1].kind_name(), "stun");
        match &desc.events[0] {
            DeclaredAction::Spawn(spawn) => {
                assert_eq!(spawn.enemy.health_estimator, HealthSelector::BurstAndExecute)
            }
            other => panic!("expected spawn, got {:?}", other),
        }
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(HealthSelector::from("Uniform"), HealthSelector::Uniform);
        assert_eq!(HealthSelector::from("EXECUTE"), HealthSelector::Execute);
        assert_eq!(
            HealthSelector::from("sawtooth"),
            HealthSelector::Unrecognized("sawtooth".to_string())
        );
        assert_eq!(String::from(HealthSelector::Burst), "burst");
    }

    #[test]
    fn test_missing_selector_is_unrecognized() {
        let json = r#"{ "events": [ { "kind": "spawn", "enemy": { "name": "Add" } } ] }"#;
        let desc = EncounterDescription::from_json_str(json).unwrap();
        match &desc.events[0] {
            DeclaredAction::Spawn(spawn) => assert!(matches!(
                spawn.enemy.health_estimator,
                HealthSelector::Unrecognized(_)
            )),
            other => panic!("expected spawn, got {:?}", other),
        }
    }

    fn selector_in(json_value: &str) -> HealthSelector {
        let json = format!(
            r#"{{ "events": [ {{ "kind": "spawn", "enemy": {{ "name": "Add", "health_estimator": {} }} }} ] }}"#,
            json_value
        );
        match EncounterDescription::from_json_str(&json).unwrap().events.remove(0) {
            DeclaredAction::Spawn(spawn) => spawn.enemy.health_estimator,
            other => panic!("expected spawn, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_selector_is_unrecognized() {
        assert_eq!(selector_in("7"), HealthSelector::Unrecognized("7".to_string()));
        assert_eq!(selector_in("null"), HealthSelector::Unrecognized("null".to_string()));
        assert_eq!(selector_in("2.5"), HealthSelector::Unrecognized("2.5".to_string()));
        assert_eq!(selector_in("\"execute\""), HealthSelector::Execute);
    }

    #[test]
    fn test_numeric_selector_in_toml() {
        let toml_str = r#"
            [[events]]
            kind = "spawn"
            enemy = { name = "Add", health_estimator = 3 }
        "#;
        let desc = EncounterDescription::from_toml_str(toml_str).unwrap();
        match &desc.events[0] {
            DeclaredAction::Spawn(spawn) => assert_eq!(
                spawn.enemy.health_estimator,
                HealthSelector::Unrecognized("3".to_string())
            ),
            other => panic!("expected spawn, got {:?}", other),
        }
    }

    #[test]
    fn test_validate() {
        assert!(EncounterDescription::new(0, 0).validate().is_ok());
        assert!(EncounterDescription::new(0, 1000)
            .with_spawn(1000, "Boss", "uniform")
            .validate()
            .is_ok());

        assert!(matches!(
            EncounterDescription::new(5000, 1000).validate(),
            Err(SimError::InvalidTimeWindow { min: 5000, max: 1000 })
        ));
        assert!(matches!(
            EncounterDescription::new(0, 1000)
                .with_spawn(0, "Boss", "uniform")
                .with_spawn(1001, "Late", "uniform")
                .validate(),
            Err(SimError::EventOutsideWindow { index: 1, timestamp: 1001, .. })
        ));
    }
}
