//! Monitoring event model.
//!
//! # Hierarchy
//!
//! ```text
//! Event { timestamp, id }
//! ├── entity: Entity { entity_class, subscriptions }
//! │   └── metadata: ObjectMeta { name, namespace, labels, annotations }
//! └── check: Check { command, interval, status, output, ... }
//!     └── metadata: ObjectMeta { name, namespace, labels, annotations }
//! ```
//!
//! Every field except the structural ones checked by
//! [`validate_event`](crate::validate_event) is optional on the wire and
//! falls back to its default. Unknown fields are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Reads `null` as the default value, the way Sensu's Go encoder writes
/// empty maps and slices.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// ObjectMeta
// ============================================================================

/// Identity and free-form metadata shared by entities and checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMeta {
    /// Object name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Namespace the object lives in.
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: String,
    /// Labels used for filtering.
    #[serde(deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
    /// Annotations, the source of per-event handler configuration.
    #[serde(deserialize_with = "null_as_default")]
    pub annotations: HashMap<String, String>,
}

impl ObjectMeta {
    /// Creates metadata with the given name and nothing else.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Looks up a single annotation.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

// ============================================================================
// Entity
// ============================================================================

/// The node an event originates from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    /// Entity metadata (name, annotations, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,
    /// Entity class, e.g. `agent` or `proxy`.
    #[serde(deserialize_with = "null_as_default")]
    pub entity_class: String,
    /// Subscriptions of the entity.
    #[serde(deserialize_with = "null_as_default")]
    pub subscriptions: Vec<String>,
}

impl Entity {
    /// Creates an entity with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            ..Default::default()
        }
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Entity annotations.
    pub fn annotations(&self) -> &HashMap<String, String> {
        &self.metadata.annotations
    }
}

// ============================================================================
// Check
// ============================================================================

/// The check that produced an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Check {
    /// Check metadata (name, annotations, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub metadata: ObjectMeta,
    /// Command line the check executed.
    #[serde(deserialize_with = "null_as_default")]
    pub command: String,
    /// Scheduling interval in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub interval: u32,
    /// Exit status of the check (0 ok, 1 warning, 2 critical, other unknown).
    #[serde(deserialize_with = "null_as_default")]
    pub status: u32,
    /// Output produced by the check.
    #[serde(deserialize_with = "null_as_default")]
    pub output: String,
    /// Unix time the check was issued.
    #[serde(deserialize_with = "null_as_default")]
    pub issued: i64,
    /// Unix time the check was executed.
    #[serde(deserialize_with = "null_as_default")]
    pub executed: i64,
    /// Handlers the event is routed to.
    #[serde(deserialize_with = "null_as_default")]
    pub handlers: Vec<String>,
}

impl Check {
    /// Creates a check with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            ..Default::default()
        }
    }

    /// Check name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Check annotations.
    pub fn annotations(&self) -> &HashMap<String, String> {
        &self.metadata.annotations
    }

    /// Interprets the exit status.
    pub fn state(&self) -> CheckState {
        match self.status {
            0 => CheckState::Ok,
            1 => CheckState::Warning,
            2 => CheckState::Critical,
            _ => CheckState::Unknown,
        }
    }
}

/// Conventional interpretation of a check exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl CheckState {
    /// Returns the state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CheckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event
// ============================================================================

/// One monitoring observation handed to a handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Unix timestamp of the event. Zero when absent.
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
    /// Event identifier, if the producer assigned one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Originating entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
    /// Originating check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<Check>,
}

impl Event {
    /// Creates an event with the given timestamp, entity and check.
    pub fn new(timestamp: i64, entity: Entity, check: Check) -> Self {
        Self {
            timestamp,
            id: None,
            entity: Some(entity),
            check: Some(check),
        }
    }

    /// Returns `true` if the event carries an entity.
    pub fn has_entity(&self) -> bool {
        self.entity.is_some()
    }

    /// Returns `true` if the event carries a check.
    pub fn has_check(&self) -> bool {
        self.check.is_some()
    }

    /// Short `entity/check` label for log lines.
    pub fn summary(&self) -> String {
        let entity = self.entity.as_ref().map(Entity::name).unwrap_or("-");
        let check = self.check.as_ref().map(Check::name).unwrap_or("-");
        format!("{entity}/{check}")
    }

    /// Validates the structure of this event.
    ///
    /// See [`validate_event`](crate::validate_event).
    pub fn validate(&self) -> crate::EventResult<()> {
        crate::validate_event(Some(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_event() {
        let json = r#"{
            "timestamp": 1573495200,
            "entity": {
                "entity_class": "agent",
                "metadata": {
                    "name": "node-1",
                    "namespace": "default",
                    "annotations": { "team": "ops" }
                },
                "subscriptions": ["linux"]
            },
            "check": {
                "metadata": { "name": "check-cpu" },
                "command": "check-cpu.sh",
                "status": 2,
                "output": "CPU at 99%",
                "handlers": ["slack"],
                "unknown_field": true
            }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.timestamp, 1573495200);

        let entity = event.entity.as_ref().unwrap();
        assert_eq!(entity.name(), "node-1");
        assert_eq!(entity.entity_class, "agent");
        assert_eq!(entity.metadata.annotation("team"), Some("ops"));

        let check = event.check.as_ref().unwrap();
        assert_eq!(check.name(), "check-cpu");
        assert!(check.annotations().is_empty());
        assert_eq!(check.state(), CheckState::Critical);
        assert_eq!(check.handlers, vec!["slack".to_string()]);

        assert_eq!(event.summary(), "node-1/check-cpu");
    }

    #[test]
    fn test_missing_fields_default() {
        let event: Event = serde_json::from_str("{}").unwrap();
        assert_eq!(event.timestamp, 0);
        assert!(!event.has_entity());
        assert!(!event.has_check());
        assert_eq!(event.summary(), "-/-");
    }

    #[test]
    fn test_null_fields_default() {
        let json = r#"{
            "timestamp": null,
            "id": null,
            "entity": {
                "metadata": { "name": "node-1", "labels": null, "annotations": null },
                "entity_class": null,
                "subscriptions": null
            },
            "check": {
                "metadata": { "name": "check-cpu", "annotations": null },
                "status": null,
                "output": null,
                "handlers": null
            }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.timestamp, 0);

        let entity = event.entity.as_ref().unwrap();
        assert!(entity.annotations().is_empty());
        assert!(entity.metadata.labels.is_empty());
        assert!(entity.subscriptions.is_empty());

        let check = event.check.as_ref().unwrap();
        assert_eq!(check.name(), "check-cpu");
        assert!(check.annotations().is_empty());
        assert!(check.handlers.is_empty());
        assert_eq!(check.state(), CheckState::Ok);
    }

    #[test]
    fn test_null_entity_and_check() {
        let event: Event =
            serde_json::from_str(r#"{"timestamp": 1, "entity": null, "check": null}"#).unwrap();
        assert!(!event.has_entity());
        assert!(!event.has_check());
    }

    #[test]
    fn test_check_state() {
        let mut check = Check::new("disk");
        assert_eq!(check.state(), CheckState::Ok);
        check.status = 1;
        assert_eq!(check.state().to_string(), "warning");
        check.status = 127;
        assert_eq!(check.state(), CheckState::Unknown);
    }
}
