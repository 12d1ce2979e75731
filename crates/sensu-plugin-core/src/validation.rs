//! Structural validation of incoming events.

use tracing::debug;

use crate::error::{EventError, EventResult};
use crate::event::Event;

/// Validates that an event carries everything a handler relies on.
///
/// Rules are checked in order and the first violation is returned:
///
/// 1. the event is present
/// 2. the timestamp is greater than zero
/// 3. an entity is present
/// 4. the entity name is not empty
/// 5. a check is present
/// 6. the check name is not empty
///
/// Annotations are never required.
pub fn validate_event(event: Option<&Event>) -> EventResult<()> {
    let result = check_structure(event);
    if let Err(e) = &result {
        debug!(error = %e, "Event failed validation");
    }
    result
}

fn check_structure(event: Option<&Event>) -> EventResult<()> {
    let event = event.ok_or(EventError::Missing)?;

    if event.timestamp <= 0 {
        return Err(EventError::InvalidTimestamp);
    }

    let entity = event.entity.as_ref().ok_or(EventError::MissingEntity)?;
    if entity.name().is_empty() {
        return Err(EventError::InvalidEntityName);
    }

    let check = event.check.as_ref().ok_or(EventError::MissingCheck)?;
    if check.name().is_empty() {
        return Err(EventError::InvalidCheckName);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Check, Entity};

    fn valid_event() -> Event {
        Event::new(1573495200, Entity::new("node-1"), Check::new("check-cpu"))
    }

    #[test]
    fn test_valid_event() {
        assert_eq!(validate_event(Some(&valid_event())), Ok(()));
        assert_eq!(valid_event().validate(), Ok(()));
    }

    #[test]
    fn test_missing_event() {
        let err = validate_event(None).unwrap_err();
        assert_eq!(err, EventError::Missing);
        assert_eq!(err.to_string(), "event is missing");
    }

    #[test]
    fn test_timestamp() {
        let mut event = valid_event();
        event.timestamp = 0;
        let err = event.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "timestamp is missing or must be greater than zero"
        );

        event.timestamp = -5;
        assert_eq!(event.validate(), Err(EventError::InvalidTimestamp));
    }

    #[test]
    fn test_entity_rules() {
        let mut event = valid_event();
        event.entity = None;
        assert_eq!(
            event.validate().unwrap_err().to_string(),
            "entity is missing from event"
        );

        event.entity = Some(Entity::new(""));
        assert_eq!(
            event.validate().unwrap_err().to_string(),
            "entity name must not be empty"
        );
    }

    #[test]
    fn test_check_rules() {
        let mut event = valid_event();
        event.check = None;
        assert_eq!(
            event.validate().unwrap_err().to_string(),
            "check is missing from event"
        );

        event.check = Some(Check::new(""));
        assert_eq!(
            event.validate().unwrap_err().to_string(),
            "check name must not be empty"
        );
    }

    #[test]
    fn test_rule_order() {
        // Everything is wrong: the timestamp is reported first.
        let event = Event::default();
        assert_eq!(event.validate(), Err(EventError::InvalidTimestamp));

        // Entity rules win over check rules.
        let event = Event {
            timestamp: 1,
            entity: Some(Entity::new("")),
            ..Default::default()
        };
        assert_eq!(event.validate(), Err(EventError::InvalidEntityName));

        let event = Event {
            timestamp: 1,
            entity: Some(Entity::new("node-1")),
            check: Some(Check::new("")),
            ..Default::default()
        };
        assert_eq!(event.validate(), Err(EventError::InvalidCheckName));
    }

    #[test]
    fn test_annotations_not_required() {
        let json = r#"{
            "timestamp": 10,
            "entity": { "metadata": { "name": "node-1" } },
            "check": { "metadata": { "name": "check-cpu", "annotations": {} } }
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.validate(), Ok(()));
    }
}
