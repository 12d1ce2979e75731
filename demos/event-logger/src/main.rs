//! Event Logger Example
//!
//! Prints one line per Sensu event to stdout, as text or JSON.
//!
//! Every option can come from a flag, an environment variable, or a check or
//! entity annotation under `sensu.io/plugins/event-logger/config/`:
//!
//! | Flag             | Env                        | Annotation path |
//! |------------------|----------------------------|-----------------|
//! | `--format`, `-f` | `EVENT_LOGGER_FORMAT`      | `format`        |
//! | `--min-status`   | `EVENT_LOGGER_MIN_STATUS`  | `min-status`    |
//! | `--annotations`  | `EVENT_LOGGER_ANNOTATIONS` | `annotations`   |
//!
//! # Usage
//!
//! ```bash
//! echo '{"timestamp":1,"entity":{"metadata":{"name":"web-01"}},"check":{"metadata":{"name":"disk"},"status":2}}' \
//!     | cargo run --package event-logger -- --format json
//! ```

use anyhow::{Result, bail};
use sensu_plugin::prelude::*;
use serde_json::json;

const KEYSPACE: &str = "sensu.io/plugins/event-logger/config";

/// Slots read by the callbacks.
#[derive(Clone, Default)]
struct Settings {
    format: Slot<String>,
    min_status: Slot<u64>,
    annotations: Slot<bool>,
}

impl Settings {
    fn options(&self) -> Vec<HandlerConfigOption> {
        vec![
            HandlerConfigOption::new("format", "text")
                .shorthand('f')
                .env("EVENT_LOGGER_FORMAT")
                .path("format")
                .usage("Output format, text or json")
                .bind(&self.format),
            HandlerConfigOption::new("min-status", 0u64)
                .env("EVENT_LOGGER_MIN_STATUS")
                .path("min-status")
                .usage("Skip events whose check status is lower")
                .bind(&self.min_status),
            HandlerConfigOption::new("annotations", false)
                .env("EVENT_LOGGER_ANNOTATIONS")
                .path("annotations")
                .usage("Include check annotations in the output")
                .bind(&self.annotations),
        ]
    }
}

fn validate(settings: &Settings) -> Result<()> {
    let format = settings.format.value_or_default();
    if format != "text" && format != "json" {
        bail!("unknown format {format:?}, expected text or json");
    }
    Ok(())
}

/// Renders the output line, or `None` when the event is below the threshold.
fn render(settings: &Settings, event: &Event) -> Result<Option<String>> {
    let Some(check) = &event.check else {
        bail!("event has no check");
    };
    if u64::from(check.status) < settings.min_status.value_or_default() {
        debug!(status = check.status, "Below minimum status, skipping");
        return Ok(None);
    }

    let line = if settings.format.value_or_default() == "json" {
        let mut value = json!({
            "timestamp": event.timestamp,
            "event": event.summary(),
            "state": check.state().as_str(),
            "output": check.output.trim_end(),
        });
        if settings.annotations.value_or_default() {
            value["annotations"] = json!(check.annotations());
        }
        serde_json::to_string(&value)?
    } else {
        let mut line = format!(
            "{} {} [{}] {}",
            event.timestamp,
            event.summary(),
            check.state(),
            check.output.trim_end()
        );
        if settings.annotations.value_or_default() {
            let mut pairs: Vec<_> = check.annotations().iter().collect();
            pairs.sort();
            for (key, value) in pairs {
                line.push_str(&format!(" {key}={value}"));
            }
        }
        line
    };
    Ok(Some(line))
}

fn main() -> ExitCode {
    let settings = Settings::default();
    let config = HandlerConfig::new("event-logger", "Prints a line for each Sensu event")
        .keyspace(KEYSPACE);

    let for_validate = settings.clone();
    let for_execute = settings.clone();
    let handler = Handler::new(
        config,
        settings.options(),
        move |_event| validate(&for_validate).map_err(Into::into),
        move |event| {
            if let Some(line) = render(&for_execute, event)? {
                println!("{line}");
            }
            Ok(())
        },
    );

    run(handler)
}
