//! # Sensu Plugin Core
//!
//! Event model and structural validation shared by every crate of the
//! Sensu plugin toolkit.
//!
//! - **Event model**: [`Event`], [`Entity`], [`Check`], [`ObjectMeta`]
//! - **Validation**: [`validate_event`] and [`EventError`]
//!
//! ```rust,ignore
//! use sensu_plugin_core::Event;
//!
//! let event: Event = serde_json::from_slice(&bytes)?;
//! event.validate()?;
//! println!("{}", event.summary());
//! ```

pub mod error;
pub mod event;
pub mod validation;

pub use error::{EventError, EventResult};
pub use event::{Check, CheckState, Entity, Event, ObjectMeta};
pub use validation::validate_event;
