//! Write-once value slots.
//!
//! A [`Slot<T>`] is a shared handle to a cell that can be written exactly
//! once. The caller keeps one handle to read the resolved value (typically
//! from inside the handler callbacks) and binds an [`ErasedSlot`] to a
//! [`HandlerConfigOption`](crate::HandlerConfigOption). The resolver writes
//! through the erased handle; the option's kind is inferred from `T`.
//!
//! ```rust,ignore
//! let timeout = Slot::<u64>::new();
//! let option = HandlerConfigOption::new("timeout", 30u64).bind(&timeout);
//!
//! // ... after resolution
//! let secs = timeout.value_or_default();
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{OptionError, OptionResult};
use crate::value::{OptionValue, ValueKind};

/// Shared write-once cell for one resolved option value.
pub struct Slot<T> {
    cell: Arc<OnceLock<T>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            cell: Arc::new(OnceLock::new()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&self.cell.get()).finish()
    }
}

impl<T: Send + Sync + 'static> Slot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the written value, or `None` if nothing was written.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns `true` once a value has been written.
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns a copy of the written value, or the zero value of `T`.
    pub fn value_or_default(&self) -> T
    where
        T: Clone + Default,
    {
        self.cell.get().cloned().unwrap_or_default()
    }

    /// Returns a type-erased handle to the same cell.
    pub fn erase(&self) -> ErasedSlot {
        ErasedSlot {
            cell: self.cell.clone() as Arc<dyn Any + Send + Sync>,
            type_name: type_name::<T>(),
        }
    }
}

/// Type-erased handle to a [`Slot<T>`].
#[derive(Clone)]
pub struct ErasedSlot {
    cell: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl fmt::Debug for ErasedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedSlot")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl<T: Send + Sync + 'static> From<&Slot<T>> for ErasedSlot {
    fn from(slot: &Slot<T>) -> Self {
        slot.erase()
    }
}

impl ErasedSlot {
    /// Name of the concrete type behind this slot.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Kind of value this slot accepts, or `None` for unsupported types.
    pub fn kind(&self) -> Option<ValueKind> {
        if self.cell.is::<OnceLock<String>>() {
            Some(ValueKind::String)
        } else if self.cell.is::<OnceLock<u64>>() {
            Some(ValueKind::Uint64)
        } else if self.cell.is::<OnceLock<bool>>() {
            Some(ValueKind::Bool)
        } else {
            None
        }
    }

    /// Returns `true` once a value has been written.
    pub fn is_set(&self) -> bool {
        match self.kind() {
            Some(ValueKind::String) => self.is_cell_set::<String>(),
            Some(ValueKind::Uint64) => self.is_cell_set::<u64>(),
            Some(ValueKind::Bool) => self.is_cell_set::<bool>(),
            None => false,
        }
    }

    /// Writes `value` into the slot on behalf of option `argument`.
    pub(crate) fn store(&self, argument: &str, value: OptionValue) -> OptionResult<()> {
        let Some(kind) = self.kind() else {
            return Err(OptionError::UnsupportedType {
                argument: argument.to_string(),
                type_name: self.type_name,
            });
        };
        if kind != value.kind() {
            return Err(OptionError::DefaultTypeMismatch {
                argument: argument.to_string(),
                expected: kind,
                found: value.kind(),
            });
        }

        match value {
            OptionValue::String(v) => self.set_cell(argument, v),
            OptionValue::Uint64(v) => self.set_cell(argument, v),
            OptionValue::Bool(v) => self.set_cell(argument, v),
        }
    }

    fn is_cell_set<T: Send + Sync + 'static>(&self) -> bool {
        self.cell
            .downcast_ref::<OnceLock<T>>()
            .is_some_and(|cell| cell.get().is_some())
    }

    fn set_cell<T: Send + Sync + 'static>(&self, argument: &str, value: T) -> OptionResult<()> {
        let cell = self
            .cell
            .downcast_ref::<OnceLock<T>>()
            .ok_or_else(|| OptionError::UnsupportedType {
                argument: argument.to_string(),
                type_name: self.type_name,
            })?;
        cell.set(value).map_err(|_| OptionError::SlotAlreadySet {
            argument: argument.to_string(),
        })
    }
}
