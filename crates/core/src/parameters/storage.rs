//! Parameter Storage Types
//!
//! Provides the `ParameterStore` used for spray configuration and the
//! `ParamSource` trait through which the controller reads parameters.
//! Values are read fresh at every use; nothing in the controller caches them.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length (MAVLink param_id is 16 chars)
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters (power of two for the index map)
pub const MAX_PARAMS: usize = 16;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Parameter is read-only (cannot be modified via `set`)
        const READ_ONLY = 0b0000_0001;
    }
}

/// Parameter value types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Boolean parameter
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit floating point
    Float(f32),
}

impl ParamValue {
    /// Integer view of the value; floats are truncated toward zero.
    pub fn as_int(&self) -> i32 {
        match *self {
            ParamValue::Bool(v) => v as i32,
            ParamValue::Int(v) => v,
            ParamValue::Float(v) => v as i32,
        }
    }

    fn same_type(&self, other: &ParamValue) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

/// Read access to external parameter storage.
pub trait ParamSource {
    /// Current value of `name`, if registered.
    fn param(&self, name: &str) -> Option<ParamValue>;

    /// Current value of `name` as an integer, if registered.
    fn param_int(&self, name: &str) -> Option<i32> {
        self.param(name).map(|value| value.as_int())
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: ParamValue,
    flags: ParamFlags,
}

/// Parameter store for configuration management
///
/// Stores parameters as key-value pairs with flags. Persistence, if any,
/// is the hosting runtime's concern; `is_dirty` tells it when to save.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    entries: FnvIndexMap<String<PARAM_NAME_LEN>, Entry, MAX_PARAMS>,
    dirty: bool,
}

fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
    let mut key = String::new();
    key.push_str(name)
        .map_err(|_| ParameterError::UnknownParameter)?;
    Ok(key)
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            dirty: false,
        }
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let key = key(name).ok()?;
        self.entries.get(&key).map(|entry| entry.value)
    }

    /// Set parameter value
    ///
    /// The value must have the same type as the registered default.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = key(name)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(ParameterError::UnknownParameter)?;

        if entry.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        if !entry.value.same_type(&value) {
            return Err(ParameterError::TypeMismatch);
        }

        entry.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Register a new parameter with default value and flags
    ///
    /// If the parameter already exists, this is a no-op (idempotent).
    pub fn register(
        &mut self,
        name: &str,
        default_value: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = key(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }

        self.entries
            .insert(
                key,
                Entry {
                    value: default_value,
                    flags,
                },
            )
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Iterate over all parameters as (name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.value))
    }

    /// Number of registered parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if store has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear dirty flag (called after a successful save)
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSource for ParameterStore {
    fn param(&self, name: &str) -> Option<ParamValue> {
        self.get(name)
    }
}
