//! Parameter Storage Types
//!
//! Named, typed tunables for the landing subsystem. Values are read into
//! typed parameter groups between landing attempts; persistence is the
//! firmware's concern.

use super::error::ParameterError;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length (MAVLink PARAM_VALUE limit)
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 64;

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
    /// Numeric view of any value type
    pub fn as_f32(&self) -> f32 {
        match self {
            ParamValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            ParamValue::Int(v) => *v as f32,
            ParamValue::Float(v) => *v,
        }
    }

    /// Integer view; floats are truncated
    pub fn as_i32(&self) -> i32 {
        match self {
            ParamValue::Bool(b) => *b as i32,
            ParamValue::Int(v) => *v,
            ParamValue::Float(v) => *v as i32,
        }
    }
}

/// Parameter store for configuration management
pub struct ParameterStore {
    parameters: FnvIndexMap<String<PARAM_NAME_LEN>, ParamValue, MAX_PARAMS>,
}

impl ParameterStore {
    /// Create a new empty parameter store
    pub fn new() -> Self {
        Self {
            parameters: FnvIndexMap::new(),
        }
    }

    fn key(name: &str) -> Result<String<PARAM_NAME_LEN>, ParameterError> {
        let mut key = String::<PARAM_NAME_LEN>::new();
        key.push_str(name)
            .map_err(|_| ParameterError::NameTooLong)?;
        Ok(key)
    }

    /// Get parameter value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let key = Self::key(name).ok()?;
        self.parameters.get(&key)
    }

    /// Numeric value of a parameter, if registered
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.get(name).map(ParamValue::as_f32)
    }

    /// Set the value of a registered parameter
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;

        match self.parameters.get_mut(&key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ParameterError::Unknown),
        }
    }

    /// Register a new parameter with its default value
    ///
    /// If the parameter already exists, this is a no-op (idempotent).
    pub fn register(&mut self, name: &str, default_value: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;

        if self.parameters.contains_key(&key) {
            return Ok(());
        }

        self.parameters
            .insert(key, default_value)
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a float parameter clamped to `[min, max]`, or `default` if absent
pub(crate) fn read_f32(store: &ParameterStore, name: &str, default: f32, min: f32, max: f32) -> f32 {
    match store.get(name) {
        Some(ParamValue::Bool(_)) | None => default,
        Some(value) => {
            let v = value.as_f32();
            if v.is_finite() {
                v.clamp(min, max)
            } else {
                default
            }
        }
    }
}

/// Read an integer parameter clamped to `[min, max]`, or `default` if absent
pub(crate) fn read_i32(store: &ParameterStore, name: &str, default: i32, min: i32, max: i32) -> i32 {
    match store.get(name) {
        Some(value) => value.as_i32().clamp(min, max),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_store_register_and_get() {
        let mut store = ParameterStore::new();
        store.register("LAND_TYPE", ParamValue::Int(0)).unwrap();
        assert_eq!(store.get("LAND_TYPE"), Some(&ParamValue::Int(0)));
    }

    #[test]
    fn test_parameter_store_set_unknown() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("UNKNOWN", ParamValue::Int(1)),
            Err(ParameterError::Unknown)
        );
    }

    #[test]
    fn test_parameter_store_name_too_long() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.register("LAND_DS_MUCH_TOO_LONG", ParamValue::Int(1)),
            Err(ParameterError::NameTooLong)
        );
    }

    #[test]
    fn test_parameter_store_register_idempotent() {
        let mut store = ParameterStore::new();
        store.register("LAND_FLARE_ALT", ParamValue::Float(3.0)).unwrap();
        store.set("LAND_FLARE_ALT", ParamValue::Float(5.0)).unwrap();
        store.register("LAND_FLARE_ALT", ParamValue::Float(3.0)).unwrap();
        assert_eq!(store.get("LAND_FLARE_ALT"), Some(&ParamValue::Float(5.0)));
    }

    #[test]
    fn test_parameter_store_full() {
        let mut store = ParameterStore::new();
        let mut name = String::<PARAM_NAME_LEN>::new();
        for i in 0..MAX_PARAMS {
            name.clear();
            core::fmt::write(&mut name, format_args!("P{}", i)).unwrap();
            store.register(&name, ParamValue::Int(i as i32)).unwrap();
        }
        assert_eq!(store.len(), MAX_PARAMS);
        assert_eq!(
            store.register("ONE_MORE", ParamValue::Int(0)),
            Err(ParameterError::StoreFull)
        );
    }

    #[test]
    fn test_read_helpers_clamp_and_default() {
        let mut store = ParameterStore::new();
        store.register("F", ParamValue::Float(50.0)).unwrap();
        store.register("I", ParamValue::Float(7.9)).unwrap();
        assert_eq!(read_f32(&store, "F", 1.0, 0.0, 10.0), 10.0);
        assert_eq!(read_f32(&store, "MISSING", 1.0, 0.0, 10.0), 1.0);
        assert_eq!(read_i32(&store, "I", 0, 0, 100), 7);
    }
}
