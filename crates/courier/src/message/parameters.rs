use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::MessageError;

/// Key/value payload carried by requests and successful replies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    /// Builds an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set with `key` assigned.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Assigns `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no key is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::MissingParameter`] when the key is absent.
    pub fn get_value(&self, key: &str) -> Result<&Value, MessageError> {
        self.0
            .get(key)
            .ok_or_else(|| MessageError::missing_parameter(key))
    }

    /// Returns a string parameter.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is absent or not a string.
    pub fn get_string(&self, key: &str) -> Result<&str, MessageError> {
        self.get_value(key)?
            .as_str()
            .ok_or_else(|| MessageError::parameter_type(key, "a string"))
    }

    /// Returns an unsigned integer parameter.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is absent or not a non-negative integer.
    pub fn get_u64(&self, key: &str) -> Result<u64, MessageError> {
        self.get_value(key)?
            .as_u64()
            .ok_or_else(|| MessageError::parameter_type(key, "an unsigned integer"))
    }

    /// Returns a signed integer parameter.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is absent or not an integer.
    pub fn get_i64(&self, key: &str) -> Result<i64, MessageError> {
        self.get_value(key)?
            .as_i64()
            .ok_or_else(|| MessageError::parameter_type(key, "an integer"))
    }

    /// Returns a boolean parameter.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is absent or not a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool, MessageError> {
        self.get_value(key)?
            .as_bool()
            .ok_or_else(|| MessageError::parameter_type(key, "a boolean"))
    }

    /// Returns a nested parameter set.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is absent or not an object.
    pub fn get_parameters(&self, key: &str) -> Result<Self, MessageError> {
        self.get_value(key)?
            .as_object()
            .map(|object| Self(object.clone()))
            .ok_or_else(|| MessageError::parameter_type(key, "an object"))
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Parameters> for Value {
    fn from(parameters: Parameters) -> Self {
        Self::Object(parameters.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn sample() -> Parameters {
        Parameters::new()
            .with("name", "orders")
            .with("count", 3)
            .with("offset", -2)
            .with("enabled", true)
            .with("filter", json!({"topic": "transfer"}))
    }

    #[test]
    fn typed_getters_read_values() {
        let parameters = sample();
        assert_eq!(parameters.get_string("name").expect("name"), "orders");
        assert_eq!(parameters.get_u64("count").expect("count"), 3);
        assert_eq!(parameters.get_i64("offset").expect("offset"), -2);
        assert!(parameters.get_bool("enabled").expect("enabled"));
        let filter = parameters.get_parameters("filter").expect("filter");
        assert_eq!(filter.get_string("topic").expect("topic"), "transfer");
    }

    #[test]
    fn missing_key_is_reported() {
        let error = sample().get_string("absent").expect_err("missing");
        assert!(matches!(error, MessageError::MissingParameter { ref key } if key == "absent"));
    }

    #[rstest]
    #[case::string_as_number("name")]
    #[case::negative_as_unsigned("offset")]
    #[case::object_as_number("filter")]
    fn wrong_type_is_reported(#[case] key: &str) {
        let error = sample().get_u64(key).expect_err("type mismatch");
        assert!(matches!(error, MessageError::ParameterType { .. }));
    }

    #[test]
    fn set_replaces_existing_value() {
        let mut parameters = Parameters::new().with("n", 1);
        parameters.set("n", 2);
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters.get_u64("n").expect("n"), 2);
    }
}
