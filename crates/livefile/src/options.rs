use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// Predicate that gates the value read on open. Returning `false` rejects the value.
pub type Validator<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Options for opening a live file.
///
/// The flags can be loaded from an application's own configuration file; the validator
/// can only be set in code.
///
/// ```
/// use livefile::Options;
///
/// let options: Options<Vec<String>> = toml::from_str("allow_no_exist = false").unwrap();
/// assert!(!options.allow_no_exist);
/// assert!(!options.allow_validator_failure);
/// ```
#[derive(Deserialize)]
#[serde(default, bound = "")]
pub struct Options<T> {
    #[serde(skip)]
    pub validator: Option<Validator<T>>,
    /// Treat a missing file as "no data yet" instead of an error.
    pub allow_no_exist: bool,
    /// Treat a rejected value as "no data" instead of an error.
    pub allow_validator_failure: bool,
}

impl<T> Options<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, validator: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_allow_no_exist(mut self, allow_no_exist: bool) -> Self {
        self.allow_no_exist = allow_no_exist;
        self
    }

    pub fn with_allow_validator_failure(mut self, allow_validator_failure: bool) -> Self {
        self.allow_validator_failure = allow_validator_failure;
        self
    }

    /// Returns `true` if there is no validator or the validator accepts `value`.
    pub(crate) fn accepts(&self, value: &T) -> bool {
        self.validator.as_ref().is_none_or(|validator| validator(value))
    }
}

impl<T> Default for Options<T> {
    fn default() -> Self {
        Self {
            validator: None,
            allow_no_exist: true,
            allow_validator_failure: false,
        }
    }
}

impl<T> Clone for Options<T> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            allow_no_exist: self.allow_no_exist,
            allow_validator_failure: self.allow_validator_failure,
        }
    }
}

impl<T> fmt::Debug for Options<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("allow_no_exist", &self.allow_no_exist)
            .field("allow_validator_failure", &self.allow_validator_failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::<String>::default();
        assert!(options.validator.is_none());
        assert!(options.allow_no_exist);
        assert!(!options.allow_validator_failure);
        assert!(options.accepts(&"anything".to_string()));
    }

    #[test]
    fn test_builder() {
        let options = Options::<u32>::new()
            .with_validator(|n| *n < 10)
            .with_allow_no_exist(false)
            .with_allow_validator_failure(true);
        assert!(options.accepts(&3));
        assert!(!options.accepts(&30));
        assert!(!options.allow_no_exist);
        assert!(options.allow_validator_failure);
        assert!(!options.clone().accepts(&30));
    }

    #[test]
    fn test_deserialize_partial() {
        let options: Options<u32> = serde_json::from_str(r#"{"allow_validator_failure": true}"#).unwrap();
        assert!(options.allow_no_exist);
        assert!(options.allow_validator_failure);
        assert!(options.validator.is_none());
    }

    #[test]
    fn test_debug() {
        let options = Options::<u32>::new().with_validator(|_| true);
        assert_eq!(
            format!("{:?}", options),
            "Options { validator: Some(\"<fn>\"), allow_no_exist: true, allow_validator_failure: false }"
        );
    }
}
