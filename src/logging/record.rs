//! Log record types
//!
//! `LogRecord` is the unit handed to every destination.

use super::format::format_message;
use super::{CallSite, Severity};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Error object attached to a record, kept as the raw value (not stringified)
#[derive(Debug, Clone)]
pub struct ErrorValue {
    inner: Arc<dyn Error + Send + Sync>,
    type_name: &'static str,
}

impl ErrorValue {
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Borrow the underlying error
    pub fn get(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Human-readable description, falling back to `TypeName()` when the
    /// error's `Display` output is empty
    pub fn description(&self) -> String {
        let text = self.inner.to_string();
        if text.is_empty() {
            format!("{}()", short_type_name(self.type_name))
        } else {
            text
        }
    }
}

impl<E> From<E> for ErrorValue
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// `a::b::Thing<c::D>` -> `Thing`
fn short_type_name(full: &str) -> &str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// One emitted log call, as seen by destinations
///
/// Created per call and immutable; destinations receive it by reference and
/// clone it if they need it past the call.
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: Severity,
    category: String,
    message: String,
    event: Option<String>,
    error: Option<ErrorValue>,
}

impl LogRecord {
    /// Build a record, formatting `message` with the event, error and call-site tag
    pub fn new(
        level: Severity,
        category: impl Into<String>,
        message: &str,
        event: Option<String>,
        error: Option<ErrorValue>,
        site: &CallSite,
    ) -> Self {
        let message = format_message(message, event.as_deref(), error.as_ref(), site);
        Self {
            level,
            category: category.into(),
            message,
            event,
            error,
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Fully formatted message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw event tag, if one was supplied
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Raw error object, if one was supplied
    pub fn error(&self) -> Option<&ErrorValue> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Silent;

    impl fmt::Display for Silent {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }
    }

    impl Error for Silent {}

    #[test]
    fn test_description_uses_display() {
        let err = ErrorValue::new(std::io::Error::other("disk full"));
        assert_eq!(err.description(), "disk full");
    }

    #[test]
    fn test_description_falls_back_to_type_name() {
        let err = ErrorValue::from(Silent);
        assert_eq!(err.description(), "Silent()");
    }

    #[test]
    fn test_short_type_name_drops_generics() {
        assert_eq!(short_type_name("a::b::Wrapper<c::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_error_is_kept_raw() {
        let site = CallSite::new("src/lib.rs", "run()");
        let record = LogRecord::new(
            Severity::Error,
            "net",
            "send failed",
            None,
            Some(ErrorValue::new(std::fmt::Error)),
            &site,
        );

        let err = record.error().unwrap();
        assert!(err.downcast_ref::<std::fmt::Error>().is_some());
        assert_eq!(record.category(), "net");
        assert_eq!(record.level(), Severity::Error);
    }
}
