/* 📖 # Why is every format just an implementation of one trait?

The handle only needs "text to value" on open and "value (plus the original text) to text"
on close. Putting that behind the Format trait keeps the handle free of format special cases:
the comment-preserving JSON dialect is an ordinary implementation that overrides
`preserve_format`, and caller-supplied formats plug in through CustomFormat.
*/

mod custom;
mod json;
pub mod jsonc;
mod text;
mod toml;
mod yaml;

pub use custom::CustomFormat;
pub use json::JsonFormat;
pub use jsonc::JsoncFormat;
pub use text::TextFormat;
pub use self::toml::TomlFormat;
pub use yaml::YamlFormat;

use livefile_base::{ErrorKind, LivefileError, LivefileResult};

/// Textual codec for one serialization format.
///
/// Implementations are stateless and may be shared between handles.
pub trait Format<T>: Send + Sync {
    /// Short name used in diagnostics, e.g. `"JSON"`.
    fn name(&self) -> &'static str;

    /// Parse file content into a value.
    ///
    /// Malformed text must be reported as [`ErrorKind::Syntax`]. Well-formed text that does
    /// not fit `T` is reported as [`ErrorKind::Shape`], which the handle treats like a
    /// validator rejection.
    fn parse(&self, text: &str) -> LivefileResult<T>;

    /// Serialize a value from scratch.
    fn stringify(&self, value: &T) -> LivefileResult<String>;

    /// Serialize `new_value`, keeping as much of `old_text` as the format can.
    ///
    /// `old_value` is what `old_text` parsed to. Formats without structure preservation
    /// keep this default, which is a plain [`Format::stringify`].
    fn preserve_format(&self, old_text: &str, old_value: &T, new_value: &T) -> LivefileResult<String> {
        let _ = (old_text, old_value);
        self.stringify(new_value)
    }
}

pub(crate) fn syntax_error(format: &'static str, error: impl std::fmt::Display) -> Box<LivefileError> {
    Box::new(LivefileError::new(ErrorKind::Syntax {
        format,
        message: error.to_string(),
    }))
}

pub(crate) fn shape_error(format: &'static str, error: impl std::fmt::Display) -> Box<LivefileError> {
    Box::new(LivefileError::new(ErrorKind::Shape {
        format,
        message: error.to_string(),
    }))
}

pub(crate) fn serialize_error(format: &'static str, error: impl std::fmt::Display) -> Box<LivefileError> {
    livefile_base::err!("Failed to serialize {}: {}", format, error)
}
