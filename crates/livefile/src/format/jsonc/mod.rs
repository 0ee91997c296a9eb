/* 📖 # What does the JSON-with-comments format preserve?

Files in this dialect are hand-edited: they carry `//` and `/* */` comments, trailing commas
and a key order that people care about. On write, only the top-level keys that actually
changed are rewritten in the original text (see edit.rs); nested changes replace the whole
value under their top-level key. A whitespace tidy-up pass then removes blank lines and
trailing spaces left behind by deletions.
*/

mod edit;
mod normalize;
mod scanner;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use livefile_base::LivefileResult;

use super::{Format, serialize_error, shape_error, syntax_error};
use crate::format::JsonFormat;

/// JSON with comments and trailing commas, written back with comment preservation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsoncFormat;

impl JsoncFormat {
    /// Parse JSON-with-comments text into an untyped value.
    pub fn parse_value(text: &str) -> LivefileResult<Value> {
        let tokens = scanner::tokenize(text)?;
        let plain = scanner::to_plain_json(text, &tokens)?;
        serde_json::from_str(&plain).map_err(|e| syntax_error("JSONC", e))
    }

    /// Rewrite the top-level keys of `old_text` so that it represents `new`.
    ///
    /// Returns `None` when either side is not an object, in which case there is no key
    /// structure to preserve.
    pub fn update_text(old_text: &str, old: &Value, new: &Value) -> LivefileResult<Option<String>> {
        let (Value::Object(old), Value::Object(new)) = (old, new) else {
            return Ok(None);
        };
        let tokens = scanner::tokenize(old_text)?;
        let Some(edits) = edit::compute_edits(old_text, &tokens, old, new)? else {
            return Ok(None);
        };
        debug!(edit_count = edits.len(), "applying top-level edits");
        let edited = edit::apply_edits(old_text, edits)?;
        let eol = edit::detect_line_ending(old_text);
        Ok(Some(normalize::normalize_whitespace(&edited, eol)))
    }
}

impl<T> Format<T> for JsoncFormat
where
    T: Serialize + DeserializeOwned,
{
    fn name(&self) -> &'static str {
        "JSONC"
    }

    fn parse(&self, text: &str) -> LivefileResult<T> {
        let value = Self::parse_value(text)?;
        serde_json::from_value(value).map_err(|e| shape_error("JSONC", e))
    }

    fn stringify(&self, value: &T) -> LivefileResult<String> {
        JsonFormat.stringify(value)
    }

    fn preserve_format(&self, old_text: &str, old_value: &T, new_value: &T) -> LivefileResult<String> {
        let old = serde_json::to_value(old_value).map_err(|e| serialize_error("JSONC", e))?;
        let new = serde_json::to_value(new_value).map_err(|e| serialize_error("JSONC", e))?;
        match Self::update_text(old_text, &old, &new)? {
            Some(text) => Ok(text),
            None => {
                debug!("root is not an object, writing without preservation");
                Format::<T>::stringify(self, new_value)
            }
        }
    }
}
