use serde::Serialize;
use serde::de::DeserializeOwned;

use livefile_base::LivefileResult;

use super::{Format, serialize_error, shape_error, syntax_error};

/// Strict JSON, written pretty-printed with two-space indentation and a trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl<T> Format<T> for JsonFormat
where
    T: Serialize + DeserializeOwned,
{
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, text: &str) -> LivefileResult<T> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| syntax_error("JSON", e))?;
        serde_json::from_value(value).map_err(|e| shape_error("JSON", e))
    }

    fn stringify(&self, value: &T) -> LivefileResult<String> {
        let mut text = serde_json::to_string_pretty(value).map_err(|e| serialize_error("JSON", e))?;
        text.push('\n');
        Ok(text)
    }
}
