use serde::Serialize;
use serde::de::DeserializeOwned;

use livefile_base::LivefileResult;

use super::{Format, serialize_error, shape_error, syntax_error};

/// TOML documents. The top level must be a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl<T> Format<T> for TomlFormat
where
    T: Serialize + DeserializeOwned,
{
    fn name(&self) -> &'static str {
        "TOML"
    }

    fn parse(&self, text: &str) -> LivefileResult<T> {
        let table: toml::Table = toml::from_str(text).map_err(|e| syntax_error("TOML", e))?;
        toml::Value::Table(table)
            .try_into()
            .map_err(|e| shape_error("TOML", e))
    }

    fn stringify(&self, value: &T) -> LivefileResult<String> {
        toml::to_string(value).map_err(|e| serialize_error("TOML", e))
    }
}
