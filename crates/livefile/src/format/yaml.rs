use serde::Serialize;
use serde::de::DeserializeOwned;

use livefile_base::LivefileResult;

use super::{Format, serialize_error, shape_error, syntax_error};

/// YAML documents (single document per file).
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl<T> Format<T> for YamlFormat
where
    T: Serialize + DeserializeOwned,
{
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn parse(&self, text: &str) -> LivefileResult<T> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| syntax_error("YAML", e))?;
        serde_yaml::from_value(value).map_err(|e| shape_error("YAML", e))
    }

    fn stringify(&self, value: &T) -> LivefileResult<String> {
        serde_yaml::to_string(value).map_err(|e| serialize_error("YAML", e))
    }
}
