use livefile_base::LivefileResult;

use super::Format;

/// Plain text: the file content is the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl Format<String> for TextFormat {
    fn name(&self) -> &'static str {
        "text"
    }

    fn parse(&self, text: &str) -> LivefileResult<String> {
        Ok(text.to_string())
    }

    fn stringify(&self, value: &String) -> LivefileResult<String> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_identity() {
        let text = "  line one\nline two without newline";
        let parsed = TextFormat.parse(text).unwrap();
        assert_eq!(parsed, text);
        assert_eq!(TextFormat.stringify(&parsed).unwrap(), text);
    }

    #[test]
    fn test_text_preserve_is_stringify() {
        let out = TextFormat
            .preserve_format("old", &"old".to_string(), &"new".to_string())
            .unwrap();
        assert_eq!(out, "new");
    }
}
