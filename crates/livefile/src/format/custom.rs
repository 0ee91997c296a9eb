use std::fmt;

use livefile_base::LivefileResult;

use super::Format;

type ParseFn<T> = Box<dyn Fn(&str) -> LivefileResult<T> + Send + Sync>;
type StringifyFn<T> = Box<dyn Fn(&T) -> LivefileResult<String> + Send + Sync>;
type PreserveFn<T> = Box<dyn Fn(&str, &T, &T) -> LivefileResult<String> + Send + Sync>;

/// A format assembled from caller-supplied functions.
///
/// Parse failures should be reported as [`livefile_base::ErrorKind::Syntax`] so the handle
/// can tell them apart from shape errors; any other error kind is treated as a parse failure
/// as well.
///
/// # Examples
///
/// ```
/// use livefile::{CustomFormat, Format};
///
/// let lines = CustomFormat::new(
///     "lines",
///     |text: &str| Ok(text.lines().map(str::to_string).collect::<Vec<_>>()),
///     |lines: &Vec<String>| Ok(lines.join("\n")),
/// );
/// assert_eq!(lines.parse("a\nb").unwrap(), vec!["a", "b"]);
/// ```
pub struct CustomFormat<T> {
    name: &'static str,
    parse: ParseFn<T>,
    stringify: StringifyFn<T>,
    preserve: Option<PreserveFn<T>>,
}

impl<T> CustomFormat<T> {
    pub fn new(
        name: &'static str,
        parse: impl Fn(&str) -> LivefileResult<T> + Send + Sync + 'static,
        stringify: impl Fn(&T) -> LivefileResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            parse: Box::new(parse),
            stringify: Box::new(stringify),
            preserve: None,
        }
    }

    /// Use `preserve` to write back files that were read from disk, instead of stringify.
    pub fn with_preserve(
        mut self,
        preserve: impl Fn(&str, &T, &T) -> LivefileResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.preserve = Some(Box::new(preserve));
        self
    }
}

impl<T> fmt::Debug for CustomFormat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFormat")
            .field("name", &self.name)
            .field("preserve", &self.preserve.is_some())
            .finish()
    }
}

impl<T> Format<T> for CustomFormat<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn parse(&self, text: &str) -> LivefileResult<T> {
        (self.parse)(text)
    }

    fn stringify(&self, value: &T) -> LivefileResult<String> {
        (self.stringify)(value)
    }

    fn preserve_format(&self, old_text: &str, old_value: &T, new_value: &T) -> LivefileResult<String> {
        match &self.preserve {
            Some(preserve) => preserve(old_text, old_value, new_value),
            None => (self.stringify)(new_value),
        }
    }
}
