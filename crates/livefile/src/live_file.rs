use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use livefile_base::{ErrorKind, FilePath, LivefileError, LivefileResult, PalHandle};

use crate::format::Format;
use crate::options::Options;

/* 📖 # Why does a live file write in both close() and Drop?

The write-on-close has to happen on every path out of the scope that owns the handle: normal
return, `?` early return, and panics. Drop is the only hook Rust runs on all of them, but a
destructor cannot report an error. So there are two doors to the same single write:

- `close(self)` writes and returns the WriteFailure to the caller
- Drop writes if close() was never called, and can only log a failure

`scoped` combines both: it runs a closure against the handle and then calls close(), so the
error from the closure and the error from the write both reach the caller.
*/

/// A file whose parsed content is held in memory and written back when the handle ends.
///
/// # Examples
///
/// ```
/// use livefile::{JsonFormat, LiveFile, Options};
/// use livefile_base::{MockPal, PalHandle};
/// use serde_json::{Value, json};
/// use std::sync::Arc;
///
/// let mock = MockPal::new();
/// let pal = PalHandle::new(mock.clone());
/// let mut file: LiveFile<Value> =
///     LiveFile::open(pal, "settings.json", Arc::new(JsonFormat), Options::default()).unwrap();
/// assert!(!file.is_present());
/// file.set_data(json!({"hello": "world"}));
/// file.close().unwrap();
/// assert_eq!(mock.write_count(), 1);
/// ```
#[must_use = "a live file writes on close; call `close()` to see write errors"]
pub struct LiveFile<T> {
    pal: PalHandle,
    path: FilePath,
    format: Arc<dyn Format<T>>,
    options: Options<T>,
    data: Option<T>,
    /// Value as parsed on open, for format preservation
    original: Option<T>,
    /// Text as read on open, for format preservation
    original_text: Option<String>,
    closed: bool,
}

struct Loaded<T> {
    value: Option<T>,
    text: Option<String>,
}

impl<T: Clone> LiveFile<T> {
    /// Open `path` and read its content through `format`.
    ///
    /// Fails with [`ErrorKind::NotFound`], [`ErrorKind::ParseFailure`] or
    /// [`ErrorKind::ValidationFailure`] according to `options`; in those cases no handle
    /// exists and nothing will be written.
    pub fn open(
        pal: PalHandle,
        path: impl Into<FilePath>,
        format: Arc<dyn Format<T>>,
        options: Options<T>,
    ) -> LivefileResult<Self> {
        let path = path.into();
        let loaded = load(&pal, &path, format.as_ref(), &options)?;
        Ok(Self {
            pal,
            path,
            format,
            options,
            data: loaded.value.clone(),
            original: loaded.value,
            original_text: loaded.text,
            closed: false,
        })
    }
}

#[instrument(skip(pal, format, options), fields(path = %path, format = format.name()))]
fn load<T>(
    pal: &PalHandle,
    path: &FilePath,
    format: &dyn Format<T>,
    options: &Options<T>,
) -> LivefileResult<Loaded<T>> {
    if !pal.file_exists(path)? {
        if !options.allow_no_exist {
            return Err(ErrorKind::NotFound {
                path: path.as_path().to_path_buf(),
            }
            .into());
        }
        debug!("file does not exist, starting without data");
        return Ok(Loaded {
            value: None,
            text: None,
        });
    }

    let text = pal.read_file_to_string(path).map_err(|e| {
        Box::new(
            LivefileError::new(ErrorKind::ParseFailure {
                path: path.as_path().to_path_buf(),
            })
            .caused_by(e),
        )
    })?;
    if text.trim().is_empty() {
        debug!("file is blank, starting without data");
        return Ok(Loaded {
            value: None,
            text: Some(text),
        });
    }

    // Shape errors are rejections too: the text is fine, it just is not a T
    let shape_error = match format.parse(&text) {
        Ok(value) if options.accepts(&value) => {
            debug!(bytes = text.len(), "loaded file");
            return Ok(Loaded {
                value: Some(value),
                text: Some(text),
            });
        }
        Ok(_) => None,
        Err(e) if matches!(e.kind(), ErrorKind::Shape { .. }) => Some(e),
        Err(e) => {
            return Err(Box::new(
                LivefileError::new(ErrorKind::ParseFailure {
                    path: path.as_path().to_path_buf(),
                })
                .caused_by(e),
            ));
        }
    };

    if options.allow_validator_failure {
        warn!("content rejected, starting without data");
        return Ok(Loaded {
            value: None,
            text: Some(text),
        });
    }
    let error = LivefileError::new(ErrorKind::ValidationFailure {
        path: path.as_path().to_path_buf(),
        content: text,
    });
    Err(Box::new(match shape_error {
        Some(cause) => error.caused_by(cause),
        None => error,
    }))
}

impl<T> LiveFile<T> {
    /// The current value, or `None` if there is no data.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// Replace the current value. Validators are not consulted.
    pub fn set_data(&mut self, data: T) {
        self.data = Some(data);
    }

    pub fn get_or_insert_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        self.data.get_or_insert_with(f)
    }

    /// Returns `true` if the handle holds a value and will write on close.
    pub fn is_present(&self) -> bool {
        self.data.is_some()
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    pub fn options(&self) -> &Options<T> {
        &self.options
    }

    pub fn format_name(&self) -> &'static str {
        self.format.name()
    }

    /// The file content as read on open, if the file existed.
    pub fn original_text(&self) -> Option<&str> {
        self.original_text.as_deref()
    }

    /// Write the current value back and end the handle.
    ///
    /// Nothing is written if there is no data. Errors are reported as
    /// [`ErrorKind::WriteFailure`] with the underlying error as cause.
    pub fn close(mut self) -> LivefileResult<()> {
        self.closed = true;
        self.write_back()
    }

    /// Run `f` against the handle, then close it, whether `f` succeeded or not.
    ///
    /// If `f` and the write both fail, both errors are returned as [`ErrorKind::Multiple`].
    /// If `f` panics the write still happens while unwinding, see [`Drop`].
    pub fn scoped<R>(
        mut self,
        f: impl FnOnce(&mut Self) -> LivefileResult<R>,
    ) -> LivefileResult<R> {
        let result = f(&mut self);
        let closed = self.close();
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(error), Ok(())) | (Ok(_), Err(error)) => Err(error),
            (Err(first), Err(second)) => Err(Box::new(LivefileError::new(ErrorKind::Multiple {
                errors: vec![*first, *second],
                count: 2,
            }))),
        }
    }

    #[instrument(skip(self), fields(path = %self.path, format = self.format.name()))]
    fn write_back(&mut self) -> LivefileResult<()> {
        let Some(data) = &self.data else {
            debug!("no data, skipping write");
            return Ok(());
        };
        let content = match (&self.original_text, &self.original) {
            (Some(text), Some(original)) => self.format.preserve_format(text, original, data),
            _ => self.format.stringify(data),
        };
        content
            .and_then(|content| {
                debug!(bytes = content.len(), "writing file");
                self.pal.write_file_from_string(&self.path, &content)
            })
            .map_err(|e| {
                Box::new(
                    LivefileError::new(ErrorKind::WriteFailure {
                        path: self.path.as_path().to_path_buf(),
                    })
                    .caused_by(e),
                )
            })
    }
}

impl<T> Drop for LiveFile<T> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.write_back() {
            error!(file = %self.path, error = %e, "Failed to write live file on drop");
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LiveFile<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveFile")
            .field("path", &self.path)
            .field("format", &self.format.name())
            .field("data", &self.data)
            .field("closed", &self.closed)
            .finish()
    }
}
