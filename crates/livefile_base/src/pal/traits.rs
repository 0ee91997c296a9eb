use std::io::{Read, Seek, Write};
use std::sync::Arc;

use crate::LivefileResult;
use crate::error::{ErrorKind, LivefileError};

use super::file_path::FilePath;

/// Trait combining Read + Seek for file operations.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/* 📖 # Why is Pal a trait instead of a struct?

The live file handle depends on the abstraction, not on std::fs. MockPal implements Pal for
fast, deterministic lifecycle tests (including injected write failures), RealPal for actual
files on disk.
*/

/// Platform Abstraction Layer (PAL) trait providing the filesystem primitives a live file needs.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs`
/// - `MockPal`: In-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> LivefileResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> LivefileResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    ///
    /// Default implementation reads through [`Pal::read_file`] and rejects non-UTF-8 content.
    fn read_file_to_string(&self, path: &FilePath) -> LivefileResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| {
            Box::new(LivefileError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: e,
            }))
        })?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Create a new file, truncating it if it exists.
    fn create_file(&self, path: &FilePath) -> LivefileResult<Box<dyn Write>>;

    /// Replace the entire content of a file with the given text.
    ///
    /// Default implementation goes through [`Pal::create_file`]. Not atomic: a failure halfway
    /// may leave a truncated file behind.
    fn write_file_from_string(&self, path: &FilePath, content: &str) -> LivefileResult<()> {
        let to_file_error = |e: std::io::Error| {
            Box::new(LivefileError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: e,
            }))
        };
        let mut writer = self.create_file(path)?;
        writer.write_all(content.as_bytes()).map_err(to_file_error)?;
        writer.flush().map_err(to_file_error)?;
        Ok(())
    }
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

A LiveFiles factory hands the same PAL to every handle it opens. Arc makes that a cheap clone
without lifetime parameters on the handle type.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use livefile_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new(".".into()));
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
