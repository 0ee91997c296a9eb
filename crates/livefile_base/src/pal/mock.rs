use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::LivefileError;
use crate::LivefileResult;
use crate::error::ErrorKind;

use super::FilePath;
use super::traits::{Pal, ReadSeek};

/* 📖 # Why use HashMap for MockPal storage?

Lifecycle tests need to observe exactly what a handle did to the filesystem: whether it wrote
at all, how often, and what. An in-memory map makes that observable and deterministic, and
lets tests inject a failing write for a specific path to exercise the write-failure path.
*/

/// In-memory PAL implementation for testing.
///
/// # Examples
///
/// ```
/// use livefile_base::{MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("test.txt"), b"content".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("test.txt")).unwrap();
/// assert_eq!(content, "content");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    failing_writes: Arc<Mutex<HashSet<FilePath>>>,
    write_count: Arc<AtomicUsize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        lock(&self.files).insert(path, content);
    }

    /// Returns the raw content of a file, if present.
    pub fn file_content(&self, path: &FilePath) -> Option<Vec<u8>> {
        lock(&self.files).get(path).cloned()
    }

    /// Make every subsequent write to `path` fail with a permission error.
    pub fn fail_writes_to(&self, path: FilePath) {
        lock(&self.failing_writes).insert(path);
    }

    /// Number of files created (written) through this PAL.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> LivefileResult<bool> {
        Ok(lock(&self.files).contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> LivefileResult<Box<dyn ReadSeek + 'static>> {
        let content = lock(&self.files)
            .get(path)
            .ok_or_else(|| {
                Box::new(LivefileError::new(ErrorKind::FileError {
                    path: path.as_path().to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("File not found: {}", path),
                    ),
                }))
            })?
            .clone();
        Ok(Box::new(Cursor::new(content)))
    }

    fn create_file(&self, path: &FilePath) -> LivefileResult<Box<dyn Write>> {
        if lock(&self.failing_writes).contains(path) {
            return Err(Box::new(LivefileError::new(ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "write rejected by MockPal",
                ),
            })));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        // Truncate immediately, the writer stores its buffer when dropped
        lock(&self.files).insert(path.clone(), Vec::new());
        Ok(Box::new(MockFileWriter {
            path: path.clone(),
            files: Arc::clone(&self.files),
            buffer: Vec::new(),
        }))
    }
}

/// Helper struct for writing files to MockPal.
struct MockFileWriter {
    path: FilePath,
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        lock(&self.files).insert(self.path.clone(), std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_exists_true() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("test.txt"), b"content".to_vec());

        assert!(pal.file_exists(&FilePath::from("test.txt")).unwrap());
    }

    #[test]
    fn test_file_exists_false() {
        let pal = MockPal::new();

        assert!(!pal.file_exists(&FilePath::from("test.txt")).unwrap());
    }

    #[test]
    fn test_read_file_not_found() {
        let pal = MockPal::new();

        let result = pal.read_file(&FilePath::from("nonexistent.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_file() {
        let pal = MockPal::new();

        let mut writer = pal.create_file(&FilePath::from("new.txt")).unwrap();
        writer.write_all(b"test content").unwrap();
        drop(writer);

        let content = pal.read_file_to_string(&FilePath::from("new.txt")).unwrap();
        assert_eq!(content, "test content");
        assert_eq!(pal.write_count(), 1);
    }

    #[test]
    fn test_failing_write() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("locked.json"), b"{}".to_vec());
        pal.fail_writes_to(FilePath::from("locked.json"));

        let result = pal.write_file_from_string(&FilePath::from("locked.json"), "[]");
        assert!(result.is_err());
        assert_eq!(pal.write_count(), 0);
        assert_eq!(
            pal.file_content(&FilePath::from("locked.json")),
            Some(b"{}".to_vec())
        );
    }
}
