use relative_path::RelativePathBuf;
use std::path::Path;

/* 📖 # Why use RelativePathBuf for FilePath?

A live file is always addressed relative to the PAL that owns the filesystem, so the same
handle code works against a RealPal rooted in a temp directory and a MockPal keyed by path.
RelativePathBuf keeps forward-slash separators on every platform, which makes MockPal keys
and error messages stable.
*/

/// Path of a live file, relative to the PAL base directory.
///
/// # Examples
///
/// ```
/// use livefile_base::FilePath;
///
/// let path1 = FilePath::from("settings.json");
/// let path2 = FilePath::from(String::from("conf/app.toml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// Converts to a regular Path, without any base directory.
    pub fn as_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<&String> for FilePath {
    fn from(s: &String) -> Self {
        Self(RelativePathBuf::from(s.as_str()))
    }
}

impl From<&Path> for FilePath {
    fn from(p: &Path) -> Self {
        Self(RelativePathBuf::from(p.to_string_lossy().into_owned()))
    }
}

impl From<&FilePath> for FilePath {
    fn from(p: &FilePath) -> Self {
        p.clone()
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
