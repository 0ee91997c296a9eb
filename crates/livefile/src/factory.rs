use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use livefile_base::{FilePath, LivefileResult, PalHandle, RealPal};

use crate::format::{
    CustomFormat, Format, JsonFormat, JsoncFormat, TextFormat, TomlFormat, YamlFormat,
};
use crate::live_file::LiveFile;
use crate::options::Options;

/// Opens live files through one PAL, with a constructor per built-in format.
///
/// # Examples
///
/// ```no_run
/// use livefile::{LiveFiles, Options};
/// use std::collections::BTreeMap;
///
/// let files = LiveFiles::in_directory("config");
/// let mut settings = files
///     .toml::<BTreeMap<String, String>>("settings.toml", Options::default())
///     .unwrap();
/// settings
///     .get_or_insert_with(BTreeMap::new)
///     .insert("theme".to_string(), "dark".to_string());
/// settings.close().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LiveFiles {
    pal: PalHandle,
}

impl LiveFiles {
    pub fn new(pal: PalHandle) -> Self {
        Self { pal }
    }

    /// Files are resolved relative to `dir` on the real filesystem.
    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(PalHandle::new(RealPal::new(dir.into())))
    }

    /// Files are resolved relative to the process working directory.
    pub fn current_dir() -> Self {
        Self::in_directory(".")
    }

    pub fn pal(&self) -> &PalHandle {
        &self.pal
    }

    pub fn open<T: Clone>(
        &self,
        path: impl Into<FilePath>,
        format: impl Format<T> + 'static,
        options: Options<T>,
    ) -> LivefileResult<LiveFile<T>> {
        self.open_shared(path, Arc::new(format), options)
    }

    /// Like [`LiveFiles::open`], for a format shared between handles.
    pub fn open_shared<T: Clone>(
        &self,
        path: impl Into<FilePath>,
        format: Arc<dyn Format<T>>,
        options: Options<T>,
    ) -> LivefileResult<LiveFile<T>> {
        LiveFile::open(self.pal.clone(), path, format, options)
    }

    pub fn text(
        &self,
        path: impl Into<FilePath>,
        options: Options<String>,
    ) -> LivefileResult<LiveFile<String>> {
        self.open(path, TextFormat, options)
    }

    pub fn json<T>(&self, path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.open(path, JsonFormat, options)
    }

    /// JSON with comments; unchanged parts of the file are kept on write.
    pub fn jsonc<T>(&self, path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.open(path, JsoncFormat, options)
    }

    pub fn toml<T>(&self, path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.open(path, TomlFormat, options)
    }

    pub fn yaml<T>(&self, path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        self.open(path, YamlFormat, options)
    }

    pub fn custom<T: Clone + 'static>(
        &self,
        path: impl Into<FilePath>,
        format: CustomFormat<T>,
        options: Options<T>,
    ) -> LivefileResult<LiveFile<T>> {
        self.open(path, format, options)
    }
}

/// Open a file relative to the working directory, see [`LiveFiles::open`].
pub fn open<T: Clone>(
    path: impl Into<FilePath>,
    format: impl Format<T> + 'static,
    options: Options<T>,
) -> LivefileResult<LiveFile<T>> {
    LiveFiles::current_dir().open(path, format, options)
}

pub fn open_text(path: impl Into<FilePath>, options: Options<String>) -> LivefileResult<LiveFile<String>> {
    LiveFiles::current_dir().text(path, options)
}

pub fn open_json<T>(path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
where
    T: Serialize + DeserializeOwned + Clone,
{
    LiveFiles::current_dir().json(path, options)
}

pub fn open_jsonc<T>(path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
where
    T: Serialize + DeserializeOwned + Clone,
{
    LiveFiles::current_dir().jsonc(path, options)
}

pub fn open_toml<T>(path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
where
    T: Serialize + DeserializeOwned + Clone,
{
    LiveFiles::current_dir().toml(path, options)
}

pub fn open_yaml<T>(path: impl Into<FilePath>, options: Options<T>) -> LivefileResult<LiveFile<T>>
where
    T: Serialize + DeserializeOwned + Clone,
{
    LiveFiles::current_dir().yaml(path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use livefile_base::MockPal;
    use serde_json::{Value, json};

    fn files() -> (MockPal, LiveFiles) {
        let mock = MockPal::new();
        let files = LiveFiles::new(PalHandle::new(mock.clone()));
        (mock, files)
    }

    #[test]
    fn test_constructors_bind_format() {
        let (_mock, files) = files();
        assert_eq!(files.text("a.txt", Options::default()).unwrap().format_name(), "text");
        let json: LiveFile<Value> = files.json("a.json", Options::default()).unwrap();
        assert_eq!(json.format_name(), "JSON");
        let jsonc: LiveFile<Value> = files.jsonc("a.jsonc", Options::default()).unwrap();
        assert_eq!(jsonc.format_name(), "JSONC");
        let toml: LiveFile<Value> = files.toml("a.toml", Options::default()).unwrap();
        assert_eq!(toml.format_name(), "TOML");
        let yaml: LiveFile<Value> = files.yaml("a.yaml", Options::default()).unwrap();
        assert_eq!(yaml.format_name(), "YAML");
    }

    #[test]
    fn test_shared_format() {
        let (mock, files) = files();
        let format: Arc<dyn Format<Value>> = Arc::new(JsonFormat);
        for name in ["one.json", "two.json"] {
            let mut file = files.open_shared(name, format.clone(), Options::default()).unwrap();
            file.set_data(json!({"name": name}));
            file.close().unwrap();
        }
        assert_eq!(mock.write_count(), 2);
        assert_eq!(
            mock.file_content(&FilePath::from("two.json")),
            Some(b"{\n  \"name\": \"two.json\"\n}\n".to_vec())
        );
    }

    #[test]
    fn test_custom() {
        let (mock, files) = files();
        mock.add_file(FilePath::from("count"), b"41".to_vec());
        let format = CustomFormat::new(
            "counter",
            |text: &str| {
                text.trim()
                    .parse::<u64>()
                    .map_err(|e| livefile_base::err!("not a number: {}", e))
            },
            |n: &u64| Ok(n.to_string()),
        );
        let mut file = files.custom("count", format, Options::default()).unwrap();
        *file.data_mut().unwrap() += 1;
        file.close().unwrap();
        assert_eq!(mock.file_content(&FilePath::from("count")), Some(b"42".to_vec()));
    }
}
