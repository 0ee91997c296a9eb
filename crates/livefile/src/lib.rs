/* 📖 # What is a live file?

A live file is a handle that reads a structured file into a typed value when it is opened,
lets the caller change that value, and writes it back when the handle ends. Formats are
pluggable through the Format trait; the handle itself knows nothing about any of them.
*/

pub mod factory;
pub mod format;
pub mod live_file;
pub mod options;
mod scenario_tests;

pub use factory::{LiveFiles, open, open_json, open_jsonc, open_text, open_toml, open_yaml};
pub use format::{CustomFormat, Format, JsonFormat, JsoncFormat, TextFormat, TomlFormat, YamlFormat};
pub use live_file::LiveFile;
pub use options::{Options, Validator};

pub use livefile_base::{ErrorKind, FilePath, LivefileError, LivefileResult};
