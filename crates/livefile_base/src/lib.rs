/* 📖 # Why have livefile_base as a separate crate?
livefile_base holds the error type, tracing setup and filesystem abstraction shared by the
format adapters and the file handle. Keeping them apart from the handle logic keeps the
handle crate focused on the read-validate-write lifecycle.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, LivefileError, LivefileResult, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, ReadSeek, RealPal};
