/* 📖 # What is the Platform Abstraction Layer?

A live file only needs three things from its environment: an existence check, reading the
whole file as text, and replacing the whole file with new text. The PAL puts those behind a
trait so that the handle lifecycle can be tested against MockPal without touching the disk,
while RealPal maps them onto std::fs.
*/

mod file_path;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};
