#![forbid(unsafe_code)]

mod error;
mod format;
mod io;
mod ops;
mod pack;
mod path;
mod progress;
mod unpack;

pub use error::{YufError, YufResult};
pub use format::{ALIGNMENT, BLOCK_MAGIC, MAGIC, VERSION};
pub use ops::{inspect, pack, pack_with_progress, unpack, unpack_with_progress, ArchiveInfo};
pub use pack::PackSummary;
pub use path::{classify, natural_key, Classified, NaturalKey, SourceFile};
pub use progress::ProgressSink;
