#![forbid(unsafe_code)]

mod yuf;

pub use yuf::{
    classify, inspect, natural_key, pack, pack_with_progress, unpack, unpack_with_progress,
    ArchiveInfo, Classified, NaturalKey, PackSummary, ProgressSink, SourceFile, YufError,
    YufResult, ALIGNMENT, BLOCK_MAGIC, MAGIC, VERSION,
};
