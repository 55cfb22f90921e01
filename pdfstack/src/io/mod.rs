//! File input and output.
//!
//! The core library works on in-memory descriptors and byte buffers; this
//! module is the bridge to the filesystem used by the CLI.

pub mod reader;
pub mod writer;

pub use reader::FileReader;
pub use writer::{OutputWriter, WriteOptions, WriteStatistics};
