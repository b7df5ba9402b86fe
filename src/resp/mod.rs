//! # RESP3
//!
//! A self-contained implementation of the RESP3 wire protocol: an incremental
//! reader, a tagged-union value model, a serializer, a raw byte-framing mode,
//! and a small command writer for driving a connection as a client would.

mod raw;
mod reader;
mod serialize;
mod value;
mod writer;

pub use reader::{ReadOutcome, Reader};
pub use value::{Pairs, SmartValue, Tag, Value, ValueKind};
pub use writer::Writer;
