//! Chunk re-slicing primitives for byte streams
//!
//! A byte stream arrives as a sequence of owned buffers whose boundaries bear
//! no relation to the field boundaries a protocol wants to read. This crate
//! provides two pull-based primitives that re-slice such a stream without
//! buffering it whole:
//!
//! - [`read_prefix`]: take exactly the first `n` bytes, handing back the rest
//!   of the stream with its original chunking intact.
//! - [`split_trailer`]: split off exactly the last `n` bytes of a stream of
//!   unknown total length, forwarding everything before them incrementally.
//!
//! # Memory
//!
//! Both primitives hold a bounded amount of data regardless of total stream
//! length. `read_prefix` buffers at most `n` bytes plus the chunk that
//! crossed the boundary. [`split_trailer`] keeps a window of at most
//! `n + largest_chunk` bytes (see [`TrailerSplit`]).
//!
//! # Ownership
//!
//! Chunks are owned `Vec<u8>` buffers. Ownership passes to the consumer on
//! yield; nothing is retained after forwarding, except inside the trailer
//! window. Each primitive is owned by exactly one consumer; dropping it at
//! any point releases all held buffers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod prefix;
mod trailer;

pub use error::ChunkError;
pub use prefix::{Remainder, read_prefix};
pub use trailer::{TrailerSplit, split_trailer};
