//! Boundary-aware section chunking.
//!
//! Splits a section's text into chunks of at most `chunk_size` characters,
//! cutting at the last paragraph break, sentence end, or whitespace inside the
//! window. Each chunk after the first repeats the `overlap` characters that
//! precede its new content.

mod helpers;
mod strategies;
mod types;

pub(crate) use helpers::build_chunk;
pub use strategies::{chunk_section, split_text};
pub use types::{Chunk, ChunkParams, ChunkSpan};
