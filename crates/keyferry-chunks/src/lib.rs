//! keyferry-chunks: fixed-window chunking and reassembly
//!
//! Vault nodes impose a maximum record size, so key material is split into
//! substrings of a fixed character window (default 4096) before upload and
//! concatenated back on retrieval. Chunk order is the only bookkeeping.

pub mod window;

pub use window::{chunk, reassemble};
