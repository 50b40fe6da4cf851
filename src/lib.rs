//! Purpose: Library crate behind the `chunkline` CLI: delimited text into an in-memory columnar table.
//! Exports: `core` (value model, column arrays, tokenizer, pipeline, errors) and `api`.
//! Role: `api` is the supported surface; `core` stays public for tests and tooling.
//! Invariants: Table chunk order always equals source byte order.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
