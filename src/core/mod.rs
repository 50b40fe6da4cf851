// Core modules implementing the value model, column storage, tokenizing, and the chunk pipeline.
pub mod array;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod source;
pub mod table;
pub mod types;
