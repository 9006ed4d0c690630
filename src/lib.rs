
pub mod error;
pub mod conventions;
pub mod glyphs;
pub mod tokenizer;
pub mod transcription;
pub mod dictionary;
pub mod transcript;
pub mod textgrid;
pub mod alignment;
pub mod substitution;
pub mod pipeline;
pub mod output;

pub use error::{Error, Result};
