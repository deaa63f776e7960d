//! Question corpus: raw text reading and token-ID encoding
//!
//! The raw corpus maps question IDs to lowercased, whitespace-split title
//! and body tokens. Encoding against an embedding vocabulary turns those
//! into integer-ID sequences with bodies truncated to a maximum length.

mod encode;
mod reader;

pub use encode::{EncodedEntry, IdsCorpus};
pub use reader::{read_corpus, RawCorpus, RawEntry};

pub(crate) use reader::open_text;
