//! Qbatch - Batch Preparation for Neural Question Retrieval
//!
//! Builds training and evaluation mini-batches for duplicate-question
//! retrieval models: reads a question corpus, encodes it against a
//! pretrained embedding vocabulary, parses relevance annotations, and
//! assembles padded title/body matrices together with hinge-loss triples.

pub mod annotations;
pub mod batch;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod vocab;

pub use error::{QbatchError, Result};
