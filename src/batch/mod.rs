//! Mini-batch assembly for training and evaluation
//!
//! Training batches deduplicate question IDs across the records they
//! cover: each distinct question occupies one column of the title/body
//! matrices and hinge triples reference those columns by local index.
//! Evaluation batches keep one query per unit with labels in candidate
//! order.

mod assembler;
mod padding;

pub use assembler::{create_batches, create_eval_batches, domain_classifier_batch};
pub use padding::{pad_sequence_batch, pad_triple_batch};

use crate::vocab::TokenId;
use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors from padding and stacking
#[derive(Error, Debug)]
pub enum BatchError {
    /// Title and body lists entering the padder must be parallel
    #[error("Title/body list length mismatch: {titles} titles, {bodies} bodies")]
    SequenceCountMismatch { titles: usize, bodies: usize },

    /// A sequence batch with zero questions cannot be padded
    #[error("Cannot pad an empty sequence batch")]
    EmptySequenceBatch,

    /// A triple batch with zero rows cannot be padded
    #[error("Cannot pad an empty triple set")]
    EmptyTripleSet,

    /// Every triple row needs at least a query and a positive index
    #[error("Triple row {row} is empty")]
    EmptyTripleRow { row: usize },
}

/// One training batch
///
/// `titles` and `bodies` have shape `(max_seq_len, num_questions)` with
/// one column per distinct question, right-padded with the padding ID.
/// Each `triples` row is `[query, positive, negatives...]` as column
/// indices into both matrices, edge-padded to uniform width.
#[derive(Debug, Clone)]
pub struct Batch {
    pub titles: Array2<TokenId>,
    pub bodies: Array2<TokenId>,
    pub triples: Array2<usize>,
}

impl Batch {
    /// Number of distinct questions (columns) in this batch
    pub fn num_questions(&self) -> usize {
        self.titles.ncols()
    }

    /// Number of hinge triples in this batch
    pub fn num_triples(&self) -> usize {
        self.triples.nrows()
    }
}

/// One evaluation unit: a single query with its full candidate list
///
/// Column 0 of `titles`/`bodies` is the query; columns `1..` follow the
/// record's candidate order. `labels[i]` belongs to column `i + 1`.
#[derive(Debug, Clone)]
pub struct EvalBatch {
    pub titles: Array2<TokenId>,
    pub bodies: Array2<TokenId>,
    pub labels: Array1<i32>,
}

impl EvalBatch {
    /// Number of candidates (excluding the query column)
    pub fn num_candidates(&self) -> usize {
        self.labels.len()
    }
}
