//! Batch assembly over annotation records
//!
//! The assembler walks annotation records in a per-call shuffled order,
//! assigning each distinct question a local column the first time it is
//! seen and accumulating one hinge-triple row per (query, positive) pair.
//! Questions missing from the corpus are filtered inline; they are an
//! expected gap in the upstream data, not an error.

use super::padding::{pad_sequence_batch, pad_triple_batch};
use super::{Batch, EvalBatch};
use crate::annotations::AnnotationRecord;
use crate::corpus::IdsCorpus;
use crate::error::Result;
use crate::vocab::TokenId;
use ahash::{HashMap, HashMapExt};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

/// Per-batch accumulator, discarded on every flush
struct BatchState {
    local: HashMap<String, usize>,
    titles: Vec<Vec<TokenId>>,
    bodies: Vec<Vec<TokenId>>,
    triples: Vec<Vec<usize>>,
    records: usize,
}

impl BatchState {
    fn new() -> Self {
        Self {
            local: HashMap::new(),
            titles: Vec::new(),
            bodies: Vec::new(),
            triples: Vec::new(),
            records: 0,
        }
    }

    /// Fold one record into the accumulator
    ///
    /// Returns false when the record's query is missing from the corpus
    /// and the record was skipped entirely.
    fn push_record(&mut self, corpus: &IdsCorpus, record: &AnnotationRecord) -> bool {
        if !corpus.contains(&record.query) {
            return false;
        }

        for id in std::iter::once(record.query.as_str())
            .chain(record.candidates.iter().map(String::as_str))
        {
            if self.local.contains_key(id) {
                continue;
            }
            let Some(entry) = corpus.get(id) else {
                continue;
            };
            self.local.insert(id.to_string(), self.titles.len());
            self.titles.push(entry.title.clone());
            self.bodies.push(entry.body.clone());
        }

        let Some(&query) = self.local.get(&record.query) else {
            return false;
        };

        // Candidates absent from the corpus never made it into the map
        // and drop out here
        let positives: Vec<usize> = record
            .positives()
            .filter_map(|id| self.local.get(id).copied())
            .collect();
        let negatives: Vec<usize> = record
            .negatives()
            .filter_map(|id| self.local.get(id).copied())
            .collect();

        for &positive in &positives {
            let mut row = Vec::with_capacity(2 + negatives.len());
            row.push(query);
            row.push(positive);
            row.extend_from_slice(&negatives);
            self.triples.push(row);
        }

        self.records += 1;
        true
    }

    /// Close the batch, resetting all per-batch state
    ///
    /// A flush with zero accumulated triples emits nothing: the partial
    /// group had no usable (query, positive) pair and padding an empty
    /// triple set is undefined.
    fn flush(&mut self, padding_id: TokenId) -> Result<Option<Batch>> {
        let state = std::mem::replace(self, BatchState::new());
        if state.triples.is_empty() {
            if !state.titles.is_empty() {
                debug!(
                    "Dropping flush with {} questions but no triples",
                    state.titles.len()
                );
            }
            return Ok(None);
        }

        let (titles, bodies) = pad_sequence_batch(&state.titles, &state.bodies, padding_id)?;
        let triples = pad_triple_batch(&state.triples)?;
        Ok(Some(Batch {
            titles,
            bodies,
            triples,
        }))
    }
}

/// Assemble training batches covering every record exactly once
///
/// Records are visited in a random permutation drawn once from `rng`.
/// A batch closes when `batch_size` usable records have been folded in
/// since the last flush, or when the stream ends.
pub fn create_batches(
    corpus: &IdsCorpus,
    records: &[AnnotationRecord],
    batch_size: usize,
    padding_id: TokenId,
    rng: &mut impl Rng,
) -> Result<Vec<Batch>> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.shuffle(rng);

    let mut state = BatchState::new();
    let mut batches = Vec::new();
    let mut skipped = 0usize;

    for (seen, &idx) in order.iter().enumerate() {
        if !state.push_record(corpus, &records[idx]) {
            skipped += 1;
        }

        if state.records == batch_size || seen == order.len() - 1 {
            if let Some(batch) = state.flush(padding_id)? {
                debug!(
                    "Flushed batch {}: {} questions, {} triples",
                    batches.len(),
                    batch.num_questions(),
                    batch.num_triples()
                );
                batches.push(batch);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} records with queries missing from the corpus", skipped);
    }
    info!(
        "Assembled {} training batches from {} records",
        batches.len(),
        records.len()
    );
    Ok(batches)
}

/// Assemble a single batch for the domain classifier
///
/// Same accumulation as [`create_batches`], but the close condition is
/// on accumulated triples (within 10 of `batch_size`, or past it) and
/// the first flushed batch is returned immediately. Returns `None` when
/// no record produced a triple.
pub fn domain_classifier_batch(
    corpus: &IdsCorpus,
    records: &[AnnotationRecord],
    batch_size: usize,
    padding_id: TokenId,
    rng: &mut impl Rng,
) -> Result<Option<Batch>> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.shuffle(rng);

    let mut state = BatchState::new();
    for (seen, &idx) in order.iter().enumerate() {
        state.push_record(corpus, &records[idx]);

        let accumulated = state.triples.len();
        if accumulated >= batch_size
            || batch_size.abs_diff(accumulated) < 10
            || seen == order.len() - 1
        {
            return state.flush(padding_id);
        }
    }

    Ok(None)
}

/// Build one evaluation unit per annotation record
///
/// No cross-record deduplication. A record whose query is missing from
/// the corpus is skipped; a missing candidate is dropped together with
/// its label so positions stay aligned. Candidate order, and therefore
/// label order, is preserved exactly.
pub fn create_eval_batches(
    corpus: &IdsCorpus,
    records: &[AnnotationRecord],
    padding_id: TokenId,
) -> Result<Vec<EvalBatch>> {
    let mut units = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for record in records {
        let Some(query) = corpus.get(&record.query) else {
            skipped += 1;
            continue;
        };

        let mut titles = vec![query.title.clone()];
        let mut bodies = vec![query.body.clone()];
        let mut labels = Vec::with_capacity(record.labels.len());
        for (id, &label) in record.candidates.iter().zip(&record.labels) {
            let Some(entry) = corpus.get(id) else {
                continue;
            };
            titles.push(entry.title.clone());
            bodies.push(entry.body.clone());
            labels.push(i32::from(label));
        }

        if labels.is_empty() {
            skipped += 1;
            continue;
        }

        let (titles, bodies) = pad_sequence_batch(&titles, &bodies, padding_id)?;
        units.push(EvalBatch {
            titles,
            bodies,
            labels: Array1::from_vec(labels),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} evaluation records with no usable questions", skipped);
    }
    info!("Built {} evaluation units", units.len());
    Ok(units)
}
