//! Relevance annotations for training and evaluation
//!
//! Each record pairs a query question with an ordered candidate list and
//! parallel binary labels. Negative pools are shuffled and capped at read
//! time; candidates are deduplicated by first occurrence.

mod pairs;

pub use pairs::{pair_annotations, read_pair_file, PairMap};

use crate::corpus::open_text;
use crate::error::{QbatchError, Result};
use ahash::{HashSet, HashSetExt};
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

/// One annotation record: a query, its candidates, and binary labels
///
/// Invariant: `candidates.len() == labels.len()`, and candidates are
/// unique within the record.
#[derive(Debug, Clone)]
pub struct AnnotationRecord {
    pub query: String,
    pub candidates: Vec<String>,
    pub labels: Vec<u8>,
}

impl AnnotationRecord {
    /// Candidate IDs labeled relevant
    pub fn positives(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .iter()
            .zip(&self.labels)
            .filter(|(_, &label)| label == 1)
            .map(|(id, _)| id.as_str())
    }

    /// Candidate IDs labeled non-relevant
    pub fn negatives(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .iter()
            .zip(&self.labels)
            .filter(|(_, &label)| label == 0)
            .map(|(id, _)| id.as_str())
    }
}

/// Read annotation records from a line-delimited file
///
/// Each line is `query_id \t positive_ids \t candidate_pool` with the
/// inner lists space-separated. Per record the candidate pool is shuffled
/// with `rng` and truncated to at most `k_neg` entries; the record's
/// candidate list is then the truncated pool (label 0, or 1 when the
/// member is also a positive) followed by positives not already present
/// (label 1). Later duplicates are dropped silently. Record order equals
/// input order; cross-record shuffling happens at batch time.
pub fn read_annotations(path: &Path, k_neg: usize, rng: &mut impl Rng) -> Result<Vec<AnnotationRecord>> {
    let reader = open_text(path)?;
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| QbatchError::Io {
            source: e,
            context: format!("Failed to read annotations from {:?}", path),
        })?;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(QbatchError::MalformedRecord {
                path: path.to_path_buf(),
                line: idx + 1,
                expected: 3,
                found: fields.len(),
            });
        }

        let query = fields[0].to_string();
        let positives: Vec<&str> = fields[1].split_whitespace().collect();
        let mut pool: Vec<&str> = fields[2].split_whitespace().collect();

        pool.shuffle(rng);
        pool.truncate(k_neg);

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut labels = Vec::new();
        for &id in &pool {
            if seen.insert(id) {
                candidates.push(id.to_string());
                labels.push(u8::from(positives.contains(&id)));
            }
        }
        for &id in &positives {
            if seen.insert(id) {
                candidates.push(id.to_string());
                labels.push(1);
            }
        }

        records.push(AnnotationRecord {
            query,
            candidates,
            labels,
        });
    }

    info!("Read {} annotation records from {:?}", records.len(), path);
    Ok(records)
}
