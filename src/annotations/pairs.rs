//! Cross-domain pair annotations
//!
//! The adaptation corpus ships separate positive-pair and negative-pair
//! files instead of per-query annotation lines. Records are synthesized
//! from the two pair maps: `k_neg` sampled negatives followed by one
//! sampled positive.

use super::AnnotationRecord;
use crate::corpus::open_text;
use crate::error::{QbatchError, Result};
use ahash::{HashMap, HashMapExt};
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

/// Query ID → candidate IDs, accumulated from a pair file
pub type PairMap = HashMap<String, Vec<String>>;

/// Read a whitespace-separated `query_id candidate_id` pair file
///
/// Multiple lines for the same query accumulate into one candidate list.
pub fn read_pair_file(path: &Path) -> Result<PairMap> {
    let reader = open_text(path)?;
    let mut pairs = PairMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| QbatchError::Io {
            source: e,
            context: format!("Failed to read pairs from {:?}", path),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(QbatchError::MalformedRecord {
                path: path.to_path_buf(),
                line: idx + 1,
                expected: 2,
                found: fields.len(),
            });
        }

        pairs
            .entry(fields[0].to_string())
            .or_default()
            .push(fields[1].to_string());
    }

    info!("Read pairs for {} queries from {:?}", pairs.len(), path);
    Ok(pairs)
}

/// Synthesize annotation records from positive and negative pair maps
///
/// One record per query with a non-empty positive list and at least
/// `k_neg` negatives: both lists are shuffled, then the record carries
/// `k_neg` negatives (label 0) followed by one positive (label 1).
/// Queries are visited in sorted order so a seeded RNG yields the same
/// records on every call.
pub fn pair_annotations(
    positives: &PairMap,
    negatives: &PairMap,
    k_neg: usize,
    rng: &mut impl Rng,
) -> Vec<AnnotationRecord> {
    let mut queries: Vec<&String> = positives.keys().collect();
    queries.sort();

    let mut records = Vec::new();
    for query in queries {
        let Some(neg) = negatives.get(query) else {
            continue;
        };
        if neg.len() < k_neg {
            debug!(
                "Skipping query {} with only {} negatives (need {})",
                query,
                neg.len(),
                k_neg
            );
            continue;
        }
        let mut pos = positives[query].clone();
        if pos.is_empty() {
            continue;
        }
        pos.shuffle(rng);

        let mut neg = neg.clone();
        neg.shuffle(rng);
        neg.truncate(k_neg);

        let mut candidates = neg;
        candidates.push(pos[0].clone());
        let mut labels = vec![0u8; k_neg];
        labels.push(1);

        records.push(AnnotationRecord {
            query: query.clone(),
            candidates,
            labels,
        });
    }

    info!("Synthesized {} pair annotation records", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pair_map(entries: &[(&str, &[&str])]) -> PairMap {
        let mut map = PairMap::new();
        for (query, candidates) in entries {
            map.insert(
                query.to_string(),
                candidates.iter().map(|c| c.to_string()).collect(),
            );
        }
        map
    }

    #[test]
    fn test_read_pair_file_accumulates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "q1 a").unwrap();
        writeln!(file, "q1 b").unwrap();
        writeln!(file, "q2 c").unwrap();
        file.flush().unwrap();

        let pairs = read_pair_file(file.path()).unwrap();
        assert_eq!(pairs["q1"], vec!["a", "b"]);
        assert_eq!(pairs["q2"], vec!["c"]);
    }

    #[test]
    fn test_read_pair_file_single_field_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "lonely").unwrap();
        file.flush().unwrap();

        let err = read_pair_file(file.path()).unwrap_err();
        assert!(matches!(err, QbatchError::MalformedRecord { found: 1, .. }));
    }

    #[test]
    fn test_pair_annotations_shape() {
        let positives = pair_map(&[("q1", &["p1", "p2"])]);
        let negatives = pair_map(&[("q1", &["n1", "n2", "n3", "n4"])]);

        let mut rng = StdRng::seed_from_u64(5);
        let records = pair_annotations(&positives, &negatives, 3, &mut rng);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.candidates.len(), 4);
        assert_eq!(record.labels, vec![0, 0, 0, 1]);
        // The last candidate is one of the query's positives
        assert!(["p1", "p2"].contains(&record.candidates[3].as_str()));
    }

    #[test]
    fn test_pair_annotations_skips_thin_negatives() {
        let positives = pair_map(&[("q1", &["p1"]), ("q2", &["p2"])]);
        let negatives = pair_map(&[("q1", &["n1"]), ("q2", &["n1", "n2", "n3"])]);

        let mut rng = StdRng::seed_from_u64(5);
        let records = pair_annotations(&positives, &negatives, 3, &mut rng);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query, "q2");
    }

    #[test]
    fn test_pair_annotations_reproducible() {
        let positives = pair_map(&[("q1", &["p1", "p2", "p3"])]);
        let negatives = pair_map(&[("q1", &["n1", "n2", "n3", "n4", "n5"])]);

        let mut rng_a = StdRng::seed_from_u64(17);
        let mut rng_b = StdRng::seed_from_u64(17);
        let a = pair_annotations(&positives, &negatives, 2, &mut rng_a);
        let b = pair_annotations(&positives, &negatives, 2, &mut rng_b);

        assert_eq!(a[0].candidates, b[0].candidates);
    }
}
