//! Padding and stacking primitives
//!
//! Sequence batches are right-padded with the reserved padding ID.
//! Triple rows are edge-padded by repeating their own last index, so a
//! padded slot always references a question that is really in the batch;
//! the padding ID never appears in a triple matrix.

use super::BatchError;
use crate::vocab::TokenId;
use ndarray::Array2;

/// Pad and stack parallel title/body sequence lists
///
/// Max title and body lengths are computed independently, each at least
/// 1. Column `i` of both outputs is the sequence for local index `i`.
pub fn pad_sequence_batch(
    titles: &[Vec<TokenId>],
    bodies: &[Vec<TokenId>],
    padding_id: TokenId,
) -> Result<(Array2<TokenId>, Array2<TokenId>), BatchError> {
    if titles.len() != bodies.len() {
        return Err(BatchError::SequenceCountMismatch {
            titles: titles.len(),
            bodies: bodies.len(),
        });
    }
    if titles.is_empty() {
        return Err(BatchError::EmptySequenceBatch);
    }

    Ok((pad_columns(titles, padding_id), pad_columns(bodies, padding_id)))
}

fn pad_columns(sequences: &[Vec<TokenId>], padding_id: TokenId) -> Array2<TokenId> {
    let max_len = sequences
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(1);

    let mut stacked = Array2::from_elem((max_len, sequences.len()), padding_id);
    for (col, sequence) in sequences.iter().enumerate() {
        for (row, &id) in sequence.iter().enumerate() {
            stacked[[row, col]] = id;
        }
    }
    stacked
}

/// Pad and stack hinge-triple index rows
///
/// Each row is right-padded to the batch maximum by repeating its own
/// final value. Empty input or an empty row is a caller contract
/// violation and fails fast.
pub fn pad_triple_batch(rows: &[Vec<usize>]) -> Result<Array2<usize>, BatchError> {
    if rows.is_empty() {
        return Err(BatchError::EmptyTripleSet);
    }

    let mut max_len = 0;
    for (idx, row) in rows.iter().enumerate() {
        if row.is_empty() {
            return Err(BatchError::EmptyTripleRow { row: idx });
        }
        max_len = max_len.max(row.len());
    }

    let mut stacked = Array2::zeros((rows.len(), max_len));
    for (idx, row) in rows.iter().enumerate() {
        if let Some(&last) = row.last() {
            for col in 0..max_len {
                stacked[[idx, col]] = row.get(col).copied().unwrap_or(last);
            }
        }
    }
    Ok(stacked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_sequence_batch_shapes() {
        let titles = vec![vec![1, 2, 3], vec![4]];
        let bodies = vec![vec![5, 6], vec![7, 8, 9, 10]];

        let (t, b) = pad_sequence_batch(&titles, &bodies, 99).unwrap();

        // Max lengths computed independently
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(b.shape(), &[4, 2]);
    }

    #[test]
    fn test_pad_sequence_batch_column_order() {
        let titles = vec![vec![1, 2], vec![3]];
        let bodies = vec![vec![4], vec![5]];

        let (t, _) = pad_sequence_batch(&titles, &bodies, 99).unwrap();

        assert_eq!(t.column(0).to_vec(), vec![1, 2]);
        assert_eq!(t.column(1).to_vec(), vec![3, 99]);
    }

    #[test]
    fn test_padding_round_trip() {
        // Stripping trailing padding IDs from a column reproduces the
        // original sequence
        let titles = vec![vec![1, 2, 3, 4], vec![5], vec![6, 7]];
        let bodies = vec![vec![1], vec![1], vec![1]];

        let (t, _) = pad_sequence_batch(&titles, &bodies, 0xFFFF).unwrap();

        for (col, original) in titles.iter().enumerate() {
            let mut stripped = t.column(col).to_vec();
            while stripped.last() == Some(&0xFFFF) {
                stripped.pop();
            }
            assert_eq!(&stripped, original);
        }
    }

    #[test]
    fn test_empty_sequences_pad_to_one_row() {
        let titles = vec![vec![], vec![]];
        let bodies = vec![vec![], vec![]];

        let (t, b) = pad_sequence_batch(&titles, &bodies, 7).unwrap();

        assert_eq!(t.shape(), &[1, 2]);
        assert_eq!(b.shape(), &[1, 2]);
        assert!(t.iter().all(|&id| id == 7));
    }

    #[test]
    fn test_mismatched_lists_fail_fast() {
        let titles = vec![vec![1]];
        let bodies = vec![vec![1], vec![2]];

        let err = pad_sequence_batch(&titles, &bodies, 0).unwrap_err();
        assert!(matches!(
            err,
            BatchError::SequenceCountMismatch {
                titles: 1,
                bodies: 2
            }
        ));
    }

    #[test]
    fn test_empty_batch_fails_fast() {
        let err = pad_sequence_batch(&[], &[], 0).unwrap_err();
        assert!(matches!(err, BatchError::EmptySequenceBatch));
    }

    #[test]
    fn test_pad_triple_batch_edge_padding() {
        let rows = vec![vec![0, 1, 2, 3], vec![4, 5]];

        let triples = pad_triple_batch(&rows).unwrap();

        assert_eq!(triples.shape(), &[2, 4]);
        assert_eq!(triples.row(0).to_vec(), vec![0, 1, 2, 3]);
        // Short row repeats its own last value, never a filler
        assert_eq!(triples.row(1).to_vec(), vec![4, 5, 5, 5]);
    }

    #[test]
    fn test_triple_padding_stays_within_row() {
        let rows = vec![vec![0, 1], vec![2, 3, 4], vec![5, 6, 7, 8, 9]];

        let triples = pad_triple_batch(&rows).unwrap();

        for (idx, row) in rows.iter().enumerate() {
            for col in row.len()..triples.ncols() {
                assert_eq!(triples[[idx, col]], *row.last().unwrap());
            }
        }
    }

    #[test]
    fn test_empty_triple_set_fails_fast() {
        let err = pad_triple_batch(&[]).unwrap_err();
        assert!(matches!(err, BatchError::EmptyTripleSet));
    }

    #[test]
    fn test_empty_triple_row_fails_fast() {
        let rows = vec![vec![0, 1], vec![]];
        let err = pad_triple_batch(&rows).unwrap_err();
        assert!(matches!(err, BatchError::EmptyTripleRow { row: 1 }));
    }
}
