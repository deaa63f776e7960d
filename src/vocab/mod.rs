//! Pretrained embedding table and vocabulary index
//!
//! Words are assigned dense integer IDs in file order. The padding ID is
//! one past the real vocabulary and owns a near-zero embedding row, so
//! padded positions contribute (almost) nothing to pooled representations.

use crate::corpus::open_text;
use crate::error::{QbatchError, Result};
use ahash::{HashMap, HashMapExt};
use ndarray::Array2;
use rand::Rng;
use std::io::BufRead;
use std::path::Path;
use tracing::info;

/// Integer token ID used throughout the crate
pub type TokenId = u32;

/// Reserved token string for the padding row
pub const PADDING_TOKEN: &str = "<padding>";

/// Embedding table with its vocabulary index
///
/// Row `i` of the value matrix is the vector for the word with ID `i`;
/// the final row belongs to the padding token.
#[derive(Debug)]
pub struct Embeddings {
    words: Vec<String>,
    vocab: HashMap<String, TokenId>,
    values: Array2<f32>,
    padding_id: TokenId,
}

impl Embeddings {
    /// Load embeddings from a `word v1 v2 ... vN` text file
    ///
    /// Files ending in `.gz` are gzip-decoded. Blank lines are skipped.
    /// A repeated word or an unparseable value is fatal. The padding row
    /// is appended last with small uniform noise drawn from `rng`.
    pub fn load(path: &Path, rng: &mut impl Rng) -> Result<Self> {
        let reader = open_text(path)?;

        let mut words = Vec::new();
        let mut vocab = HashMap::new();
        let mut flat: Vec<f32> = Vec::new();
        let mut dim: Option<usize> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| QbatchError::Io {
                source: e,
                context: format!("Failed to read embeddings from {:?}", path),
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            // Non-empty after trim, so the word is always present
            let word = parts.next().unwrap_or_default();
            let mut count = 0usize;
            for value in parts {
                let parsed: f32 =
                    value
                        .parse()
                        .map_err(|_| QbatchError::InvalidEmbeddingValue {
                            path: path.to_path_buf(),
                            line: idx + 1,
                            value: value.to_string(),
                        })?;
                flat.push(parsed);
                count += 1;
            }

            match dim {
                None => dim = Some(count),
                Some(expected) if expected != count => {
                    return Err(QbatchError::EmbeddingDimMismatch {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        expected,
                        found: count,
                    });
                }
                Some(_) => {}
            }

            if vocab.contains_key(word) {
                return Err(QbatchError::DuplicateWord {
                    word: word.to_string(),
                });
            }
            vocab.insert(word.to_string(), words.len() as TokenId);
            words.push(word.to_string());
        }

        let dim = dim.ok_or_else(|| QbatchError::EmptyEmbeddings {
            path: path.to_path_buf(),
        })?;

        // Padding row: small uniform noise, effectively invisible to pooling
        let padding_id = words.len() as TokenId;
        vocab.insert(PADDING_TOKEN.to_string(), padding_id);
        words.push(PADDING_TOKEN.to_string());
        for _ in 0..dim {
            flat.push(rng.gen_range(-0.05f32..0.05) * 0.001);
        }

        let rows = words.len();
        let values =
            Array2::from_shape_vec((rows, dim), flat).map_err(|e| QbatchError::Config(format!(
                "Embedding matrix shape error for {:?}: {}",
                path, e
            )))?;

        info!(
            "Loaded {} embeddings of dimension {} from {:?}",
            rows - 1,
            dim,
            path
        );

        Ok(Self {
            words,
            vocab,
            values,
            padding_id,
        })
    }

    /// Map a token string to its ID, if present
    pub fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.vocab.get(token).copied()
    }

    /// The reserved padding ID (equals the real vocabulary size)
    pub fn padding_id(&self) -> TokenId {
        self.padding_id
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.values.ncols()
    }

    /// Number of real words (excluding the padding row)
    pub fn len(&self) -> usize {
        self.words.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value matrix, one row per word, padding row last
    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Words in ID order, padding token last
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_embeddings(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_assigns_ids_in_order() {
        let file = write_embeddings("the 0.1 0.2\nquick 0.3 0.4\nfox 0.5 0.6\n");
        let mut rng = StdRng::seed_from_u64(1);
        let emb = Embeddings::load(file.path(), &mut rng).unwrap();

        assert_eq!(emb.token_to_id("the"), Some(0));
        assert_eq!(emb.token_to_id("quick"), Some(1));
        assert_eq!(emb.token_to_id("fox"), Some(2));
        assert_eq!(emb.token_to_id("dog"), None);
        assert_eq!(emb.dim(), 2);
    }

    #[test]
    fn test_padding_id_follows_vocabulary() {
        let file = write_embeddings("a 1.0\nb 2.0\n");
        let mut rng = StdRng::seed_from_u64(1);
        let emb = Embeddings::load(file.path(), &mut rng).unwrap();

        assert_eq!(emb.len(), 2);
        assert_eq!(emb.padding_id(), 2);
        assert_eq!(emb.values().nrows(), 3);
        assert_eq!(emb.token_to_id(PADDING_TOKEN), Some(2));

        // Padding row is near-zero noise
        let pad_row = emb.values().row(emb.padding_id() as usize);
        assert!(pad_row.iter().all(|v| v.abs() < 0.0001));
    }

    #[test]
    fn test_duplicate_word_is_fatal() {
        let file = write_embeddings("a 1.0\nb 2.0\na 3.0\n");
        let mut rng = StdRng::seed_from_u64(1);
        let err = Embeddings::load(file.path(), &mut rng).unwrap_err();
        assert!(matches!(err, QbatchError::DuplicateWord { word } if word == "a"));
    }

    #[test]
    fn test_bad_value_is_fatal() {
        let file = write_embeddings("a 1.0 oops\n");
        let mut rng = StdRng::seed_from_u64(1);
        let err = Embeddings::load(file.path(), &mut rng).unwrap_err();
        assert!(matches!(err, QbatchError::InvalidEmbeddingValue { .. }));
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let file = write_embeddings("a 1.0 2.0\nb 3.0\n");
        let mut rng = StdRng::seed_from_u64(1);
        let err = Embeddings::load(file.path(), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            QbatchError::EmbeddingDimMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_file_is_fatal() {
        let file = write_embeddings("");
        let mut rng = StdRng::seed_from_u64(1);
        let err = Embeddings::load(file.path(), &mut rng).unwrap_err();
        assert!(matches!(err, QbatchError::EmptyEmbeddings { .. }));
    }
}
