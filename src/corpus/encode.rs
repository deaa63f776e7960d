//! Token-ID encoding of the raw corpus

use super::RawCorpus;
use crate::vocab::{Embeddings, TokenId};
use ahash::{HashMap, HashMapExt};
use tracing::info;

/// Encoded corpus entry: title and body as token-ID sequences
///
/// The body is truncated to the configured maximum length at encode time;
/// titles are kept whole.
#[derive(Debug, Clone)]
pub struct EncodedEntry {
    pub title: Vec<TokenId>,
    pub body: Vec<TokenId>,
}

/// Question ID → encoded (title, body)
///
/// Built once, then shared read-only by every batch-building call.
#[derive(Debug, Default)]
pub struct IdsCorpus {
    entries: HashMap<String, EncodedEntry>,
}

impl IdsCorpus {
    /// Encode a raw corpus against an embedding vocabulary
    ///
    /// Tokens missing from the vocabulary are skipped; bodies are
    /// truncated to `max_body_len`.
    pub fn encode(embeddings: &Embeddings, raw: &RawCorpus, max_body_len: usize) -> Self {
        let mut entries = HashMap::with_capacity(raw.len());

        for (id, entry) in raw {
            let title = encode_tokens(embeddings, &entry.title);
            let mut body = encode_tokens(embeddings, &entry.body);
            body.truncate(max_body_len);
            entries.insert(id.clone(), EncodedEntry { title, body });
        }

        info!("Encoded {} corpus entries", entries.len());
        Self { entries }
    }

    /// Build directly from encoded entries (fixtures, precomputed corpora)
    pub fn from_entries(entries: impl IntoIterator<Item = (String, EncodedEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Look up an entry; absence is a normal branch, not an error
    pub fn get(&self, id: &str) -> Option<&EncodedEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn encode_tokens(embeddings: &Embeddings, tokens: &[String]) -> Vec<TokenId> {
    tokens
        .iter()
        .filter_map(|token| embeddings.token_to_id(token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::RawEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_embeddings() -> Embeddings {
        let mut file = NamedTempFile::new().unwrap();
        for word in ["how", "do", "i", "install", "a", "driver"] {
            writeln!(file, "{} 0.1 0.2", word).unwrap();
        }
        file.flush().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        Embeddings::load(file.path(), &mut rng).unwrap()
    }

    fn raw_entry(title: &str, body: &str) -> RawEntry {
        RawEntry {
            title: title.split_whitespace().map(str::to_string).collect(),
            body: body.split_whitespace().map(str::to_string).collect(),
        }
    }

    #[test]
    fn test_encode_skips_unknown_tokens() {
        let emb = test_embeddings();
        let mut raw = RawCorpus::new();
        raw.insert(
            "1".to_string(),
            raw_entry("how do i frobnicate", "install a driver"),
        );

        let corpus = IdsCorpus::encode(&emb, &raw, 100);
        let entry = corpus.get("1").unwrap();

        // "frobnicate" is out of vocabulary and silently dropped
        assert_eq!(entry.title.len(), 3);
        assert_eq!(entry.body.len(), 3);
    }

    #[test]
    fn test_encode_truncates_body_not_title() {
        let emb = test_embeddings();
        let mut raw = RawCorpus::new();
        raw.insert(
            "1".to_string(),
            raw_entry("how do i install a driver", "how do i install a driver"),
        );

        let corpus = IdsCorpus::encode(&emb, &raw, 2);
        let entry = corpus.get("1").unwrap();

        assert_eq!(entry.title.len(), 6);
        assert_eq!(entry.body.len(), 2);
    }

    #[test]
    fn test_lookup_absent_is_none() {
        let corpus = IdsCorpus::default();
        assert!(corpus.get("missing").is_none());
        assert!(corpus.is_empty());
    }
}
