//! Raw corpus reading
//!
//! Each line is `id \t title \t body`. Files ending in `.gz` are
//! gzip-decoded transparently.

use crate::error::{QbatchError, Result};
use ahash::{HashMap, HashMapExt};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// One raw corpus entry: lowercased, whitespace-split tokens
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub title: Vec<String>,
    pub body: Vec<String>,
}

/// Question ID → raw entry
pub type RawCorpus = HashMap<String, RawEntry>;

/// Open a text file, decoding gzip when the path ends in `.gz`
pub(crate) fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| QbatchError::Io {
        source: e,
        context: format!("Failed to open {:?}", path),
    })?;

    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read the raw question corpus
///
/// Titles and bodies are lowercased and split on whitespace. A line
/// without exactly three tab-separated fields is a fatal parse error.
pub fn read_corpus(path: &Path) -> Result<RawCorpus> {
    let reader = open_text(path)?;
    let mut corpus = RawCorpus::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| QbatchError::Io {
            source: e,
            context: format!("Failed to read corpus from {:?}", path),
        })?;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(QbatchError::MalformedRecord {
                path: path.to_path_buf(),
                line: idx + 1,
                expected: 3,
                found: fields.len(),
            });
        }

        let entry = RawEntry {
            title: tokenize(fields[1]),
            body: tokenize(fields[2]),
        };
        corpus.insert(fields[0].to_string(), entry);
    }

    info!("Read {} corpus entries from {:?}", corpus.len(), path);
    Ok(corpus)
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
