// Loads raw vector dumps into a Vocabulary
//
// A model directory has one shard per letter (a.txt .. z.txt). Each shard is a
// run of records shaped like `word [0.1 -0.2 ... 0.3]`.

use crate::error::{Result, WordArithError};
use crate::model::{Embedding, Vocabulary};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

// Words carrying these are URLs, emails, abbreviations. Not useful here.
const EXCLUDED_CHARS: &[char] = &['@', '.'];

/// Parse the text of one shard
///
/// Bad records are skipped, never fatal.
pub fn parse_shard(text: &str, dimension: usize) -> Vec<(String, Embedding)> {
    let mut entries = Vec::new();

    for record in text.split(']') {
        let Some((word, values)) = record.split_once('[') else {
            continue;
        };

        let word = word.trim();
        if word.is_empty() || word.contains(EXCLUDED_CHARS) {
            continue;
        }

        let parts: Vec<&str> = values.split_whitespace().collect();
        if parts.len() != dimension {
            debug!(word, got = parts.len(), "skipping record with wrong dimension");
            continue;
        }

        let parsed: std::result::Result<Vec<f64>, _> =
            parts.iter().map(|p| p.parse::<f64>()).collect();

        match parsed {
            Ok(values) if values.iter().all(|v| v.is_finite()) => {
                entries.push((word.to_string(), Embedding::from_vec(values)))
            }
            Ok(_) => warn!(word, "skipping record with non-finite value"),
            Err(e) => warn!(word, error = %e, "skipping record with unparsable value"),
        }
    }

    entries
}

/// Path of the shard holding words that start with `letter`
pub fn shard_path(dir: &Path, letter: char) -> PathBuf {
    dir.join(format!("{}.txt", letter))
}

/// Load every shard under `dir` concurrently
///
/// Missing or unreadable shards are logged and skipped. Shards are merged in
/// letter order so duplicate words resolve the same way on every load.
///
/// # Returns
/// * `Ok(Vocabulary)` - At least one entry was loaded
/// * `Err(WordArithError::EmptyVocabulary)` - Nothing usable was found
pub async fn load_dir<P: AsRef<Path>>(dir: P, dimension: usize) -> Result<Vocabulary> {
    let dir = dir.as_ref().to_path_buf();
    let mut tasks = JoinSet::new();

    for letter in 'a'..='z' {
        let path = shard_path(&dir, letter);
        tasks.spawn(async move {
            let shard = match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    match tokio::task::spawn_blocking(move || parse_shard(&text, dimension))
                        .await
                    {
                        Ok(entries) => entries,
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "shard parse failed");
                            Vec::new()
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read shard");
                    Vec::new()
                }
            };
            (letter, shard)
        });
    }

    let mut shards = Vec::with_capacity(26);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(shard) => shards.push(shard),
            Err(e) => warn!(error = %e, "shard task failed"),
        }
    }
    shards.sort_by_key(|(letter, _)| *letter);

    let vocabulary = Vocabulary::from_entries(
        dimension,
        shards.into_iter().flat_map(|(_, entries)| entries),
    );

    if vocabulary.is_empty() {
        return Err(WordArithError::EmptyVocabulary(dir.display().to_string()));
    }

    info!(
        words = vocabulary.len(),
        dimension,
        dir = %dir.display(),
        "vocabulary loaded"
    );

    Ok(vocabulary)
}
