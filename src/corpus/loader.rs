use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use super::{Corpus, CorpusError, Document};

/// Topics of the built-in demonstration corpus.
pub const SAMPLE_TOPICS: [&str; 10] = [
    "Artificial Intelligence and Machine Learning",
    "Climate Change and Environmental Science",
    "Space Exploration and Astronomy",
    "Quantum Computing and Physics",
    "Biotechnology and Genetics",
    "Renewable Energy Technologies",
    "Cybersecurity and Privacy",
    "Blockchain and Cryptocurrency",
    "Medical Research and Healthcare",
    "Robotics and Automation",
];

const SAMPLE_DOCS_PER_TOPIC: usize = 50;

/// Reads one JSON document per line. Blank lines are skipped.
pub fn load_jsonl(path: &Path) -> Result<Corpus, CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut corpus = Corpus::new();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(&line).map_err(|source| CorpusError::Parse {
            line: idx + 1,
            source,
        })?;
        corpus.push(doc);
    }

    Ok(corpus)
}

/// Synthetic corpus: 10 topics x 50 papers, ids `doc_{topic}_{n}`.
pub fn sample_corpus() -> Corpus {
    let now = chrono::Utc::now().timestamp();

    SAMPLE_TOPICS
        .iter()
        .enumerate()
        .flat_map(|(i, topic)| {
            (0..SAMPLE_DOCS_PER_TOPIC).map(move |j| {
                let doc_id = format!("doc_{}_{}", i, j);
                let content = format!(
                    "This is a comprehensive research document about {}. \
                     It covers the latest developments, methodologies, and future directions \
                     in the field. The paper discusses various aspects including theoretical \
                     foundations, practical applications, and emerging trends. Document {} \
                     of the {} collection provides detailed insights and analysis.",
                    topic.to_lowercase(),
                    j + 1,
                    topic
                );
                Document::new(
                    doc_id.clone(),
                    format!("{} Research Paper {}", topic, j + 1),
                    content,
                )
                .with_url(format!("https://example.com/research/{}", doc_id))
                .with_timestamp(now)
            })
        })
        .collect()
}

/// Loads `processed/passages.jsonl` under `data_dir`, or the sample corpus when that
/// file is missing or unreadable.
pub fn load_or_sample(data_dir: &Path) -> Corpus {
    let path = data_dir.join("processed").join("passages.jsonl");

    if !path.exists() {
        let corpus = sample_corpus();
        info!(documents = corpus.len(), "No processed corpus found, using sample documents");
        return corpus;
    }

    match load_jsonl(&path) {
        Ok(corpus) => {
            info!(documents = corpus.len(), path = %path.display(), "Loaded corpus");
            corpus
        }
        Err(e) => {
            warn!(error = %e, "Failed to load corpus, using sample documents");
            sample_corpus()
        }
    }
}
