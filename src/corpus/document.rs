use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A retrievable document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub url: String,
    /// Unix seconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            url: String::new(),
            timestamp: 0,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Text used for embedding and token scoring: `"{title} {content}"`.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

/// Ordered, id-unique document collection.
///
/// Insertion order is significant: lexical ties and brute-force ties are broken by it.
#[derive(Debug, Default)]
pub struct Corpus {
    docs: Vec<Arc<Document>>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document. Returns `false` (and keeps the first copy) on a duplicate id.
    pub fn push(&mut self, doc: Document) -> bool {
        if self.by_id.contains_key(&doc.id) {
            warn!(doc_id = %doc.id, "Duplicate document id skipped");
            return false;
        }
        self.by_id.insert(doc.id.clone(), self.docs.len());
        self.docs.push(Arc::new(doc));
        true
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Document>> {
        self.by_id.get(id).map(|&idx| &self.docs[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.docs.iter()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for doc in iter {
            corpus.push(doc);
        }
        corpus
    }
}
