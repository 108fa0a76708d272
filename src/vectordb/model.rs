use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{ScoredPoint, Value};
use serde::Serialize;
use std::collections::HashMap;

use crate::corpus::Document;
use crate::hashing::point_id_for;

/// A document vector ready for upsert. The point id is derived from the document id,
/// so re-upserting the same document overwrites it.
#[derive(Debug, Clone)]
pub struct DocumentPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub document: Document,
}

impl DocumentPoint {
    pub fn from_document(document: &Document, vector: Vec<f32>) -> Self {
        Self {
            id: point_id_for(&document.id),
            vector,
            document: document.clone(),
        }
    }

    /// Payload stored next to the vector.
    pub fn payload(&self) -> HashMap<String, Value> {
        let doc = &self.document;
        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert("doc_id".to_string(), doc.id.clone().into());
        payload.insert("title".to_string(), doc.title.clone().into());
        payload.insert("content".to_string(), doc.content.clone().into());
        payload.insert("url".to_string(), doc.url.clone().into());
        payload.insert("timestamp".to_string(), doc.timestamp.into());
        payload
    }
}

/// One hit returned by the vector backend. `score` is cosine similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: u64,
    pub score: f32,
    pub document: Document,
}

impl SearchResult {
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n,
            _ => return None,
        };

        let payload = point.payload;
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_default()
        };

        let doc_id = payload.get("doc_id").and_then(|v| v.as_str())?.to_string();
        let title = {
            let t = text("title");
            if t.is_empty() { "Untitled".to_string() } else { t }
        };
        let timestamp = payload
            .get("timestamp")
            .and_then(|v| v.as_integer())
            .unwrap_or(0);

        Some(SearchResult {
            id,
            score: point.score,
            document: Document::new(doc_id, title, text("content"))
                .with_url(text("url"))
                .with_timestamp(timestamp),
        })
    }
}

/// Collection summary used by status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub name: String,
    pub status: String,
    pub points_count: u64,
    pub indexed_vectors_count: u64,
}
