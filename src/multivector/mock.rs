use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use super::backend::{TensorBackend, TensorHit};
use super::encoder::{MultiVector, TokenVector, max_sim};
use super::error::TensorBackendError;
use super::tensor::DocumentTensors;
use crate::corpus::Document;

struct StoredTensor {
    document: Document,
    float: MultiVector,
    int8_cells: usize,
}

/// In-memory [`TensorBackend`] ranking by MaxSim over stored float cells.
#[derive(Default)]
pub struct MockTensorBackend {
    docs: RwLock<Vec<StoredTensor>>,
    failing: AtomicBool,
}

impl MockTensorBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Float and int8 cell counts stored for `doc_id`.
    pub fn cell_counts(&self, doc_id: &str) -> Option<(usize, usize)> {
        self.docs
            .read()
            .iter()
            .find(|d| d.document.id == doc_id)
            .map(|d| (d.float.num_tokens() * d.float.dim(), d.int8_cells))
    }
}

fn rows_from_cells(tensors: &DocumentTensors) -> MultiVector {
    let mut rows: Vec<TokenVector> = Vec::new();
    for cell in &tensors.float_cells {
        if rows.last().is_none_or(|r| r.token_index != cell.address.token) {
            rows.push(TokenVector {
                token_index: cell.address.token,
                values: Vec::new(),
            });
        }
        if let Some(row) = rows.last_mut() {
            row.values.push(cell.value);
        }
    }
    MultiVector::from_rows(rows)
}

impl TensorBackend for MockTensorBackend {
    async fn store(&self, doc: &Document, tensors: &DocumentTensors) -> Result<(), TensorBackendError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TensorBackendError::Rejected {
                status: 500,
                body: "injected failure".to_string(),
            });
        }

        let stored = StoredTensor {
            document: doc.clone(),
            float: rows_from_cells(tensors),
            int8_cells: tensors.int8_cells.len(),
        };

        let mut docs = self.docs.write();
        match docs.iter_mut().find(|d| d.document.id == doc.id) {
            Some(existing) => *existing = stored,
            None => docs.push(stored),
        }
        Ok(())
    }

    async fn query(&self, query: &MultiVector, hits: usize) -> Result<Vec<TensorHit>, TensorBackendError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TensorBackendError::Http {
                message: "injected failure".to_string(),
            });
        }

        let docs = self.docs.read();
        let mut ranked: Vec<TensorHit> = docs
            .iter()
            .map(|d| TensorHit {
                doc_id: d.document.id.clone(),
                title: d.document.title.clone(),
                content: d.document.content.clone(),
                relevance: max_sim(query, &d.float),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(hits);
        Ok(ranked)
    }
}
