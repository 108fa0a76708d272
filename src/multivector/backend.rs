use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::encoder::{MultiVector, MultiVectorEncoder};
use super::error::TensorBackendError;
use super::tensor::{DocumentTensors, TensorFeed, format_query_tensor};
use crate::corpus::{Corpus, Document, IndexReport};

pub const DEFAULT_NAMESPACE: &str = "muvera";
pub const DEFAULT_DOCUMENT_TYPE: &str = "multi_vector_document";
pub const DEFAULT_RANK_PROFILE: &str = "default";

/// One ranked hit from the tensor backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorHit {
    pub doc_id: String,
    pub title: String,
    pub content: String,
    pub relevance: f32,
}

/// Store/query contract of a tensor-capable search service. Ranking happens remotely.
pub trait TensorBackend: Send + Sync + 'static {
    fn store(
        &self,
        doc: &Document,
        tensors: &DocumentTensors,
    ) -> impl Future<Output = Result<(), TensorBackendError>> + Send;

    fn query(
        &self,
        query: &MultiVector,
        hits: usize,
    ) -> impl Future<Output = Result<Vec<TensorHit>, TensorBackendError>> + Send;
}

/// HTTP client for a Vespa-style document and search API.
#[derive(Clone)]
pub struct VespaClient {
    http: reqwest::Client,
    base_url: String,
    namespace: String,
    document_type: String,
    rank_profile: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    root: SearchRoot,
}

#[derive(Debug, Default, Deserialize)]
struct SearchRoot {
    #[serde(default)]
    children: Vec<SearchChild>,
}

#[derive(Debug, Deserialize)]
struct SearchChild {
    #[serde(default)]
    relevance: f64,
    #[serde(default)]
    fields: ChildFields,
}

#[derive(Debug, Default, Deserialize)]
struct ChildFields {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

impl VespaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TensorBackendError> {
        let base_url = base_url.trim_end_matches('/');
        if let Err(e) = Url::parse(base_url) {
            return Err(TensorBackendError::InvalidConfig {
                reason: format!("invalid tensor backend url '{}': {}", base_url, e),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            rank_profile: DEFAULT_RANK_PROFILE.to_string(),
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    pub fn with_rank_profile(mut self, rank_profile: impl Into<String>) -> Self {
        self.rank_profile = rank_profile.into();
        self
    }

    /// Document API URL. Every path segment, including `doc_id`, is percent-encoded.
    pub fn document_url(&self, doc_id: &str) -> Result<Url, TensorBackendError> {
        let invalid = |reason: String| TensorBackendError::InvalidConfig { reason };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid(format!("'{}' cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend([
                "document",
                "v1",
                self.namespace.as_str(),
                self.document_type.as_str(),
                "docid",
                doc_id,
            ]);
        Ok(url)
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/", self.base_url)
    }
}

/// Reads hits from a search response body (`root.children[*]`).
pub fn parse_search_hits(body: &str) -> Result<Vec<TensorHit>, TensorBackendError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| TensorBackendError::InvalidResponse {
            message: e.to_string(),
        })?;

    Ok(response
        .root
        .children
        .into_iter()
        .map(|child| TensorHit {
            doc_id: child.fields.id,
            title: child.fields.title,
            content: child.fields.content,
            relevance: child.relevance as f32,
        })
        .collect())
}

impl TensorBackend for VespaClient {
    async fn store(&self, doc: &Document, tensors: &DocumentTensors) -> Result<(), TensorBackendError> {
        let feed = TensorFeed::new(doc, tensors, chrono::Utc::now().timestamp());

        let response = self
            .http
            .post(self.document_url(&doc.id)?)
            .json(&feed)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TensorBackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn query(&self, query: &MultiVector, hits: usize) -> Result<Vec<TensorHit>, TensorBackendError> {
        let yql = format!("select * from {} where true", self.document_type);
        let hits_param = hits.to_string();
        let tensor = format_query_tensor(query);

        let response = self
            .http
            .get(self.search_url())
            .query(&[
                ("yql", yql.as_str()),
                ("hits", hits_param.as_str()),
                ("ranking", self.rank_profile.as_str()),
                ("input.query(q_token_embeddings)", tensor.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TensorBackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        parse_search_hits(&body)
    }
}

/// Encodes documents and queries and hands them to a [`TensorBackend`].
pub struct TensorIndexer<T> {
    encoder: MultiVectorEncoder,
    backend: T,
}

impl<T: TensorBackend> TensorIndexer<T> {
    pub fn new(encoder: MultiVectorEncoder, backend: T) -> Self {
        Self { encoder, backend }
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }

    #[instrument(skip(self, doc), fields(doc_id = %doc.id))]
    pub async fn index_document(&self, doc: &Document) -> Result<(), TensorBackendError> {
        let mv = self.encoder.encode(&doc.searchable_text());
        let tensors = DocumentTensors::from_multi_vector(&mv);
        debug!(tokens = mv.num_tokens(), cells = tensors.len(), "Storing document tensors");
        self.backend.store(doc, &tensors).await
    }

    /// Stores every document; failures are counted, not fatal.
    pub async fn index_corpus(&self, corpus: &Corpus) -> IndexReport {
        let mut report = IndexReport::default();
        for doc in corpus.iter() {
            let result = self.index_document(doc).await;
            if let Err(ref e) = result {
                warn!(doc_id = %doc.id, error = %e, "Tensor indexing failed");
            }
            report.record(result.is_ok());
        }
        info!(indexed = report.indexed, failed = report.failed, "Tensor indexing finished");
        report
    }

    pub async fn search(&self, text: &str, hits: usize) -> Result<Vec<TensorHit>, TensorBackendError> {
        let mv = self.encoder.encode(text);
        self.backend.query(&mv, hits).await
    }
}
