use super::*;
use crate::corpus::{Corpus, Document};

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[test]
fn test_empty_text_yields_single_zero_row() {
    let encoder = MultiVectorEncoder::default();

    for text in ["", "   ", "?!.,"] {
        let mv = encoder.encode(text);
        assert_eq!(mv.num_tokens(), 1);
        assert_eq!(mv.dim(), 128);
        assert_eq!(mv.tokens()[0].values, vec![0.0; 128]);
        assert!(mv.is_zero());
    }
}

#[test]
fn test_tokens_truncated_to_max() {
    let encoder = MultiVectorEncoder::new(16, 4).unwrap();
    let mv = encoder.encode("one two three four five six");

    assert_eq!(mv.num_tokens(), 4);
    let indices: Vec<_> = mv.tokens().iter().map(|t| t.token_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_token_vectors_normalized_and_deterministic() {
    let encoder = MultiVectorEncoder::new(32, 8).unwrap();
    let a = encoder.encode("Quantum computing");
    let b = encoder.encode("quantum COMPUTING");

    assert_eq!(a, b);
    for token in a.tokens() {
        assert_eq!(token.values.len(), 32);
        assert!((norm(&token.values) - 1.0).abs() < 1e-5);
    }
    assert_ne!(a.tokens()[0].values, a.tokens()[1].values);
}

#[test]
fn test_same_token_same_row_across_positions() {
    let encoder = MultiVectorEncoder::new(16, 8).unwrap();
    let mv = encoder.encode("data science data");
    assert_eq!(mv.tokens()[0].values, mv.tokens()[2].values);
}

#[test]
fn test_invalid_encoder_config() {
    assert!(matches!(
        MultiVectorEncoder::new(0, 32),
        Err(TensorBackendError::InvalidConfig { .. })
    ));
    assert!(MultiVectorEncoder::new(128, 0).is_err());
}

#[test]
fn test_quantize_clips_and_truncates() {
    assert_eq!(quantize(1.0), 127);
    assert_eq!(quantize(-1.0), -127);
    assert_eq!(quantize(2.5), 127);
    assert_eq!(quantize(-3.0), -127);
    assert_eq!(quantize(0.0), 0);
    // 0.5 * 127 = 63.5 -> 63
    assert_eq!(quantize(0.5), 63);
    assert_eq!(quantize(-0.5), -63);
}

#[test]
fn test_quantize_round_trip_error_bound() {
    let steps = 2000;
    for i in 0..=steps {
        let x = -1.0 + 2.0 * (i as f32 / steps as f32);
        let err = (dequantize(quantize(x)) - x).abs();
        assert!(err <= 1.0 / 127.0 + 1e-6, "x={x} err={err}");
    }
}

#[test]
fn test_tensor_cells_dense_and_aligned() {
    let encoder = MultiVectorEncoder::new(8, 4).unwrap();
    let mv = encoder.encode("alpha beta gamma");
    let tensors = DocumentTensors::from_multi_vector(&mv);

    assert_eq!(tensors.len(), 3 * 8);
    assert_eq!(tensors.int8_cells.len(), tensors.float_cells.len());

    for (i, (f, q)) in tensors
        .float_cells
        .iter()
        .zip(&tensors.int8_cells)
        .enumerate()
    {
        assert_eq!(f.address, q.address);
        assert_eq!(f.address.token, i / 8);
        assert_eq!(f.address.x, i % 8);
        assert_eq!(q.value, quantize(f.value));
    }
}

#[test]
fn test_zero_vector_tensor_has_one_row_of_cells() {
    let encoder = MultiVectorEncoder::new(4, 4).unwrap();
    let tensors = DocumentTensors::from_multi_vector(&encoder.encode(""));
    assert_eq!(tensors.len(), 4);
    assert!(tensors.int8_cells.iter().all(|c| c.value == 0));
}

#[test]
fn test_feed_serialization_shape() {
    let encoder = MultiVectorEncoder::new(2, 4).unwrap();
    let doc = Document::new("d1", "Title", "Body").with_url("https://example.com/d1");
    let tensors = DocumentTensors::from_multi_vector(&encoder.encode("word"));

    let json = serde_json::to_value(TensorFeed::new(&doc, &tensors, 42)).unwrap();
    let fields = &json["fields"];

    assert_eq!(fields["id"], "d1");
    assert_eq!(fields["url"], "https://example.com/d1");
    assert_eq!(fields["timestamp"], 42);

    let cell = &fields["token_embeddings"]["cells"][1];
    assert_eq!(cell["address"]["token"], "0");
    assert_eq!(cell["address"]["x"], "1");
    assert!(cell["value"].is_f64());

    let compressed = &fields["compressed_embeddings"]["cells"][0];
    assert!(compressed["value"].is_i64());
}

#[test]
fn test_format_query_tensor_skips_near_zero() {
    let mv = MultiVector::from_rows(vec![
        TokenVector {
            token_index: 0,
            values: vec![0.5, 0.0, -0.25],
        },
        TokenVector {
            token_index: 1,
            values: vec![1e-9, 1.0, 0.0],
        },
    ]);

    assert_eq!(
        format_query_tensor(&mv),
        "{{token:0,x:0}:0.5,{token:0,x:2}:-0.25,{token:1,x:1}:1}"
    );
    assert_eq!(format_query_tensor(&MultiVector::zero(3)), "{}");
}

#[test]
fn test_parse_search_hits() {
    let body = r#"{
        "root": {
            "children": [
                {"relevance": 12.5, "fields": {"id": "a", "title": "A", "content": "aa"}},
                {"relevance": 3.0, "fields": {"id": "b"}}
            ]
        }
    }"#;

    let hits = parse_search_hits(body).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].doc_id, "a");
    assert_eq!(hits[0].relevance, 12.5);
    assert_eq!(hits[1].title, "");

    assert!(parse_search_hits(r#"{"root": {}}"#).unwrap().is_empty());
    assert!(matches!(
        parse_search_hits("not json"),
        Err(TensorBackendError::InvalidResponse { .. })
    ));
}

#[test]
fn test_vespa_urls() {
    let client = VespaClient::new("http://localhost:8080/", std::time::Duration::from_secs(1))
        .unwrap()
        .with_namespace("ns")
        .with_document_type("multi_vector_document");

    assert_eq!(
        client.document_url("doc_1").unwrap().as_str(),
        "http://localhost:8080/document/v1/ns/multi_vector_document/docid/doc_1"
    );
    assert_eq!(client.search_url(), "http://localhost:8080/search/");
}

#[test]
fn test_document_url_escapes_id() {
    let client = VespaClient::new("http://localhost:8080/vespa/", std::time::Duration::from_secs(1))
        .unwrap();

    let url = client.document_url("a/b?c#d").unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/vespa/document/v1/muvera/multi_vector_document/docid/a%2Fb%3Fc%23d"
    );
    assert_eq!(url.path_segments().unwrap().last(), Some("a%2Fb%3Fc%23d"));
    assert!(url.query().is_none());
    assert!(url.fragment().is_none());
}

#[test]
fn test_invalid_base_url_rejected() {
    assert!(matches!(
        VespaClient::new("not a url", std::time::Duration::from_secs(1)),
        Err(TensorBackendError::InvalidConfig { .. })
    ));
}

#[test]
fn test_max_sim_prefers_shared_tokens() {
    let encoder = MultiVectorEncoder::new(64, 16).unwrap();
    let query = encoder.encode("quantum computing");
    let related = encoder.encode("advances in quantum computing hardware");
    let unrelated = encoder.encode("gardening tips for tomatoes");

    assert!(max_sim(&query, &related) > max_sim(&query, &unrelated));
    assert!((max_sim(&query, &related) - 2.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_indexer_stores_and_ranks() {
    let encoder = MultiVectorEncoder::new(64, 16).unwrap();
    let indexer = TensorIndexer::new(encoder, MockTensorBackend::new());

    let corpus: Corpus = vec![
        Document::new("garden", "Gardening", "Tomatoes and soil"),
        Document::new("quantum", "Quantum Computing", "Qubits and gates"),
    ]
    .into_iter()
    .collect();

    let report = indexer.index_corpus(&corpus).await;
    assert_eq!(report.indexed, 2);
    assert_eq!(report.failed, 0);

    let (float_cells, int8_cells) = indexer.backend().cell_counts("quantum").unwrap();
    assert_eq!(float_cells, int8_cells);
    assert_eq!(float_cells, 5 * 64);

    let hits = indexer.search("quantum computing", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "quantum");
}

#[tokio::test]
async fn test_indexer_counts_failures() {
    let backend = MockTensorBackend::new();
    backend.set_failing(true);
    let indexer = TensorIndexer::new(MultiVectorEncoder::default(), backend);

    let corpus: Corpus = vec![Document::new("a", "A", "a")].into_iter().collect();
    let report = indexer.index_corpus(&corpus).await;

    assert_eq!(report.indexed, 0);
    assert_eq!(report.failed, 1);
    assert!(indexer.backend().is_empty());
    assert!(indexer.search("a", 5).await.is_err());
}

#[tokio::test]
async fn test_reindex_overwrites() {
    let indexer = TensorIndexer::new(
        MultiVectorEncoder::new(8, 4).unwrap(),
        MockTensorBackend::new(),
    );
    let doc = Document::new("a", "A", "a");
    indexer.index_document(&doc).await.unwrap();
    indexer.index_document(&doc).await.unwrap();
    assert_eq!(indexer.backend().len(), 1);
}
