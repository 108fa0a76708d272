//! Cell encodings for a `tensor<float>(token{}, x[dim])` style field.

use serde::{Serialize, Serializer};

use super::encoder::MultiVector;
use super::quantize::quantize;
use crate::corpus::Document;

/// Values at or below this magnitude are left out of query tensors.
pub const QUERY_CELL_EPSILON: f32 = 1e-6;

fn as_string<S: Serializer>(value: &usize, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// `(token_index, dimension_index)`, serialized with string labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellAddress {
    #[serde(serialize_with = "as_string")]
    pub token: usize,
    #[serde(serialize_with = "as_string")]
    pub x: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TensorCell<T> {
    pub address: CellAddress,
    pub value: T,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CellBlock<'a, T> {
    pub cells: &'a [TensorCell<T>],
}

/// Float and int8 encodings of one multi-vector.
///
/// Both are filled in the same pass over the same rows, so cell `i` of one always
/// addresses the same element as cell `i` of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTensors {
    pub float_cells: Vec<TensorCell<f32>>,
    pub int8_cells: Vec<TensorCell<i8>>,
}

impl DocumentTensors {
    /// Enumerates every cell of the `[0, tokens) x [0, dim)` box.
    pub fn from_multi_vector(mv: &MultiVector) -> Self {
        let cap = mv.num_tokens() * mv.dim();
        let mut float_cells = Vec::with_capacity(cap);
        let mut int8_cells = Vec::with_capacity(cap);

        for token in mv.tokens() {
            for (x, &value) in token.values.iter().enumerate() {
                let address = CellAddress {
                    token: token.token_index,
                    x,
                };
                float_cells.push(TensorCell { address, value });
                int8_cells.push(TensorCell {
                    address,
                    value: quantize(value),
                });
            }
        }

        Self {
            float_cells,
            int8_cells,
        }
    }

    pub fn len(&self) -> usize {
        self.float_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.float_cells.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct TensorFields<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub url: &'a str,
    pub token_embeddings: CellBlock<'a, f32>,
    pub compressed_embeddings: CellBlock<'a, i8>,
    pub timestamp: i64,
}

/// Document feed body: `{"fields": {...}}`.
#[derive(Debug, Serialize)]
pub struct TensorFeed<'a> {
    pub fields: TensorFields<'a>,
}

impl<'a> TensorFeed<'a> {
    pub fn new(doc: &'a Document, tensors: &'a DocumentTensors, timestamp: i64) -> Self {
        Self {
            fields: TensorFields {
                id: &doc.id,
                title: &doc.title,
                content: &doc.content,
                url: &doc.url,
                token_embeddings: CellBlock {
                    cells: &tensors.float_cells,
                },
                compressed_embeddings: CellBlock {
                    cells: &tensors.int8_cells,
                },
                timestamp,
            },
        }
    }
}

/// Literal form of a query tensor: `{{token:0,x:3}:0.25,...}`. Near-zero cells are
/// skipped.
pub fn format_query_tensor(mv: &MultiVector) -> String {
    let cells: Vec<String> = mv
        .tokens()
        .iter()
        .flat_map(|token| {
            token
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.abs() > QUERY_CELL_EPSILON)
                .map(move |(x, v)| format!("{{token:{},x:{}}}:{}", token.token_index, x, v))
        })
        .collect();

    format!("{{{}}}", cells.join(","))
}
