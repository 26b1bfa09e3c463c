//! Invocation results.

use crate::error::Result;
use crate::query::QueryResult;
use serde::{Deserialize, Serialize};

/// Status of a successful invocation.
pub const OK: u16 = 200;

/// Status of a failed invocation.
pub const ERROR: u16 = 500;

/// What a handler produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Rows of a range or index query.
    Query(QueryResult),
    /// A single stored record; `None` when the key holds nothing.
    Record(Option<Vec<u8>>),
    /// Nothing to return.
    Unit,
}

impl Response {
    /// Bytes handed back to the caller. Query results use the write-through
    /// JSON encoding; a missing record or unit yields an empty payload.
    pub fn into_payload(self) -> Vec<u8> {
        match self {
            Response::Query(result) => result.to_write_through_json(),
            Response::Record(record) => record.unwrap_or_default(),
            Response::Unit => Vec::new(),
        }
    }

    pub fn as_query(&self) -> Option<&QueryResult> {
        match self {
            Response::Query(result) => Some(result),
            _ => None,
        }
    }
}

/// Shim-facing outcome: a status, a message for failures, and the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeResponse {
    pub status: u16,
    pub message: String,
    pub payload: Vec<u8>,
}

impl ChaincodeResponse {
    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    /// Success with the response payload, or status 500 with the error text.
    pub fn from_result(result: Result<Response>) -> Self {
        match result {
            Ok(response) => Self::success(response.into_payload()),
            Err(e) => Self::error(e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OK
    }
}
