//! Network messages - communication between App and Network layers

use crate::error::ExecutionError;
use crate::models::{RecordId, RequestDefinition, Response};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute the request of one record
    ExecuteRequest {
        id: u64,
        record: RecordId,
        request: RequestDefinition,
    },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// A dispatched request finished, one way or the other
    Completed {
        id: u64,
        record: RecordId,
        result: Result<Response, ExecutionError>,
    },
}

impl NetworkResponse {
    /// Get the dispatch ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
        }
    }
}
