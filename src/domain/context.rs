//! Operation Context
//!
//! Carries the pre-resolved caller identity and tracing metadata for one request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Context for an operation, used for authorization and tracing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationContext {
    /// Authenticated client, resolved upstream (X-Client-Id header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new anonymous context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context acting on behalf of a client
    pub fn for_client(client_id: Uuid) -> Self {
        Self::new().with_client(client_id)
    }

    pub fn with_client(mut self, client_id: Uuid) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// The caller's client id, or `Unauthenticated` when absent
    pub fn require_client(&self) -> Result<Uuid, DomainError> {
        self.client_id.ok_or(DomainError::Unauthenticated)
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}
