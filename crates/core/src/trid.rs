//! EPP transaction identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_object::ValueObject;

/// Transaction id pair attached to an EPP command.
///
/// The server id is always present; the client id is whatever the client sent
/// in `<clTRID>`, which is optional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trid {
    server_transaction_id: String,
    client_transaction_id: Option<String>,
}

impl Trid {
    pub fn create(
        client_transaction_id: Option<String>,
        server_transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            server_transaction_id: server_transaction_id.into(),
            client_transaction_id,
        }
    }

    /// Mint a fresh server transaction id for the given client id.
    pub fn generate(client_transaction_id: Option<String>) -> Self {
        Self::create(client_transaction_id, format!("srv-{}", Uuid::now_v7().simple()))
    }

    pub fn server_transaction_id(&self) -> &str {
        &self.server_transaction_id
    }

    pub fn client_transaction_id(&self) -> Option<&str> {
        self.client_transaction_id.as_deref()
    }
}

impl ValueObject for Trid {}
