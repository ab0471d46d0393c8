use serde::{Deserialize, Serialize};

use crate::db::{Document, StoreError};

/// Document field holding the buyer's email.
pub const BUYER_EMAIL: &str = "buyerEmail";

/// An order placed by a buyer.
///
/// Only `buyerEmail` is interpreted by the server; every other field is kept
/// as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub buyer_email: String,
    #[serde(flatten)]
    pub details: Document,
}

impl Order {
    pub fn to_document(&self) -> Result<Document, StoreError> {
        crate::db::to_document(self)
    }
}
