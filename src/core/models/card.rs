use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Virtual payment card returned by `generatePaymentCard`. Ephemeral: the
/// client keeps only the most recently generated card in view state and a
/// repeat call simply replaces it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard {
    pub id: String,
    pub card_number: String,
    pub amount: f64,
    /// Server-owned status string, shown as-is.
    pub status: String,
    pub created_at: DateTime<Utc>,
}
