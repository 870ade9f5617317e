use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a farm is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Sale,
    Rent,
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::Sale => write!(f, "sale"),
            ListingKind::Rent => write!(f, "rent"),
        }
    }
}

/// Admin review state of a listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Core farm listing as served by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub farm_id: String,
    pub location: String,
    pub price: f64,
    /// Size in acres
    pub size: f64,
    pub quality: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub email: String,
    pub phone: String,
    pub kind: ListingKind,
    #[serde(default)]
    pub rent_duration: Option<String>,
    #[serde(default)]
    pub sold: bool,
    #[serde(default)]
    pub validation: ValidationStatus,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Listings a buyer may still purchase
    pub fn is_purchasable(&self) -> bool {
        self.kind == ListingKind::Sale && !self.sold
    }
}

/// Lifecycle of a purchase or rental request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl TransactionStatus {
    /// Transitions a seller may apply. Cancelled is terminal.
    pub fn can_become(self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Confirmed => write!(f, "confirmed"),
            TransactionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A recorded purchase or rental request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub listing: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub rent_duration: Option<String>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The access/refresh credentials issued on login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
