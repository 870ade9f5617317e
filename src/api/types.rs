use crate::models::{ListingKind, TransactionStatus, ValidationStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Login form body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AccessToken {
    pub access: String,
}

/// A file picked by the user for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing the content type from its extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for(path).to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Everything the upload wizard sends in its single multipart request
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub farm_id: String,
    pub location: String,
    pub price: f64,
    pub size: f64,
    pub quality: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub kind: ListingKind,
    pub rent_duration: Option<String>,
    pub images: Vec<Attachment>,
    pub document: Option<Attachment>,
}

/// Partial listing edit; unset fields are left untouched by the backend
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationStatus>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ListingUpdate::default()
    }
}

/// Purchase or rental request body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewTransaction {
    pub listing: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_duration: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransactionUpdate {
    pub status: TransactionStatus,
}
