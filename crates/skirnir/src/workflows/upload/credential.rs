use chrono::{DateTime, Utc};

/// A time-boxed, write-only authorization for exactly one object in one
/// container.
///
/// The URL is opaque to this client; the backend embeds the permission and
/// scope in it. A credential is only valid for the object name and container
/// it was requested for, and never after `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredential {
    pub url: String,
    pub object_name: String,
    pub container: String,
    pub expires_at: DateTime<Utc>,
}

impl UploadCredential {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
