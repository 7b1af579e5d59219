//! Directory boundary - the single place phone numbers are normalized.

use std::sync::Arc;

use anyhow::Result;

use crate::domains::verification::models::normalize_phone;
use crate::kernel::BaseDirectory;

/// Aadhaar → phone lookup returning numbers ready for the OTP provider.
#[derive(Clone)]
pub struct IdentityDirectory {
    store: Arc<dyn BaseDirectory>,
    country_code: String,
}

impl IdentityDirectory {
    pub fn new(store: Arc<dyn BaseDirectory>, country_code: impl Into<String>) -> Self {
        Self {
            store,
            country_code: country_code.into(),
        }
    }

    /// Look up the phone number registered for `id_number`, with the
    /// country-code prefix applied.
    pub async fn find_by_id(&self, id_number: &str) -> Result<Option<String>> {
        let raw = self.store.find_mobile(id_number).await?;
        Ok(raw.map(|mobile| normalize_phone(&mobile, &self.country_code)))
    }

    /// Check that the backing store is reachable
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
