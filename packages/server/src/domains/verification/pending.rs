//! Pending verification stores - link a send step to its check step.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// How a confirm call finds the phone number its code should be checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMode {
    /// One process-wide slot holding the last number an OTP was sent to
    Shared,
    /// Per-attempt id returned by send and echoed back on verify
    Token,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown correlation mode `{0}`")]
pub struct UnknownCorrelationMode(String);

impl FromStr for CorrelationMode {
    type Err = UnknownCorrelationMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(CorrelationMode::Shared),
            "token" => Ok(CorrelationMode::Token),
            other => Err(UnknownCorrelationMode(other.to_string())),
        }
    }
}

pub trait PendingVerifications: Send + Sync {
    /// Remember that an OTP is about to be sent to `phone_number`.
    /// Returns the id the caller must echo back, if this store issues one.
    fn begin(&self, phone_number: &str) -> Option<Uuid>;

    /// Phone number the next check should run against.
    fn lookup(&self, verification_id: Option<Uuid>) -> Option<String>;

    /// Called after the provider approved a code.
    fn complete(&self, verification_id: Option<Uuid>);

    fn mode(&self) -> CorrelationMode;
}

/// Single unscoped slot.
///
/// Every `begin` overwrites it and nothing ever clears it, so concurrent
/// callers share one number: a confirm is checked against whichever send ran
/// last, process-wide. The lock only guards the `String` itself.
#[derive(Default)]
pub struct SharedSlot {
    phone_number: RwLock<Option<String>>,
}

impl SharedSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingVerifications for SharedSlot {
    fn begin(&self, phone_number: &str) -> Option<Uuid> {
        let mut slot = self
            .phone_number
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(phone_number.to_string());
        None
    }

    fn lookup(&self, _verification_id: Option<Uuid>) -> Option<String> {
        self.phone_number
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn complete(&self, _verification_id: Option<Uuid>) {}

    fn mode(&self) -> CorrelationMode {
        CorrelationMode::Shared
    }
}

#[derive(Debug, Clone)]
struct PendingAttempt {
    phone_number: String,
    expires_at: DateTime<Utc>,
}

/// Keyed, time-evicted store of pending attempts.
pub struct TokenStore {
    attempts: Mutex<HashMap<Uuid, PendingAttempt>>,
    ttl: Duration,
}

impl TokenStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(600)),
        }
    }

    /// Number of unexpired attempts
    pub fn len(&self) -> usize {
        let mut attempts = self.lock();
        evict_expired(&mut attempts, Utc::now());
        attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, PendingAttempt>> {
        self.attempts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn evict_expired(attempts: &mut HashMap<Uuid, PendingAttempt>, now: DateTime<Utc>) {
    attempts.retain(|_, attempt| attempt.expires_at > now);
}

impl PendingVerifications for TokenStore {
    fn begin(&self, phone_number: &str) -> Option<Uuid> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut attempts = self.lock();
        evict_expired(&mut attempts, now);
        attempts.insert(
            id,
            PendingAttempt {
                phone_number: phone_number.to_string(),
                expires_at: now + self.ttl,
            },
        );
        Some(id)
    }

    fn lookup(&self, verification_id: Option<Uuid>) -> Option<String> {
        let id = verification_id?;
        let mut attempts = self.lock();
        evict_expired(&mut attempts, Utc::now());
        attempts.get(&id).map(|attempt| attempt.phone_number.clone())
    }

    fn complete(&self, verification_id: Option<Uuid>) {
        if let Some(id) = verification_id {
            self.lock().remove(&id);
        }
    }

    fn mode(&self) -> CorrelationMode {
        CorrelationMode::Token
    }
}
