// TestDependencies - mock implementations for testing
//
// Provides mock directory and OTP provider that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ApprovalStatus, BaseDirectory, BaseOtpProvider, ChallengeHandle, Channel};

// =============================================================================
// Mock Directory
// =============================================================================

#[derive(Clone, Default)]
pub struct MockDirectory {
    identities: Arc<Mutex<HashMap<String, String>>>,
    failure: Option<String>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raw (unnormalized) mobile number for an Aadhaar number
    pub fn with_identity(self, aadhaar: &str, mobile: &str) -> Self {
        self.identities
            .lock()
            .unwrap()
            .insert(aadhaar.to_string(), mobile.to_string());
        self
    }

    /// Make every call fail with `message`, as an unreachable database would
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Aadhaar numbers looked up so far
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseDirectory for MockDirectory {
    async fn find_mobile(&self, aadhaar: &str) -> Result<Option<String>> {
        self.lookups.lock().unwrap().push(aadhaar.to_string());
        if let Some(message) = &self.failure {
            return Err(anyhow::anyhow!("{}", message));
        }
        Ok(self.identities.lock().unwrap().get(aadhaar).cloned())
    }

    async fn ping(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Mock OTP Provider
// =============================================================================

/// Arguments captured from a send call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCall {
    pub phone_number: String,
    pub channel: Channel,
}

/// Arguments captured from a check call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCall {
    pub phone_number: String,
    pub code: String,
}

#[derive(Clone, Default)]
pub struct MockOtpProvider {
    approved: Arc<Mutex<HashSet<(String, String)>>>,
    send_failure: Option<String>,
    send_delay: Option<Duration>,
    check_failure: Option<String>,
    sends: Arc<Mutex<Vec<SendCall>>>,
    checks: Arc<Mutex<Vec<CheckCall>>>,
}

impl MockOtpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Approve `code` when checked against `phone_number`; everything else stays pending
    pub fn approving(self, phone_number: &str, code: &str) -> Self {
        self.approved
            .lock()
            .unwrap()
            .insert((phone_number.to_string(), code.to_string()));
        self
    }

    pub fn with_send_failure(mut self, message: &str) -> Self {
        self.send_failure = Some(message.to_string());
        self
    }

    /// Hold every send for `delay` before answering
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn with_check_failure(mut self, message: &str) -> Self {
        self.check_failure = Some(message.to_string());
        self
    }

    pub fn sends(&self) -> Vec<SendCall> {
        self.sends.lock().unwrap().clone()
    }

    pub fn checks(&self) -> Vec<CheckCall> {
        self.checks.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseOtpProvider for MockOtpProvider {
    async fn send_challenge(&self, phone_number: &str, channel: Channel) -> Result<ChallengeHandle> {
        self.sends.lock().unwrap().push(SendCall {
            phone_number: phone_number.to_string(),
            channel,
        });
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.send_failure {
            return Err(anyhow::anyhow!("{}", message));
        }
        let sid = format!("VE{:04}", self.sends.lock().unwrap().len());
        Ok(ChallengeHandle {
            sid,
            status: "pending".to_string(),
        })
    }

    async fn check_challenge(&self, phone_number: &str, code: &str) -> Result<ApprovalStatus> {
        self.checks.lock().unwrap().push(CheckCall {
            phone_number: phone_number.to_string(),
            code: code.to_string(),
        });
        if let Some(message) = &self.check_failure {
            return Err(anyhow::anyhow!("{}", message));
        }
        let key = (phone_number.to_string(), code.to_string());
        if self.approved.lock().unwrap().contains(&key) {
            Ok(ApprovalStatus::Approved)
        } else {
            Ok(ApprovalStatus::Rejected("pending".to_string()))
        }
    }
}
