//! Hand-written collaborator mocks shared by the unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::aws::cost_explorer::BillingSource;
use crate::core::aws::dynamodb::IdempotencyStore;
use crate::core::aws::ssm::ParameterStore;
use crate::core::aws::sts::IdentityLookup;
use crate::core::aws::ResourceDisabler;
use crate::core::error::ReportError;
use crate::core::models::cost::DailyCostRow;
use crate::core::notify::NotificationChannel;
use crate::core::period::DateWindow;
use crate::core::report::{OutputFormat, RenderedReport};

/// Billing source answering from a window -> rows map and recording queries.
#[derive(Clone, Default)]
pub struct MockBilling {
    rows: HashMap<DateWindowKey, Vec<DailyCostRow>>,
    fail: bool,
    queries: Arc<Mutex<Vec<DateWindow>>>,
}

type DateWindowKey = (chrono::NaiveDate, chrono::NaiveDate);

impl MockBilling {
    pub fn with(mut self, window: DateWindow, rows: Vec<DailyCostRow>) -> Self {
        self.rows.insert((window.start, window.end), rows);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<DateWindow> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillingSource for MockBilling {
    async fn get_usage(&self, window: &DateWindow) -> Result<Vec<DailyCostRow>, ReportError> {
        self.queries.lock().unwrap().push(*window);
        if self.fail {
            return Err(ReportError::upstream("Cost Explorer", "AccessDeniedException"));
        }
        Ok(self
            .rows
            .get(&(window.start, window.end))
            .cloned()
            .unwrap_or_default())
    }
}

/// Channel that records every message it is asked to send.
#[derive(Clone)]
pub struct RecordingChannel {
    name: &'static str,
    format: OutputFormat,
    fail: bool,
    attempts: Arc<AtomicUsize>,
    sent: Arc<Mutex<Vec<(String, RenderedReport)>>>,
}

impl RecordingChannel {
    pub fn new(name: &'static str, format: OutputFormat) -> Self {
        Self {
            name,
            format,
            fail: false,
            attempts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &'static str, format: OutputFormat) -> Self {
        Self {
            fail: true,
            ..Self::new(name, format)
        }
    }

    pub fn sent(&self) -> Vec<(String, RenderedReport)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    async fn send(&self, subject: &str, body: &RenderedReport) -> Result<String, ReportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(ReportError::upstream("SNS", "AuthorizationError"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.clone()));
        Ok(format!("{}-{}", self.name, attempt))
    }
}

/// In-memory idempotency store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn with(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl IdempotencyStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ReportError> {
        Ok(self.value(key))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), ReportError> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct StaticParameters {
    values: HashMap<String, String>,
}

impl StaticParameters {
    pub fn with(name: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(name.to_string(), value.to_string());
        Self { values }
    }
}

#[async_trait]
impl ParameterStore for StaticParameters {
    async fn get_parameter(&self, name: &str) -> Result<String, ReportError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| ReportError::upstream("SSM Parameter Store", "ParameterNotFound"))
    }
}

pub struct StaticIdentity(pub &'static str);

#[async_trait]
impl IdentityLookup for StaticIdentity {
    async fn account_id(&self) -> Result<String, ReportError> {
        Ok(self.0.to_string())
    }
}

/// Disabler that succeeds or fails on demand and counts calls.
#[derive(Clone)]
pub struct MockDisabler {
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockDisabler {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceDisabler for MockDisabler {
    fn kind(&self) -> &'static str {
        "CloudFront Distribution"
    }

    fn resource(&self) -> String {
        "CloudFront distribution E2TEST".to_string()
    }

    async fn disable(&self) -> Result<(), ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ReportError::upstream("CloudFront", "PreconditionFailed"));
        }
        Ok(())
    }
}
