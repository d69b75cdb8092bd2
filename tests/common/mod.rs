// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for integration tests.

use optreg::domain::{RegistryError, Result};
use optreg::ports::SourceParser;
use optreg::service::Registry;
use std::sync::{Arc, Mutex};

/// Records every hook call as `name:stage`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Creates an empty call log.
#[allow(dead_code)]
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A source parser that writes fixed text values during resolve.
#[allow(dead_code)]
pub struct MockParser {
    name: String,
    priority: i32,
    writes: Vec<(String, String, String)>,
    fail_in: Option<&'static str>,
    log: Option<CallLog>,
}

#[allow(dead_code)]
impl MockParser {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            priority,
            writes: Vec::new(),
            fail_in: None,
            log: None,
        }
    }

    /// Writes `value` into `option` of the group at `group` during resolve.
    pub fn writes(mut self, group: &str, option: &str, value: &str) -> Self {
        self.writes
            .push((group.to_string(), option.to_string(), value.to_string()));
        self
    }

    /// Makes the given hook (`setup`, `resolve` or `teardown`) fail.
    pub fn failing_in(mut self, stage: &'static str) -> Self {
        self.fail_in = Some(stage);
        self
    }

    pub fn logging_to(mut self, log: &CallLog) -> Self {
        self.log = Some(Arc::clone(log));
        self
    }

    fn record(&self, stage: &'static str) -> Result<()> {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("{}:{}", self.name, stage));
        }
        if self.fail_in == Some(stage) {
            return Err(RegistryError::SourceError {
                source_name: self.name.clone(),
                message: format!("{} failed", stage),
                source: None,
            });
        }
        Ok(())
    }
}

impl SourceParser for MockParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn setup(&mut self, _registry: &Registry) -> Result<()> {
        self.record("setup")
    }

    fn resolve(&mut self, registry: &Registry) -> Result<()> {
        self.record("resolve")?;
        for (group, option, value) in &self.writes {
            registry.set_option_value(self.priority, group, option, value.as_str())?;
        }
        Ok(())
    }

    fn teardown(&mut self, _registry: &Registry) -> Result<()> {
        self.record("teardown")
    }
}
