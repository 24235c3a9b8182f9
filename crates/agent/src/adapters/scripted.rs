use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use shelfwise_core::domain::reasoning::ReasoningOutput;
use shelfwise_core::grounding::context::ReasoningContext;

use crate::provider::{ProviderError, ReasoningProvider};

/// Deterministic provider double for tests and offline runs: pops pre-queued
/// outcomes in order, errors once the script runs dry.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ReasoningOutput, ProviderError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(outputs: Vec<ReasoningOutput>) -> Self {
        Self {
            script: Mutex::new(outputs.into_iter().map(Ok).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err(error)])),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        _context: &ReasoningContext,
    ) -> Result<ReasoningOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("script lock");
        script.pop_front().unwrap_or(Err(ProviderError::EmptyResponse))
    }
}
