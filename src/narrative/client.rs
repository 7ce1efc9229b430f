use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{
    DefeatDecision, DefeatRequest, FallbackNarrative, Generated, InteractionPayload,
    InteractionRequest, NarrativeError, NarrativeService, fallback_decision, fallback_interaction,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    pub calls: u64,
    pub failures: u64,
    pub tokens: u64,
}

/// Infallible front for a [`NarrativeService`]: counts usage per call site
/// and substitutes fallback payloads on error.
#[derive(Clone)]
pub struct NarrativeClient {
    service: Arc<dyn NarrativeService>,
    usage: Arc<Mutex<BTreeMap<String, UsageStats>>>,
}

impl NarrativeClient {
    pub fn new(service: Arc<dyn NarrativeService>) -> Self {
        Self {
            service,
            usage: Arc::default(),
        }
    }

    pub fn offline() -> Self {
        Self::new(Arc::new(FallbackNarrative))
    }

    pub async fn interaction(&self, call_site: &str, request: &InteractionRequest) -> InteractionPayload {
        let result = self.service.generate_interaction(request).await;
        self.settle(call_site, result, fallback_interaction)
    }

    pub async fn defeat_decision(&self, call_site: &str, request: &DefeatRequest) -> DefeatDecision {
        let result = self.service.decide_defeat(request).await;
        self.settle(call_site, result, || fallback_decision(&request.npc_name))
    }

    /// Usage counters by call site.
    pub fn usage(&self) -> BTreeMap<String, UsageStats> {
        self.usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn settle<T>(
        &self,
        call_site: &str,
        result: Result<Generated<T>, NarrativeError>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        let mut usage = self
            .usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let stats = usage.entry(call_site.to_string()).or_default();
        stats.calls += 1;
        match result {
            Ok(generated) => {
                stats.tokens += generated.tokens;
                generated.payload
            }
            Err(err) => {
                stats.failures += 1;
                tracing::warn!(call_site, error = %err, "narrative service failed, using fallback");
                fallback()
            }
        }
    }
}
