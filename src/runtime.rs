//! Wiring of the verification and monitoring components for one trade page.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::adapters::{FileStore, HttpFetcher, KeyValueStore, PageFetcher, Surface};
use crate::config::AppConfig;
use crate::domain::{MonitorContext, MonitorPhase, TradeContext, TradeOfferHandle, VerificationResult};
use crate::error::{GuardError, Result};
use crate::services::{
    CacheStatus, IdentityMatcher, InterceptedExchange, OfferMonitor, RegistryCache,
    SubmissionHub, Verifier,
};

/// Shared components built once per run
pub struct Components {
    pub config: AppConfig,
    pub fetcher: Arc<dyn PageFetcher>,
    /// Fetcher for the user's own sent offers, carrying the session cookie
    pub offer_fetcher: Arc<dyn PageFetcher>,
    pub surface: Arc<dyn Surface>,
    pub cache: Arc<RegistryCache>,
    pub verifier: Arc<Verifier>,
}

impl Components {
    pub fn new(
        config: AppConfig,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn KeyValueStore>,
        surface: Arc<dyn Surface>,
    ) -> Self {
        let cache = Arc::new(RegistryCache::new(fetcher.clone(), store, &config.registry));
        let matcher = IdentityMatcher::new(&config.registry.trigger_phrases);
        let verifier = Arc::new(Verifier::new(matcher, cache.clone()));

        Self {
            config,
            offer_fetcher: fetcher.clone(),
            fetcher,
            surface,
            cache,
            verifier,
        }
    }

    /// Use a separate fetcher for sent-offer polls
    pub fn with_offer_fetcher(mut self, offer_fetcher: Arc<dyn PageFetcher>) -> Self {
        self.offer_fetcher = offer_fetcher;
        self
    }

    /// HTTP fetchers and file-backed store from configuration
    pub fn from_config(config: AppConfig, surface: Arc<dyn Surface>) -> Result<Self> {
        let timeout = config.registry.request_timeout();
        let fetcher = Arc::new(HttpFetcher::new(timeout)?);
        let store = Arc::new(FileStore::new(config.storage.resolved_path()));

        let offer_fetcher: Arc<dyn PageFetcher> = match config.monitor.session_cookie.as_deref() {
            Some(cookie) if !cookie.trim().is_empty() => {
                Arc::new(HttpFetcher::with_session_cookie(timeout, cookie)?)
            }
            _ => fetcher.clone(),
        };

        Ok(Self::new(config, fetcher, store, surface).with_offer_fetcher(offer_fetcher))
    }

    pub fn offer_monitor(&self, profile_url: &str) -> Result<OfferMonitor> {
        if self.config.monitor.session_cookie.is_none() {
            warn!("No session cookie configured, the sent offers page may only show a login prompt");
        }
        OfferMonitor::new(
            self.offer_fetcher.clone(),
            self.surface.clone(),
            self.config.monitor.clone(),
            profile_url,
        )
    }

    pub async fn registry_status(&self) -> Result<CacheStatus> {
        self.cache.status().await
    }

    pub async fn refresh_registry(&self) -> Result<usize> {
        Ok(self.cache.refresh().await?.len())
    }
}

/// Map a verification outcome to the command result
pub fn verification_outcome(partner_id: &str, result: &VerificationResult) -> Result<()> {
    match result {
        VerificationResult::Legitimate | VerificationResult::CheckSkipped => Ok(()),
        VerificationResult::Impersonating => Err(GuardError::Impersonation(partner_id.to_string())),
        VerificationResult::Inconclusive(message) => Err(GuardError::Inconclusive(message.clone())),
    }
}

/// Map a finished monitor to the command result
pub fn monitor_outcome(context: &MonitorContext) -> Result<()> {
    match context.phase {
        MonitorPhase::Inactive(reason) => Err(GuardError::AnomalousOfferState {
            offer_id: context.offer_id().unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }),
        _ => Ok(()),
    }
}

/// One line of interceptor input: a full exchange, or a bare submission body
pub fn parse_exchange_line(line: &str) -> Option<InterceptedExchange> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<InterceptedExchange>(line) {
        Ok(exchange) => Some(exchange),
        Err(_) => Some(InterceptedExchange::submission(line)),
    }
}

/// Outcome of a guarded trade page
#[derive(Debug)]
pub struct GuardReport {
    pub verification: VerificationResult,
    pub offers: Vec<MonitorContext>,
}

impl GuardReport {
    pub fn into_result(self, partner_id: &str) -> Result<()> {
        verification_outcome(partner_id, &self.verification)?;
        for offer in &self.offers {
            monitor_outcome(offer)?;
        }
        Ok(())
    }
}

/// Verify the partner while monitoring every submission seen on `input`.
///
/// Verification and monitoring run as independent tasks. Returns when the
/// input is exhausted and every monitored offer reached a terminal state.
pub async fn guard_trade<R>(
    components: &Components,
    context: TradeContext,
    input: R,
) -> Result<GuardReport>
where
    R: AsyncBufRead + Unpin,
{
    let verifier = components.verifier.clone();
    let surface = components.surface.clone();
    let partner = context.partner.clone();
    let verification =
        tokio::spawn(async move { verifier.verify_and_render(&partner, surface.as_ref()).await });

    let hub = SubmissionHub::new();
    let monitoring = match &context.profile_url {
        Some(profile_url) => {
            let monitor = Arc::new(components.offer_monitor(profile_url)?);
            info!(url = %monitor.sent_offers_url(), "Watching for offer submissions");
            Some(monitor.attach(&hub))
        }
        None => {
            warn!("No profile URL on the page, submitted offers will not be monitored");
            None
        }
    };

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(exchange) = parse_exchange_line(&line) {
            if monitoring.is_some() {
                hub.observe(&exchange);
            }
        }
    }
    drop(hub);

    let offers = match monitoring {
        Some(task) => task
            .await
            .map_err(|e| GuardError::Internal(format!("offer monitor task failed: {}", e)))?,
        None => Vec::new(),
    };
    let verification = verification
        .await
        .map_err(|e| GuardError::Internal(format!("verification task failed: {}", e)))?;

    Ok(GuardReport {
        verification,
        offers,
    })
}

/// Monitor a single already-submitted offer
pub async fn watch_offer(components: &Components, profile_url: &str, offer_id: &str) -> Result<MonitorContext> {
    let monitor = components.offer_monitor(profile_url)?;
    monitor.watch(TradeOfferHandle::new(offer_id)).await
}
