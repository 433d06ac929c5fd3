//! Sent-offer monitoring service
//!
//! After an offer is submitted this service polls the user's sent offers
//! listing and watches the offer for:
//! - acceptance (done, nothing left to protect)
//! - disappearance or loss of the cancel action (possible tampering)
//! - enough stable polls to tell the user confirming is safe
//!
//! Polls are strictly sequential: the next one is scheduled only after the
//! previous result has been classified. Polling has no ceiling and stops
//! only at a terminal state.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::submissions::SubmissionHub;
use crate::adapters::{extract_offer_fragment, sent_offers_url, PageFetcher, Surface};
use crate::config::MonitorConfig;
use crate::domain::{
    classify_offer_fragment, MonitorContext, MonitorPhase, OfferLifecycleState, PollStep,
    TradeOfferHandle,
};
use crate::error::Result;

/// Offer monitoring service
pub struct OfferMonitor {
    fetcher: Arc<dyn PageFetcher>,
    surface: Arc<dyn Surface>,
    config: MonitorConfig,
    sent_offers_url: String,
}

impl OfferMonitor {
    /// Create a new offer monitor for the user behind `profile_url`
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        surface: Arc<dyn Surface>,
        config: MonitorConfig,
        profile_url: &str,
    ) -> Result<Self> {
        let sent_offers_url = sent_offers_url(profile_url, &config.sent_offers_path)?;
        Ok(Self {
            fetcher,
            surface,
            config,
            sent_offers_url,
        })
    }

    pub fn sent_offers_url(&self) -> &str {
        &self.sent_offers_url
    }

    /// Fetch the listing once and classify the offer
    pub async fn poll_once(&self, offer_id: &str) -> Result<OfferLifecycleState> {
        let html = self.fetcher.fetch_text(&self.sent_offers_url).await?;
        let fragment = extract_offer_fragment(&html, offer_id)?;
        Ok(classify_offer_fragment(fragment.as_ref()))
    }

    /// Watch one offer until it is accepted or becomes inactive
    pub async fn watch(&self, offer: TradeOfferHandle) -> Result<MonitorContext> {
        let offer_id = offer.offer_id.clone();

        info!(
            offer_id = %offer_id,
            "Monitoring trade offer (interval: {}ms, safe after {} polls)",
            self.config.poll_interval_ms, self.config.safe_after_polls
        );

        let step = MonitorContext::idle().start(offer)?;
        let mut context = self.apply(&offer_id, step);

        while !context.phase.is_terminal() {
            tokio::time::sleep(self.config.poll_interval()).await;

            let step = match self.poll_once(&offer_id).await {
                Ok(state) => {
                    debug!(offer_id = %offer_id, poll = context.poll_count + 1, %state, "Poll result");
                    context.observe(state, self.config.safe_after_polls)?
                }
                Err(e) => {
                    warn!(offer_id = %offer_id, "Failed to poll sent offers: {}", e);
                    context.fetch_failed(self.config.tolerated_fetch_errors)?
                }
            };

            context = self.apply(&offer_id, step);
        }

        match context.phase {
            MonitorPhase::Accepted => info!(offer_id = %offer_id, "Trade offer accepted"),
            MonitorPhase::Inactive(reason) => error!(
                offer_id = %offer_id,
                polls = context.poll_count,
                "Trade offer is unexpectedly no longer active: {}", reason
            ),
            _ => {}
        }

        Ok(context)
    }

    fn apply(&self, offer_id: &str, step: PollStep) -> MonitorContext {
        if let Some(view) = &step.render {
            self.surface.render_modal(offer_id, view);
        }
        step.context
    }

    /// Watch every offer published on `hub`.
    ///
    /// Resolves once the hub is closed and all watched offers are terminal,
    /// yielding each offer's final context.
    pub fn attach(self: Arc<Self>, hub: &SubmissionHub) -> JoinHandle<Vec<MonitorContext>> {
        let mut rx = hub.subscribe();

        tokio::spawn(async move {
            let mut watches = Vec::new();

            while let Some(offer) = rx.recv().await {
                let monitor = self.clone();
                watches.push(tokio::spawn(async move { monitor.watch(offer).await }));
            }

            let mut outcomes = Vec::with_capacity(watches.len());
            for watch in watches {
                match watch.await {
                    Ok(Ok(context)) => outcomes.push(context),
                    Ok(Err(e)) => error!("Offer monitor failed: {}", e),
                    Err(e) => error!("Offer monitor task panicked: {}", e),
                }
            }
            outcomes
        })
    }
}
