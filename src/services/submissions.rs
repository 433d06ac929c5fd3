//! Offer submission events
//!
//! The trade window posts new offers to `/tradeoffer/new/send`. Whatever
//! transport observes that exchange hands it to `SubmissionHub::observe`,
//! and subscribers receive a `TradeOfferHandle` for every acknowledged
//! offer without knowing how it was observed.
//!
//! Every subscriber owns an unbounded queue, so a slow subscriber delays
//! offers but never loses one.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapters::{parse_submission_body, SUBMIT_OFFER_PATH};
use crate::domain::TradeOfferHandle;

/// A request/response pair seen by the interceptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptedExchange {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl InterceptedExchange {
    /// A successful offer submission response
    pub fn submission(body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            path: SUBMIT_OFFER_PATH.to_string(),
            status: 200,
            body: body.into(),
        }
    }
}

/// Fans submitted offers out to subscribers. Receivers end once every
/// clone of the hub is dropped.
#[derive(Clone)]
pub struct SubmissionHub {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<TradeOfferHandle>>>>,
}

impl Default for SubmissionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionHub {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Receive every offer published from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TradeOfferHandle> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Run `handler` for every submitted offer until the hub is dropped
    pub fn on_offer_submitted<F>(&self, handler: F) -> JoinHandle<()>
    where
        F: Fn(TradeOfferHandle) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            while let Some(offer) = rx.recv().await {
                handler(offer);
            }
        })
    }

    /// Returns the number of subscribers that received the offer
    pub fn publish(&self, offer: TradeOfferHandle) -> usize {
        info!(offer_id = %offer.offer_id, "Trade offer submitted");
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(offer.clone()).is_ok());

        if subscribers.is_empty() {
            warn!(offer_id = %offer.offer_id, "Trade offer submitted with no subscribers");
        }
        subscribers.len()
    }

    /// Publish if the exchange is an acknowledged offer submission
    pub fn observe(&self, exchange: &InterceptedExchange) -> Option<TradeOfferHandle> {
        if !exchange.method.eq_ignore_ascii_case("POST") || exchange.path != SUBMIT_OFFER_PATH {
            return None;
        }

        if !(200..300).contains(&exchange.status) {
            debug!(status = exchange.status, "Offer submission was rejected");
            return None;
        }

        let offer_id = match parse_submission_body(&exchange.body) {
            Some(id) => id,
            None => {
                debug!("Submission response carried no offer id");
                return None;
            }
        };

        let offer = TradeOfferHandle::new(offer_id);
        self.publish(offer.clone());
        Some(offer)
    }
}
