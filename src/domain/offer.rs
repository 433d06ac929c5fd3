use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trade offer the platform acknowledged as sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOfferHandle {
    pub offer_id: String,
    pub created_at: DateTime<Utc>,
}

impl TradeOfferHandle {
    pub fn new(offer_id: impl Into<String>) -> Self {
        Self {
            offer_id: offer_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Why an offer stopped being actionable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InactiveReason {
    /// No entry for the offer in the sent offers listing
    Missing,
    /// Entry present but the cancel action is gone and it was not accepted
    CancelUnavailable,
}

impl InactiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InactiveReason::Missing => "missing from sent offers",
            InactiveReason::CancelUnavailable => "cancel action no longer available",
        }
    }
}

impl fmt::Display for InactiveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offer state as seen in one poll. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferLifecycleState {
    Pending,
    Accepted,
    Inactive(InactiveReason),
}

impl OfferLifecycleState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferLifecycleState::Pending)
    }
}

impl fmt::Display for OfferLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferLifecycleState::Pending => write!(f, "PENDING"),
            OfferLifecycleState::Accepted => write!(f, "ACCEPTED"),
            OfferLifecycleState::Inactive(reason) => write!(f, "INACTIVE ({})", reason),
        }
    }
}

/// What the sent offers page shows for one offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OfferFragment {
    /// Accepted marker present
    pub accepted: bool,
    /// Cancel action present
    pub cancel_available: bool,
}

/// Classify the page entry for the tracked offer (`None` = no entry).
pub fn classify_offer_fragment(fragment: Option<&OfferFragment>) -> OfferLifecycleState {
    match fragment {
        None => OfferLifecycleState::Inactive(InactiveReason::Missing),
        Some(f) if f.accepted => OfferLifecycleState::Accepted,
        Some(f) if f.cancel_available => OfferLifecycleState::Pending,
        Some(_) => OfferLifecycleState::Inactive(InactiveReason::CancelUnavailable),
    }
}
