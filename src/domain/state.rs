use serde::{Deserialize, Serialize};
use std::fmt;

use super::offer::{InactiveReason, OfferLifecycleState, TradeOfferHandle};
use super::view::ModalView;
use crate::error::{GuardError, Result};

/// Offer monitor state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonitorPhase {
    /// No submitted offer observed yet
    Idle,
    /// Offer submitted, polling the sent offers listing
    Pending,
    /// Partner accepted the offer
    Accepted,
    /// Offer vanished or lost its cancel action
    Inactive(InactiveReason),
}

impl MonitorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorPhase::Idle => "IDLE",
            MonitorPhase::Pending => "PENDING",
            MonitorPhase::Accepted => "ACCEPTED",
            MonitorPhase::Inactive(_) => "INACTIVE",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: MonitorPhase) -> bool {
        use MonitorPhase::*;

        match (self, target) {
            (Idle, Pending) => true,
            // Stable poll
            (Pending, Pending) => true,
            (Pending, Accepted) => true,
            (Pending, Inactive(_)) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorPhase::Accepted | MonitorPhase::Inactive(_))
    }
}

impl From<OfferLifecycleState> for MonitorPhase {
    fn from(state: OfferLifecycleState) -> Self {
        match state {
            OfferLifecycleState::Pending => MonitorPhase::Pending,
            OfferLifecycleState::Accepted => MonitorPhase::Accepted,
            OfferLifecycleState::Inactive(reason) => MonitorPhase::Inactive(reason),
        }
    }
}

impl fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the monitor carries between polls.
///
/// Each step consumes the context and hands back the next one, so nothing
/// about an offer lives outside the value owned by its poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorContext {
    pub phase: MonitorPhase,
    pub offer: Option<TradeOfferHandle>,
    /// Stable (pending, cancellable) polls observed
    pub poll_count: u32,
    /// SafeToProceed already shown
    pub safe_announced: bool,
    pub consecutive_fetch_errors: u32,
}

/// Result of feeding one event into the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStep {
    pub context: MonitorContext,
    /// Modal to render, if this step changes what the user sees
    pub render: Option<ModalView>,
}

impl PollStep {
    /// Whether another poll should be scheduled
    pub fn continues(&self) -> bool {
        !self.context.phase.is_terminal()
    }
}

impl Default for MonitorContext {
    fn default() -> Self {
        Self::idle()
    }
}

impl MonitorContext {
    pub fn idle() -> Self {
        Self {
            phase: MonitorPhase::Idle,
            offer: None,
            poll_count: 0,
            safe_announced: false,
            consecutive_fetch_errors: 0,
        }
    }

    pub fn offer_id(&self) -> Option<&str> {
        self.offer.as_ref().map(|o| o.offer_id.as_str())
    }

    fn transition(mut self, target: MonitorPhase) -> Result<Self> {
        if !self.phase.can_transition_to(target) {
            return Err(GuardError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: target.to_string(),
            });
        }
        self.phase = target;
        Ok(self)
    }

    /// Idle -> Pending on a submission acknowledgement
    pub fn start(self, offer: TradeOfferHandle) -> Result<PollStep> {
        let mut context = self.transition(MonitorPhase::Pending)?;
        context.offer = Some(offer);
        context.poll_count = 0;
        context.safe_announced = false;
        context.consecutive_fetch_errors = 0;

        Ok(PollStep {
            context,
            render: Some(ModalView::Instruction),
        })
    }

    /// Apply one classified poll result
    pub fn observe(self, state: OfferLifecycleState, safe_after_polls: u32) -> Result<PollStep> {
        let mut context = self.transition(state.into())?;
        context.consecutive_fetch_errors = 0;

        let render = match state {
            OfferLifecycleState::Pending => {
                context.poll_count += 1;
                if !context.safe_announced && context.poll_count >= safe_after_polls {
                    context.safe_announced = true;
                    Some(ModalView::SafeToProceed)
                } else {
                    None
                }
            }
            OfferLifecycleState::Accepted => Some(ModalView::Accepted),
            OfferLifecycleState::Inactive(reason) => Some(ModalView::Inactive(reason)),
        };

        Ok(PollStep { context, render })
    }

    /// Apply a failed poll fetch. Past the tolerance it counts as a missing offer.
    pub fn fetch_failed(self, tolerated: u32) -> Result<PollStep> {
        if self.phase != MonitorPhase::Pending {
            return Err(GuardError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: MonitorPhase::Pending.to_string(),
            });
        }

        let mut context = self;
        context.consecutive_fetch_errors += 1;
        if context.consecutive_fetch_errors <= tolerated {
            return Ok(PollStep {
                context,
                render: None,
            });
        }

        let reason = InactiveReason::Missing;
        let context = context.transition(MonitorPhase::Inactive(reason))?;
        Ok(PollStep {
            context,
            render: Some(ModalView::Inactive(reason)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> MonitorContext {
        MonitorContext::idle()
            .start(TradeOfferHandle::new("5551234"))
            .unwrap()
            .context
    }

    #[test]
    fn start_opens_instruction_modal() {
        let step = MonitorContext::idle()
            .start(TradeOfferHandle::new("5551234"))
            .unwrap();
        assert_eq!(step.context.phase, MonitorPhase::Pending);
        assert_eq!(step.context.offer_id(), Some("5551234"));
        assert_eq!(step.render, Some(ModalView::Instruction));
    }

    #[test]
    fn safe_to_proceed_announced_once_after_third_poll() {
        let mut context = pending();
        let mut renders = Vec::new();

        for _ in 0..5 {
            let step = context.observe(OfferLifecycleState::Pending, 3).unwrap();
            renders.push(step.render);
            assert!(step.continues());
            context = step.context;
        }

        assert_eq!(
            renders,
            vec![None, None, Some(ModalView::SafeToProceed), None, None]
        );
        assert_eq!(context.phase, MonitorPhase::Pending);
        assert_eq!(context.poll_count, 5);
    }

    #[test]
    fn missing_offer_is_terminal() {
        let step = pending()
            .observe(OfferLifecycleState::Inactive(InactiveReason::Missing), 3)
            .unwrap();
        assert!(!step.continues());
        assert_eq!(step.render, Some(ModalView::Inactive(InactiveReason::Missing)));
    }

    #[test]
    fn terminal_phase_rejects_further_polls() {
        let accepted = pending()
            .observe(OfferLifecycleState::Accepted, 3)
            .unwrap()
            .context;
        assert!(accepted.clone().observe(OfferLifecycleState::Pending, 3).is_err());
        assert!(accepted.fetch_failed(5).is_err());
    }

    #[test]
    fn idle_cannot_observe() {
        assert!(MonitorContext::idle()
            .observe(OfferLifecycleState::Pending, 3)
            .is_err());
    }

    #[test]
    fn fetch_errors_within_tolerance_keep_polling() {
        let step = pending().fetch_failed(1).unwrap();
        assert!(step.continues());
        assert_eq!(step.render, None);

        // A successful poll resets the streak
        let step = step
            .context
            .observe(OfferLifecycleState::Pending, 3)
            .unwrap();
        assert_eq!(step.context.consecutive_fetch_errors, 0);

        let step = step.context.fetch_failed(1).unwrap();
        assert!(step.continues());
        let step = step.context.fetch_failed(1).unwrap();
        assert!(!step.continues());
        assert_eq!(
            step.context.phase,
            MonitorPhase::Inactive(InactiveReason::Missing)
        );
    }

    #[test]
    fn untolerated_fetch_error_collapses_to_missing() {
        let step = pending().fetch_failed(0).unwrap();
        assert_eq!(step.render, Some(ModalView::Inactive(InactiveReason::Missing)));
    }
}
