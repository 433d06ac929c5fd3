use super::offer::InactiveReason;
use serde::{Deserialize, Serialize};

/// Pre-submission status banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerView {
    Loading,
    Ok,
    Danger,
    /// Danger styling with the failure message
    Error(String),
}

impl BannerView {
    /// Style class of the banner slot
    pub fn style(&self) -> &'static str {
        match self {
            BannerView::Loading => "loading",
            BannerView::Ok => "ok",
            BannerView::Danger | BannerView::Error(_) => "danger",
        }
    }
}

/// Post-submission modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalView {
    /// Offer sent, do not confirm on the second device yet
    Instruction,
    /// Offer has been stable long enough to confirm
    SafeToProceed,
    Accepted,
    Inactive(InactiveReason),
}

impl ModalView {
    pub fn style(&self) -> &'static str {
        match self {
            ModalView::Instruction | ModalView::SafeToProceed => "loading",
            ModalView::Accepted => "ok",
            ModalView::Inactive(_) => "danger",
        }
    }

    /// Persistent views stay up until the user leaves the page
    pub fn is_persistent(&self) -> bool {
        matches!(self, ModalView::Inactive(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_banner_uses_danger_style() {
        assert_eq!(BannerView::Error("x".into()).style(), "danger");
        assert_eq!(BannerView::Loading.style(), "loading");
    }

    #[test]
    fn only_inactive_modal_is_persistent() {
        assert!(ModalView::Inactive(InactiveReason::Missing).is_persistent());
        assert!(!ModalView::Accepted.is_persistent());
        assert!(!ModalView::SafeToProceed.is_persistent());
    }
}
