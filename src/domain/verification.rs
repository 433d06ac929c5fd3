use super::view::BannerView;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking a trade partner against the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationResult {
    Legitimate,
    Impersonating,
    /// Registry could not be fetched or parsed
    Inconclusive(String),
    /// Name does not claim to be the trusted operator
    CheckSkipped,
}

impl VerificationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationResult::Legitimate => "LEGITIMATE",
            VerificationResult::Impersonating => "IMPERSONATING",
            VerificationResult::Inconclusive(_) => "INCONCLUSIVE",
            VerificationResult::CheckSkipped => "CHECK_SKIPPED",
        }
    }

    /// Final banner for this result; skipped checks render nothing
    pub fn banner(&self) -> Option<BannerView> {
        match self {
            VerificationResult::Legitimate => Some(BannerView::Ok),
            VerificationResult::Impersonating => Some(BannerView::Danger),
            VerificationResult::Inconclusive(message) => Some(BannerView::Error(message.clone())),
            VerificationResult::CheckSkipped => None,
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationResult::Inconclusive(message) => write!(f, "INCONCLUSIVE: {}", message),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_mapping() {
        assert_eq!(VerificationResult::Legitimate.banner(), Some(BannerView::Ok));
        assert_eq!(VerificationResult::Impersonating.banner(), Some(BannerView::Danger));
        assert_eq!(
            VerificationResult::Inconclusive("boom".into()).banner(),
            Some(BannerView::Error("boom".into()))
        );
        assert_eq!(VerificationResult::CheckSkipped.banner(), None);
    }
}
