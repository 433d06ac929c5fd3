/// Decides whether a display name claims to be the trusted operator
#[derive(Debug, Clone)]
pub struct IdentityMatcher {
    /// Lowercased, non-empty
    phrases: Vec<String>,
}

impl IdentityMatcher {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// True iff the lowercased name contains any trigger phrase
    pub fn matches(&self, name: Option<&str>) -> bool {
        let name = match name {
            Some(n) if !n.is_empty() => n.to_lowercase(),
            _ => return false,
        };
        self.phrases.iter().any(|p| name.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> IdentityMatcher {
        IdentityMatcher::new(["marketplace.tf", "marketplacetf", "tfmarketplace"])
    }

    #[test]
    fn contains_phrase_in_any_case() {
        let m = matcher();
        assert!(m.matches(Some("Marketplace.TF Bot #12")));
        assert!(m.matches(Some("xX_MARKETPLACETF_Xx")));
        assert!(m.matches(Some("tfmarketplace")));
    }

    #[test]
    fn ordinary_names_do_not_match() {
        let m = matcher();
        assert!(!m.matches(Some("random user")));
        assert!(!m.matches(Some("marketplace tf")));
    }

    #[test]
    fn missing_or_empty_name_is_false() {
        let m = matcher();
        assert!(!m.matches(None));
        assert!(!m.matches(Some("")));
    }

    #[test]
    fn configured_phrases_are_normalised() {
        let m = IdentityMatcher::new(["  Trusted Trading ", "TRUSTEDTRADING", ""]);
        assert_eq!(m.phrases(), ["trusted trading", "trustedtrading"]);
        assert!(m.matches(Some("Trusted Trading Co")));
        assert!(m.matches(Some("trustedtrading")));
    }

    #[test]
    fn every_phrase_matches_names_containing_it() {
        let m = matcher();
        for phrase in m.phrases().to_vec() {
            for name in [
                phrase.clone(),
                format!("prefix {}", phrase),
                format!("{} suffix", phrase.to_uppercase()),
            ] {
                assert!(m.matches(Some(&name)), "{name} should match {phrase}");
            }
        }
    }
}
