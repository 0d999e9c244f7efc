use parley_core::CancelReason;

/// Session-ending keyword scan, run on every completed user turn before the
/// flow sees it. Matching is word-bounded so "stop" fires and "unstoppable"
/// does not.
#[derive(Clone, Debug)]
pub struct CancelPolicy {
    keywords: Vec<String>,
}

impl CancelPolicy {
    pub fn new(keywords: impl IntoIterator<Item = String>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    pub fn scan(&self, transcript: &str) -> Option<CancelReason> {
        let haystack = transcript.to_lowercase();
        self.keywords
            .iter()
            .find(|keyword| contains_word(&haystack, keyword))
            .map(|keyword| CancelReason::Keyword(keyword.clone()))
    }
}

impl Default for CancelPolicy {
    fn default() -> Self {
        Self::new(
            ["stop", "quit", "exit", "cancel", "goodbye", "hang up"]
                .into_iter()
                .map(str::to_owned),
        )
    }
}

/// Substring search that only accepts matches bounded by non-alphanumeric
/// characters on both sides. Handles multi-word keywords like "hang up".
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(offset) = haystack[start..].find(needle) {
        let begin = start + offset;
        let end = begin + needle.len();
        let bounded_left = begin == 0
            || !haystack[..begin]
                .chars()
                .next_back()
                .is_some_and(|ch| ch.is_alphanumeric());
        let bounded_right = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(|ch| ch.is_alphanumeric());
        if bounded_left && bounded_right {
            return true;
        }
        start = begin + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use parley_core::CancelReason;

    use super::CancelPolicy;

    #[test]
    fn bare_keyword_fires() {
        let policy = CancelPolicy::default();
        assert_eq!(
            policy.scan("ok stop"),
            Some(CancelReason::Keyword("stop".to_owned()))
        );
        assert_eq!(
            policy.scan("STOP right there"),
            Some(CancelReason::Keyword("stop".to_owned()))
        );
    }

    #[test]
    fn keyword_inside_a_word_does_not_fire() {
        let policy = CancelPolicy::default();
        assert_eq!(policy.scan("you are unstoppable"), None);
        assert_eq!(policy.scan("the exits are marked"), None);
    }

    #[test]
    fn multi_word_keyword_fires() {
        let policy = CancelPolicy::default();
        assert_eq!(
            policy.scan("I'll just hang up now"),
            Some(CancelReason::Keyword("hang up".to_owned()))
        );
    }

    #[test]
    fn ordinary_speech_passes_through() {
        let policy = CancelPolicy::default();
        assert_eq!(policy.scan("tell me about my last order"), None);
    }
}
