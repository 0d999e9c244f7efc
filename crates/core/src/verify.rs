/// Human-typed answers tolerate surrounding whitespace and any casing.
pub fn answers_match(expected: &str, supplied: &str) -> bool {
    expected.trim().to_lowercase() == supplied.trim().to_lowercase()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    Retry { remaining: u32 },
    Exhausted,
}

/// Bounded identity check. The original call flows retried forever; the
/// gate caps attempts so adversarial input cannot loop the agent.
#[derive(Clone, Debug)]
pub struct VerificationGate {
    max_attempts: u32,
    attempts: u32,
}

impl VerificationGate {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1), attempts: 0 }
    }

    /// Rebuild a gate from persisted session counters, so a pure transition
    /// function can ask it for the attempt decision.
    pub fn resume(max_attempts: u32, attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1), attempts }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn check(&mut self, expected: &str, supplied: &str) -> VerificationOutcome {
        if answers_match(expected, supplied) {
            return VerificationOutcome::Verified;
        }
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            VerificationOutcome::Exhausted
        } else {
            VerificationOutcome::Retry { remaining: self.max_attempts - self.attempts }
        }
    }
}

impl Default for VerificationGate {
    fn default() -> Self {
        Self::new(3)
    }
}
