use serde::{Deserialize, Serialize};

/// A suspicious-transaction case under review. Field names keep the camelCase
/// keys of the existing fraud documents so seeded data stays readable by both
/// generations of the tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCase {
    pub user_name: String,
    pub transaction_name: String,
    pub transaction_amount: String,
    pub transaction_time: String,
    pub transaction_location: String,
    pub card_ending: String,
    pub security_question: String,
    pub security_answer: String,
    pub status: String,
    pub outcome: String,
}

impl FraudCase {
    /// Case identity is the human-typed user name, matched case-insensitively.
    pub fn matches_user(&self, user_name: &str) -> bool {
        self.user_name.eq_ignore_ascii_case(user_name.trim())
    }

    /// One-line transaction readout for the verified customer.
    pub fn transaction_summary(&self) -> String {
        format!(
            "{} for {} at {} on {}, on the card ending {}",
            self.transaction_name,
            self.transaction_amount,
            self.transaction_location,
            self.transaction_time,
            self.card_ending,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::FraudCase;

    fn case() -> FraudCase {
        FraudCase {
            user_name: "John".to_owned(),
            transaction_name: "Acme Electronics".to_owned(),
            transaction_amount: "$742.50".to_owned(),
            transaction_time: "2026-08-27 03:14".to_owned(),
            transaction_location: "Austin, TX".to_owned(),
            card_ending: "4421".to_owned(),
            security_question: "What is your favorite color?".to_owned(),
            security_answer: "Blue".to_owned(),
            status: "pending".to_owned(),
            outcome: String::new(),
        }
    }

    #[test]
    fn user_match_is_case_insensitive() {
        let case = case();
        assert!(case.matches_user("john"));
        assert!(case.matches_user(" JOHN "));
        assert!(!case.matches_user("johnny"));
    }

    #[test]
    fn serializes_with_camel_case_document_keys() {
        let json = serde_json::to_value(case()).expect("serialize");
        assert!(json.get("userName").is_some());
        assert!(json.get("securityAnswer").is_some());
        assert!(json.get("user_name").is_none());
    }
}
