use serde::{Deserialize, Serialize};

use crate::phases::states::FlowKind;

/// The conversation modes that carry a distinct persona. A persona is data
/// selected from a static table, not a type hierarchy: switching replaces
/// the whole descriptor at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaMode {
    Learn,
    Quiz,
    TeachBack,
    Improv,
    Fraud,
    Sdr,
    Wellness,
}

impl PersonaMode {
    /// Case-insensitive parse of a user- or tool-supplied mode name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace('-', "_").as_str() {
            "learn" => Some(Self::Learn),
            "quiz" => Some(Self::Quiz),
            "teach_back" | "teachback" => Some(Self::TeachBack),
            "improv" => Some(Self::Improv),
            "fraud" => Some(Self::Fraud),
            "sdr" => Some(Self::Sdr),
            "wellness" => Some(Self::Wellness),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learn => "learn",
            Self::Quiz => "quiz",
            Self::TeachBack => "teach_back",
            Self::Improv => "improv",
            Self::Fraud => "fraud",
            Self::Sdr => "sdr",
            Self::Wellness => "wellness",
        }
    }

    /// The persona a freshly started flow begins with.
    pub fn initial_for(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Round => Self::Improv,
            FlowKind::Tutor => Self::Learn,
            FlowKind::Fraud => Self::Fraud,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    pub mode: PersonaMode,
    pub instructions: String,
    pub voice_id: String,
    pub tools: Vec<String>,
}

/// Static mode-to-persona table. Voice identities follow the synthesis
/// voices the product ships with.
pub struct PersonaCatalog;

impl PersonaCatalog {
    pub fn descriptor(mode: PersonaMode) -> PersonaDescriptor {
        let (instructions, voice_id, tools): (&str, &str, &[&str]) = match mode {
            PersonaMode::Learn => (
                "You are an energetic active-recall coach in LEARN mode. Teach the \
                 current concept in short, vivid spoken sentences, then invite the \
                 user to be quizzed or to teach it back.",
                "en-US-matthew",
                &["switch_mode", "evaluate_teach_back"],
            ),
            PersonaMode::Quiz => (
                "You are an active-recall coach in QUIZ mode. Ask one sharp question \
                 about the current concept at a time and react to each answer before \
                 the next question.",
                "en-US-alicia",
                &["switch_mode", "evaluate_teach_back"],
            ),
            PersonaMode::TeachBack => (
                "You are an active-recall coach in TEACH-BACK mode. Listen to the \
                 user's explanation of the current concept and evaluate it: praise \
                 what is right, correct what is wrong, keep it short.",
                "en-US-ken",
                &["switch_mode", "evaluate_teach_back"],
            ),
            PersonaMode::Improv => (
                "You are the quick-witted host of an improv game. Set up each \
                 scenario with one line, react to the player's performance with \
                 playful energy, and keep every response under three sentences.",
                "en-US-ryan",
                &[],
            ),
            PersonaMode::Fraud => (
                "You are a fraud-detection representative for the bank. Be \
                 professional, calm, and reassuring. Never discuss the transaction \
                 before identity verification succeeds.",
                "en-US-matthew",
                &["verify_identity", "submit_report"],
            ),
            PersonaMode::Sdr => (
                "You are a friendly sales development representative. Collect the \
                 caller's name, company, email, role, use case, team size, and \
                 timeline, one question at a time, then save the lead.",
                "en-US-julia",
                &["create_record", "list_records", "get_last_record"],
            ),
            PersonaMode::Wellness => (
                "You are a gentle daily wellness companion. Ask about mood and \
                 goals, summarize the check-in back to the user, and log it.",
                "en-US-samantha",
                &["create_record", "get_last_record"],
            ),
        };
        PersonaDescriptor {
            mode,
            instructions: instructions.to_owned(),
            voice_id: voice_id.to_owned(),
            tools: tools.iter().map(|t| (*t).to_owned()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PersonaCatalog, PersonaMode};

    #[test]
    fn parse_accepts_spoken_variants() {
        assert_eq!(PersonaMode::parse("Quiz"), Some(PersonaMode::Quiz));
        assert_eq!(PersonaMode::parse(" teach-back "), Some(PersonaMode::TeachBack));
        assert_eq!(PersonaMode::parse("teachback"), Some(PersonaMode::TeachBack));
        assert_eq!(PersonaMode::parse("bogus"), None);
    }

    #[test]
    fn tutor_modes_have_distinct_voices() {
        let learn = PersonaCatalog::descriptor(PersonaMode::Learn);
        let quiz = PersonaCatalog::descriptor(PersonaMode::Quiz);
        let teach_back = PersonaCatalog::descriptor(PersonaMode::TeachBack);

        assert_eq!(learn.voice_id, "en-US-matthew");
        assert_eq!(quiz.voice_id, "en-US-alicia");
        assert_eq!(teach_back.voice_id, "en-US-ken");
    }

    #[test]
    fn fraud_persona_exposes_only_case_tools() {
        let fraud = PersonaCatalog::descriptor(PersonaMode::Fraud);
        assert_eq!(fraud.tools, vec!["verify_identity", "submit_report"]);
    }
}
