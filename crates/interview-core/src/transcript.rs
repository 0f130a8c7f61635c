use std::fmt;

/// Which side of the interview produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Interviewer,
    Candidate,
}

impl Speaker {
    /// Normalizes the raw source tag reported by the transport. Anything
    /// that is not recognizably the candidate's side is attributed to
    /// the interviewer so the dichotomy stays total.
    pub fn from_source_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "user" | "candidate" => Speaker::Candidate,
            _ => Speaker::Interviewer,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Interviewer => write!(f, "Interviewer"),
            Speaker::Candidate => write!(f, "Candidate"),
        }
    }
}

/// One attributed utterance. Immutable once created; ordering is the
/// arrival order of the transport's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Append-only log of turns for a single session.
///
/// The store starts sealed. `reset` empties and reopens it when a
/// session connects, `seal` closes it again on disconnect, so a turn
/// arriving late can never land in the wrong session's transcript.
#[derive(Debug)]
pub struct Transcript {
    turns: Vec<Turn>,
    sealed: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            sealed: true,
        }
    }

    /// Clears all turns and reopens the store for appends.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.sealed = false;
    }

    /// Appends a turn at the end, returning `false` if the store is
    /// sealed and the turn was dropped.
    pub fn append(&mut self, turn: Turn) -> bool {
        if self.sealed {
            return false;
        }
        self.turns.push(turn);
        true
    }

    /// Rejects any further appends until the next `reset`.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// The current ordered turns, without mutation.
    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_tags_normalize_to_a_total_dichotomy() {
        assert_eq!(Speaker::from_source_tag("user"), Speaker::Candidate);
        assert_eq!(Speaker::from_source_tag("candidate"), Speaker::Candidate);
        assert_eq!(Speaker::from_source_tag("ai"), Speaker::Interviewer);
        assert_eq!(Speaker::from_source_tag("agent"), Speaker::Interviewer);
        // Unknown tags fall back to the interviewer side.
        assert_eq!(Speaker::from_source_tag("system"), Speaker::Interviewer);
        assert_eq!(Speaker::from_source_tag(""), Speaker::Interviewer);
        assert_eq!(Speaker::from_source_tag(" User "), Speaker::Candidate);
    }

    #[test]
    fn appends_preserve_arrival_order() {
        let mut transcript = Transcript::new();
        transcript.reset();
        assert!(transcript.append(Turn::new(Speaker::Interviewer, "first")));
        assert!(transcript.append(Turn::new(Speaker::Candidate, "second")));
        assert!(transcript.append(Turn::new(Speaker::Interviewer, "third")));

        let texts: Vec<&str> = transcript
            .snapshot()
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn new_store_rejects_appends_until_reset() {
        let mut transcript = Transcript::new();
        assert!(!transcript.append(Turn::new(Speaker::Candidate, "too early")));
        assert!(transcript.is_empty());

        transcript.reset();
        assert!(transcript.append(Turn::new(Speaker::Candidate, "in session")));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn sealed_store_drops_late_turns() {
        let mut transcript = Transcript::new();
        transcript.reset();
        transcript.append(Turn::new(Speaker::Interviewer, "hello"));
        transcript.seal();

        assert!(!transcript.append(Turn::new(Speaker::Candidate, "after close")));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn reset_discards_the_previous_session() {
        let mut transcript = Transcript::new();
        transcript.reset();
        transcript.append(Turn::new(Speaker::Interviewer, "old session"));
        transcript.seal();

        transcript.reset();
        assert!(transcript.is_empty());
        assert!(transcript.append(Turn::new(Speaker::Candidate, "new session")));
        assert_eq!(transcript.snapshot()[0].text, "new session");
    }
}
