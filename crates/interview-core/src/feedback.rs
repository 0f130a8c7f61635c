use crate::transcript::Turn;
use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Shown to the user when the generation backend fails. The raw error is
/// only ever logged, never surfaced.
pub const GENERATION_FAILURE_MESSAGE: &str =
    "We couldn't generate your performance review for this session. \
     The transcript is still available.";

/// Outcome of the one-shot post-session analysis.
///
/// `Pending` only exists between the disconnect transition and pipeline
/// completion; afterwards the result is terminal. A session that never
/// produced one (empty transcript) is represented by the controller as
/// `None` rather than a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackResult {
    Pending,
    /// The backend's review text, verbatim.
    Ready(String),
    /// Generation failed; carries a generic user-facing message.
    Failed(String),
}

impl FeedbackResult {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FeedbackResult::Pending)
    }
}

// The `FeedbackGenerator` trait is the contract for any backend that can
// turn a prompt into review text. The controller depends on this
// abstraction rather than a concrete client, which keeps the session
// logic testable with `mockall`'s generated mock and lets providers be
// swapped without touching it.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait FeedbackGenerator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Serializes the transcript one line per turn, `<speaker>: <text>`,
/// preserving arrival order.
pub fn render_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.speaker, t.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Composes the assessment prompt sent to the generation backend.
pub fn build_prompt(turns: &[Turn]) -> String {
    format!(
        "You are a Senior Technical Recruiter at Google. \
         Analyze this interview transcript:\n\
         {}\n\
         Provide a performance review in Markdown. Focus on: Technical Accuracy, \
         Communication Clarity, and a Final Verdict (Hire/No Hire).",
        render_transcript(turns)
    )
}

/// Runs the pipeline against an already-snapshotted transcript.
///
/// Always resolves to a terminal result: success carries the backend's
/// text verbatim, any failure is mapped to a fixed generic message with
/// the cause logged. Callers enforce the non-empty and once-per-session
/// preconditions.
pub async fn generate_feedback<G>(generator: &G, turns: &[Turn]) -> FeedbackResult
where
    G: FeedbackGenerator + Send + Sync + ?Sized,
{
    let prompt = build_prompt(turns);
    match generator.generate(&prompt).await {
        Ok(text) => FeedbackResult::Ready(text),
        Err(e) => {
            tracing::error!("Feedback generation failed: {:?}", e);
            FeedbackResult::Failed(GENERATION_FAILURE_MESSAGE.to_string())
        }
    }
}

/// One-shot latch guarding the pipeline invocation.
///
/// `fire` returns `true` exactly once per arming; `arm` re-arms it when
/// a new session connects.
#[derive(Debug, Default)]
pub struct OnceLatch {
    fired: bool,
}

impl OnceLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        self.fired = false;
    }

    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Speaker;

    fn two_turn_transcript() -> Vec<Turn> {
        vec![
            Turn::new(Speaker::Interviewer, "Tell me about yourself"),
            Turn::new(Speaker::Candidate, "I build backend systems"),
        ]
    }

    #[test]
    fn transcript_renders_one_line_per_turn_in_order() {
        let rendered = render_transcript(&two_turn_transcript());
        assert_eq!(
            rendered,
            "Interviewer: Tell me about yourself\nCandidate: I build backend systems"
        );
    }

    #[test]
    fn prompt_contains_transcript_and_assessment_framing() {
        let prompt = build_prompt(&two_turn_transcript());
        assert!(prompt.starts_with("You are a Senior Technical Recruiter at Google."));
        assert!(prompt.contains("Interviewer: Tell me about yourself"));
        assert!(prompt.contains("Candidate: I build backend systems"));
        assert!(prompt.contains("Technical Accuracy"));
        assert!(prompt.contains("Communication Clarity"));
        assert!(prompt.contains("Hire/No Hire"));
    }

    #[test]
    fn latch_fires_exactly_once_per_arming() {
        let mut latch = OnceLatch::new();
        latch.arm();
        assert!(latch.fire());
        assert!(!latch.fire());
        assert!(!latch.fire());

        latch.arm();
        assert!(latch.fire());
        assert!(!latch.fire());
    }

    #[tokio::test]
    async fn success_is_ready_with_verbatim_text() {
        let mut generator = MockFeedbackGenerator::new();
        generator
            .expect_generate()
            .returning(|_prompt| Box::pin(async { Ok("**Verdict: Hire**".to_string()) }))
            .once();

        let result = generate_feedback(&generator, &two_turn_transcript()).await;
        assert_eq!(result, FeedbackResult::Ready("**Verdict: Hire**".to_string()));
        assert!(result.is_terminal());
    }

    #[tokio::test]
    async fn failure_resolves_to_failed_with_generic_message() {
        let mut generator = MockFeedbackGenerator::new();
        generator
            .expect_generate()
            .returning(|_prompt| {
                Box::pin(async { Err(anyhow::anyhow!("429: quota exceeded for project")) })
            })
            .once();

        let result = generate_feedback(&generator, &two_turn_transcript()).await;
        match result {
            FeedbackResult::Failed(message) => {
                assert_eq!(message, GENERATION_FAILURE_MESSAGE);
                // The raw backend error must never reach the user.
                assert!(!message.contains("quota"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }
}
