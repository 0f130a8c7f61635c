use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Events the voice transport delivers to the controller, in arrival
/// order, over an mpsc channel. The close event logically happens-after
/// every turn event the transport delivered before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The conversation session is established.
    Open,
    /// One utterance, with the raw source tag the transport reported.
    Turn { source: String, text: String },
    /// The conversation session ended, whether user-requested or remote.
    Close,
    /// A transport-level failure.
    Error(String),
}

// The external real-time voice-conversation capability. The controller
// only ever asks it to open and close; actual state changes are driven
// by the events the transport emits, which keeps the transport
// authoritative about when a session really starts and ends.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait VoiceTransport {
    /// Acquire the audio input device needed for the conversation.
    async fn acquire_audio(&mut self) -> Result<()>;

    /// Open a conversation session with the given agent.
    async fn open_session(&mut self, agent_id: &str) -> Result<()>;

    /// Request that the current session be closed. The disconnect is
    /// reported asynchronously through the event stream.
    async fn close_session(&mut self) -> Result<()>;
}
