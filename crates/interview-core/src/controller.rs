use crate::error::StartError;
use crate::feedback::{self, FeedbackGenerator, FeedbackResult, OnceLatch};
use crate::session::SessionState;
use crate::transcript::{Speaker, Transcript, Turn};
use crate::transport::{TransportEvent, VoiceTransport};
use anyhow::{Context, Result};

/// Owns one live interview session: drives the state machine from
/// transport events, accumulates the transcript, and invokes the
/// feedback pipeline exactly once when the session ends.
///
/// The controller is single-owner state. Only its own event handlers
/// mutate the transcript and session state, and `handle_event` awaits
/// each handler to completion before the next event is processed, so no
/// locking is needed and turns land in arrival order.
pub struct SessionController<T, G> {
    transport: T,
    generator: G,
    agent_id: String,
    state: SessionState,
    transcript: Transcript,
    feedback: Option<FeedbackResult>,
    latch: OnceLatch,
}

impl<T, G> SessionController<T, G>
where
    T: VoiceTransport + Send,
    G: FeedbackGenerator + Send + Sync,
{
    pub fn new(transport: T, generator: G, agent_id: impl Into<String>) -> Self {
        Self {
            transport,
            generator,
            agent_id: agent_id.into(),
            state: SessionState::Idle,
            transcript: Transcript::new(),
            feedback: None,
            latch: OnceLatch::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live transcript, in arrival order.
    pub fn transcript(&self) -> &[Turn] {
        self.transcript.snapshot()
    }

    /// `None` until a completed non-empty session has produced one.
    pub fn feedback(&self) -> Option<&FeedbackResult> {
        self.feedback.as_ref()
    }

    /// Acquires the audio capability, then asks the transport to open a
    /// session with the configured agent.
    ///
    /// The state stays `Idle` until the transport's own open event
    /// arrives; on any failure it also stays `Idle` and the user may
    /// retry. Calling while a session is live is a no-op.
    pub async fn start(&mut self) -> Result<(), StartError> {
        if self.state.is_connected() {
            tracing::warn!("start() ignored: a session is already live");
            return Ok(());
        }
        if self.state == SessionState::Disconnected {
            // The finished instance is terminal; a new interview begins
            // at a fresh Idle.
            self.state = SessionState::Idle;
        }
        if self.agent_id.trim().is_empty() {
            return Err(StartError::MissingAgentId);
        }
        self.transport
            .acquire_audio()
            .await
            .map_err(StartError::Connection)?;
        self.transport
            .open_session(&self.agent_id)
            .await
            .map_err(StartError::Connection)?;
        Ok(())
    }

    /// Requests that the transport close the session. The transition to
    /// `Disconnected` happens when the transport's close event arrives,
    /// not here. A no-op unless a session is live.
    pub async fn stop(&mut self) -> Result<()> {
        if !self.state.is_connected() {
            tracing::warn!(state = ?self.state, "stop() ignored: no live session");
            return Ok(());
        }
        self.transport
            .close_session()
            .await
            .context("failed to request session close")
    }

    /// Single entry point for transport events, applied strictly in
    /// arrival order.
    pub async fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => self.on_open(),
            TransportEvent::Turn { source, text } => self.on_turn(&source, text),
            TransportEvent::Close => self.on_close().await,
            TransportEvent::Error(message) => self.on_transport_error(message).await,
        }
    }

    fn on_open(&mut self) {
        match self.state.on_transport_open() {
            Some(next) => {
                self.state = next;
                // Fresh session: empty transcript, no stale report.
                self.transcript.reset();
                self.feedback = None;
                self.latch.arm();
                tracing::info!("Interview session connected");
            }
            None => tracing::warn!(state = ?self.state, "ignoring open event"),
        }
    }

    fn on_turn(&mut self, source: &str, text: String) {
        if !self.state.is_connected() {
            tracing::warn!(state = ?self.state, "dropping turn outside live session");
            return;
        }
        let turn = Turn::new(Speaker::from_source_tag(source), text);
        tracing::info!("{}: {}", turn.speaker, turn.text);
        self.transcript.append(turn);
    }

    async fn on_close(&mut self) {
        let Some(next) = self.state.on_transport_close() else {
            tracing::warn!(state = ?self.state, "ignoring close event");
            return;
        };
        self.state = next;
        self.transcript.seal();
        tracing::info!(turns = self.transcript.len(), "Interview session ended");
        self.run_feedback_pipeline().await;
    }

    async fn on_transport_error(&mut self, message: String) {
        if self.state.is_connected() {
            // Mid-session failure is an unexpected close; the turns
            // accumulated so far still get reviewed.
            tracing::error!("Transport error mid-session: {}", message);
            self.on_close().await;
        } else {
            tracing::error!("Transport error: {}", message);
        }
    }

    /// Runs at most once per session instance (latch) and only for a
    /// non-empty transcript. The result is `Pending` while the backend
    /// call is in flight and terminal afterwards.
    async fn run_feedback_pipeline(&mut self) {
        if !self.latch.fire() {
            tracing::warn!("feedback pipeline already ran for this session");
            return;
        }
        if self.transcript.is_empty() {
            tracing::info!("Empty transcript, skipping feedback generation");
            return;
        }
        self.feedback = Some(FeedbackResult::Pending);
        let result = feedback::generate_feedback(&self.generator, self.transcript.snapshot()).await;
        self.feedback = Some(result);
    }
}
