//! Core session logic for the voice interview practice service:
//! the lifecycle state machine, the transcript store, the one-shot
//! feedback pipeline, and the controller that wires them to the
//! injected transport and generation capabilities.

pub mod controller;
pub mod error;
pub mod feedback;
pub mod gemini;
pub mod session;
pub mod transcript;
pub mod transport;

pub use controller::SessionController;
pub use error::StartError;
pub use feedback::{FeedbackGenerator, FeedbackResult};
pub use session::SessionState;
pub use transcript::{Speaker, Transcript, Turn};
pub use transport::{TransportEvent, VoiceTransport};
