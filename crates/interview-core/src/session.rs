/// Lifecycle of one interview session instance.
///
/// Transitions are monotonic: `Idle -> Connected -> Disconnected`, and
/// nothing leads out of `Disconnected`. Starting another interview means
/// beginning a fresh instance back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connected,
    Disconnected,
}

impl SessionState {
    /// Transition for the transport reporting an established session.
    /// Returns the next state only from `Idle`.
    pub fn on_transport_open(self) -> Option<SessionState> {
        match self {
            SessionState::Idle => Some(SessionState::Connected),
            SessionState::Connected | SessionState::Disconnected => None,
        }
    }

    /// Transition for the transport reporting the session has ended,
    /// whether user-requested or remote termination. Returns the next
    /// state only from `Connected`.
    pub fn on_transport_close(self) -> Option<SessionState> {
        match self {
            SessionState::Connected => Some(SessionState::Disconnected),
            SessionState::Idle | SessionState::Disconnected => None,
        }
    }

    pub fn is_connected(self) -> bool {
        self == SessionState::Connected
    }
}
