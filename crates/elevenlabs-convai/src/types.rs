use serde::{Deserialize, Serialize};

// Outgoing messages

/// Type-tagged messages the client sends over the socket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Sent once after connecting so the server starts the conversation
    /// with the agent's server-side configuration.
    ConversationInitiationClientData,
    /// Reply to a server ping; echoes its event id.
    Pong { event_id: u64 },
}

/// Caller audio is sent as a bare object without a type tag.
#[derive(Debug, Clone, Serialize)]
pub struct UserAudioChunk {
    /// Base64-encoded PCM frame.
    pub user_audio_chunk: String,
}

// Incoming messages

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationInitiationMetadata {
    pub conversation_id: String,
    #[serde(default)]
    pub agent_output_audio_format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserTranscription {
    pub user_transcript: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentResponse {
    pub agent_response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioEvent {
    pub audio_base_64: String,
    #[serde(default)]
    pub event_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PingEvent {
    pub event_id: u64,
    #[serde(default)]
    pub ping_ms: Option<u64>,
}

/// Server events from the conversational endpoint.
///
/// `Close` never arrives as JSON; the client synthesizes it when the
/// socket closes so consumers see the end of the conversation in-band.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    ConversationInitiationMetadata {
        conversation_initiation_metadata_event: ConversationInitiationMetadata,
    },
    UserTranscript {
        user_transcription_event: UserTranscription,
    },
    AgentResponse {
        agent_response_event: AgentResponse,
    },
    Audio {
        audio_event: AudioEvent,
    },
    Ping {
        ping_event: PingEvent,
    },
    #[serde(skip)]
    Close { reason: Option<String> },
    /// Event types this client does not consume.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_user_transcript() {
        let json = r#"{
            "type": "user_transcript",
            "user_transcription_event": { "user_transcript": "I build backend systems" }
        }"#;
        let event: ServerEvent = serde_json::from_str(json).expect("valid event");
        match event {
            ServerEvent::UserTranscript {
                user_transcription_event,
            } => assert_eq!(
                user_transcription_event.user_transcript,
                "I build backend systems"
            ),
            other => panic!("Expected UserTranscript, got {:?}", other),
        }
    }

    #[test]
    fn deserializes_agent_response() {
        let json = r#"{
            "type": "agent_response",
            "agent_response_event": { "agent_response": "Tell me about yourself." }
        }"#;
        let event: ServerEvent = serde_json::from_str(json).expect("valid event");
        assert!(matches!(event, ServerEvent::AgentResponse { .. }));
    }

    #[test]
    fn unrecognized_event_types_map_to_unknown() {
        let json = r#"{ "type": "internal_tentative_agent_response", "data": {} }"#;
        let event: ServerEvent = serde_json::from_str(json).expect("valid event");
        assert!(matches!(event, ServerEvent::Unknown));
    }

    #[test]
    fn serializes_pong_with_event_id() {
        let json = serde_json::to_string(&ClientEvent::Pong { event_id: 42 }).expect("serializes");
        assert_eq!(json, r#"{"type":"pong","event_id":42}"#);
    }

    #[test]
    fn serializes_conversation_initiation() {
        let json = serde_json::to_string(&ClientEvent::ConversationInitiationClientData)
            .expect("serializes");
        assert_eq!(json, r#"{"type":"conversation_initiation_client_data"}"#);
    }

    #[test]
    fn serializes_audio_chunk_without_type_tag() {
        let chunk = UserAudioChunk {
            user_audio_chunk: "AAAA".to_string(),
        };
        let json = serde_json::to_string(&chunk).expect("serializes");
        assert_eq!(json, r#"{"user_audio_chunk":"AAAA"}"#);
    }
}
