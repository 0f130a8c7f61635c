//! Bridges the ElevenLabs conversational client to the core's
//! `VoiceTransport` capability: opens the socket, checks the audio
//! device, and forwards server events onto the controller's channel.

use anyhow::{Context, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};
use elevenlabs_convai::types::ServerEvent;
use interview_core::transport::{TransportEvent, VoiceTransport};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

/// Maps one conversational event onto the controller's transport event,
/// or `None` for events the session logic does not consume (audio
/// frames, pings).
pub fn map_event(event: ServerEvent) -> Option<TransportEvent> {
    match event {
        ServerEvent::ConversationInitiationMetadata {
            conversation_initiation_metadata_event,
        } => {
            tracing::debug!(
                "Conversation established: {}",
                conversation_initiation_metadata_event.conversation_id
            );
            Some(TransportEvent::Open)
        }
        ServerEvent::UserTranscript {
            user_transcription_event,
        } => Some(TransportEvent::Turn {
            source: "user".to_string(),
            text: user_transcription_event.user_transcript,
        }),
        ServerEvent::AgentResponse {
            agent_response_event,
        } => Some(TransportEvent::Turn {
            source: "ai".to_string(),
            text: agent_response_event.agent_response,
        }),
        ServerEvent::Close { .. } => Some(TransportEvent::Close),
        ServerEvent::Audio { .. } | ServerEvent::Ping { .. } | ServerEvent::Unknown => None,
    }
}

pub struct ElevenLabsTransport {
    events_tx: mpsc::Sender<TransportEvent>,
    input_device: Option<String>,
    client: Option<elevenlabs_convai::Client>,
}

impl ElevenLabsTransport {
    pub fn new(events_tx: mpsc::Sender<TransportEvent>, input_device: Option<String>) -> Self {
        Self {
            events_tx,
            input_device,
            client: None,
        }
    }
}

#[async_trait]
impl VoiceTransport for ElevenLabsTransport {
    async fn acquire_audio(&mut self) -> Result<()> {
        let device = default_input_device(self.input_device.as_deref())?;
        tracing::info!("Using input device: {:?}", device.name()?);
        Ok(())
    }

    async fn open_session(&mut self, agent_id: &str) -> Result<()> {
        let mut client = elevenlabs_convai::connect(agent_id)
            .await
            .context("Failed to connect to ElevenLabs conversational endpoint")?;
        // This hands back the receiver subscribed during connect, so the
        // metadata event cannot have been dropped in between.
        let mut events = client.events()?;

        // The forwarder task ends itself once the conversation closes.
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let done = matches!(event, ServerEvent::Close { .. });
                        if let Some(mapped) = map_event(event) {
                            if tx.send(mapped).await.is_err() {
                                break;
                            }
                        }
                        if done {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("dropped {} conversational events", missed);
                    }
                    Err(RecvError::Closed) => {
                        // Socket tasks ended without a close frame.
                        let _ = tx.send(TransportEvent::Close).await;
                        break;
                    }
                }
            }
        });

        self.client = Some(client);
        Ok(())
    }

    async fn close_session(&mut self) -> Result<()> {
        match self.client.as_ref() {
            Some(client) => client.close().await,
            None => Ok(()),
        }
    }
}

/// Finds the named input device, or the host default when no name is
/// given.
fn default_input_device(device_name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    tracing::debug!("Audio host: {:?}", host.id());
    match device_name {
        Some(target) => host
            .input_devices()
            .context("Failed to enumerate input devices")?
            .find(|d| d.name().is_ok_and(|name| name == target))
            .ok_or_else(|| anyhow::anyhow!("No input device named \"{}\"", target)),
        None => host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("No default input device available")),
    }
}
