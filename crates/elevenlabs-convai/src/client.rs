use crate::types::{ClientEvent, ServerEvent, UserAudioChunk};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

const CONVAI_WS_URL: &str = "wss://api.elevenlabs.io/v1/convai/conversation";

/// Everything the writer task can put on the socket.
#[derive(Debug)]
enum Outbound {
    Event(ClientEvent),
    Audio(UserAudioChunk),
    Close,
}

type ClientTx = tokio::sync::mpsc::Sender<Outbound>;
type ServerTx = tokio::sync::broadcast::Sender<ServerEvent>;
pub type ServerRx = tokio::sync::broadcast::Receiver<ServerEvent>;

// Holds the channel capacity plus the client and server transmitters.
// The socket itself lives inside the two spawned reader/writer tasks.
// A receiver is subscribed during `connect` so events arriving before
// the consumer first asks for the stream are buffered, not dropped.
pub struct Client {
    capacity: usize,
    c_tx: Option<ClientTx>,
    s_tx: Option<ServerTx>,
    s_rx: Option<ServerRx>,
}

impl Client {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            c_tx: None,
            s_tx: None,
            s_rx: None,
        }
    }

    async fn connect(&mut self, agent_id: &str) -> Result<()> {
        if self.c_tx.is_some() {
            return Err(anyhow::anyhow!("already connected"));
        }
        if agent_id.trim().is_empty() {
            return Err(anyhow::anyhow!("agent id must not be empty"));
        }

        let url = format!("{}?agent_id={}", CONVAI_WS_URL, agent_id);
        let (ws_stream, _) = tokio_tungstenite::connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        let (c_tx, mut c_rx) = tokio::sync::mpsc::channel::<Outbound>(self.capacity);
        let (s_tx, s_rx) = tokio::sync::broadcast::channel(self.capacity);
        self.c_tx = Some(c_tx.clone());
        self.s_tx = Some(s_tx.clone());
        // Subscribed before the reader task starts, so the server's
        // first events cannot be lost to an empty broadcast channel.
        self.s_rx = Some(s_rx);

        // Writer task: serializes outbound messages onto the socket.
        tokio::spawn(async move {
            while let Some(outbound) = c_rx.recv().await {
                let message = match &outbound {
                    Outbound::Event(event) => match serde_json::to_string(event) {
                        Ok(text) => Message::Text(text),
                        Err(e) => {
                            tracing::error!("failed to serialize event: {}", e);
                            continue;
                        }
                    },
                    Outbound::Audio(chunk) => match serde_json::to_string(chunk) {
                        Ok(text) => Message::Text(text),
                        Err(e) => {
                            tracing::error!("failed to serialize audio chunk: {}", e);
                            continue;
                        }
                    },
                    Outbound::Close => Message::Close(None),
                };
                let closing = matches!(outbound, Outbound::Close);
                if let Err(e) = write.send(message).await {
                    tracing::error!("failed to send message: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        // Reader task: parses server events and broadcasts them. Ping
        // events are answered here so latency bookkeeping never reaches
        // the consumer.
        let pong_tx = c_tx.clone();
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        let _ = s_tx.send(ServerEvent::Close {
                            reason: Some(e.to_string()),
                        });
                        break;
                    }
                };
                match message {
                    Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            if let ServerEvent::Ping { ping_event } = &event {
                                let pong = Outbound::Event(ClientEvent::Pong {
                                    event_id: ping_event.event_id,
                                });
                                if pong_tx.send(pong).await.is_err() {
                                    tracing::warn!("writer gone, cannot answer ping");
                                }
                            }
                            if s_tx.send(event).is_err() {
                                tracing::debug!("no subscribers for server event");
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                "failed to deserialize event: {}, text => {:?}",
                                e,
                                text
                            );
                        }
                    },
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        let close = ServerEvent::Close {
                            reason: reason.map(|frame| frame.reason.to_string()),
                        };
                        let _ = s_tx.send(close);
                        break;
                    }
                    _ => {}
                }
            }
            drop(pong_tx);
        });

        // The server waits for the initiation message before starting
        // the conversation.
        self.send(Outbound::Event(ClientEvent::ConversationInitiationClientData))
            .await
    }

    async fn send(&self, outbound: Outbound) -> Result<()> {
        match self.c_tx {
            Some(ref tx) => {
                tx.send(outbound)
                    .await
                    .map_err(|_| anyhow::anyhow!("connection closed"))?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("not connected yet")),
        }
    }

    /// Subscribe to the stream of server events.
    ///
    /// The first call hands out the receiver that was subscribed during
    /// `connect`, which has buffered everything since then. Later calls
    /// get a fresh subscription that only sees new events.
    pub fn events(&mut self) -> Result<ServerRx> {
        if let Some(rx) = self.s_rx.take() {
            return Ok(rx);
        }
        match self.s_tx {
            Some(ref tx) => Ok(tx.subscribe()),
            None => Err(anyhow::anyhow!("not connected yet")),
        }
    }

    /// Send one base64-encoded PCM chunk of caller audio.
    pub async fn send_user_audio(&self, audio_base64: String) -> Result<()> {
        self.send(Outbound::Audio(UserAudioChunk {
            user_audio_chunk: audio_base64,
        }))
        .await
    }

    /// Ask to end the conversation by closing the socket. The server's
    /// close is observed as a `ServerEvent::Close` on the event stream.
    pub async fn close(&self) -> Result<()> {
        self.send(Outbound::Close).await
    }
}

/// Connects to the conversational endpoint for the given agent.
pub async fn connect(agent_id: &str) -> Result<Client> {
    connect_with_capacity(agent_id, 256).await
}

pub async fn connect_with_capacity(agent_id: &str, capacity: usize) -> Result<Client> {
    let mut client = Client::new(capacity);
    client.connect(agent_id).await?;
    Ok(client)
}
