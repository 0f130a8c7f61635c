//! Minimal WebSocket client for the ElevenLabs Conversational AI
//! endpoint: typed server events over a broadcast channel, automatic
//! pong replies, and a small send surface for session control and
//! caller audio.

mod client;
pub mod types;

pub use client::{Client, ServerRx, connect, connect_with_capacity};
