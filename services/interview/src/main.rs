mod config;
mod transport;

use crate::config::Config;
use crate::transport::ElevenLabsTransport;
use anyhow::{Context, Result};
use clap::Parser;
use interview_core::controller::SessionController;
use interview_core::feedback::FeedbackResult;
use interview_core::gemini::GeminiClient;
use interview_core::session::SessionState;
use interview_core::transcript::Turn;
use interview_core::transport::TransportEvent;
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(about = "Practice a spoken technical interview with an AI interviewer")]
struct Cli {
    /// Audio input device name (defaults to the system default input)
    #[arg(long)]
    input_device: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting interview service...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 4. Wire the capabilities into the controller ---
    let (events_tx, mut events_rx) = tokio::sync::mpsc::channel::<TransportEvent>(64);

    let generator = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.feedback_model.clone(),
    );
    let transport = ElevenLabsTransport::new(events_tx, args.input_device);
    let mut controller = SessionController::new(transport, generator, config.agent_id.clone());

    // --- 5. Start the interview ---
    tracing::info!("Connecting to interview agent {}...", config.agent_id);
    controller.start().await.context("Connection failed")?;

    // --- 6. Event loop: the transport drives the session, Ctrl-C requests a stop ---
    loop {
        tokio::select! {
            event = events_rx.recv() => {
                match event {
                    Some(event) => {
                        if ends_before_open(controller.state(), &event) {
                            match event {
                                TransportEvent::Error(message) => {
                                    anyhow::bail!("Connection failed: {}", message)
                                }
                                _ => anyhow::bail!(
                                    "Connection failed: the conversation ended before it was established"
                                ),
                            }
                        }
                        controller.handle_event(event).await;
                        if controller.state() == SessionState::Disconnected {
                            break;
                        }
                    }
                    None => {
                        if controller.state() == SessionState::Idle {
                            anyhow::bail!(
                                "Connection failed: the transport event stream ended before the session was established"
                            );
                        }
                        tracing::warn!("Transport event stream ended unexpectedly");
                        controller.handle_event(TransportEvent::Close).await;
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, ending interview...");
                // A failed close request must not abort the process; the
                // accumulated transcript still gets reported when the
                // transport's own close lands.
                if let Err(e) = controller.stop().await {
                    tracing::error!("Failed to request session close: {:?}", e);
                }
            }
        }
    }

    // --- 7. Final report ---
    print_report(controller.transcript(), controller.feedback());
    Ok(())
}

/// A close or error landing while the controller is still idle means the
/// conversation died before it was ever established: there is no session
/// to wind down and no transcript to report, so the loop must not keep
/// waiting for events that will never come.
fn ends_before_open(state: SessionState, event: &TransportEvent) -> bool {
    state == SessionState::Idle
        && matches!(event, TransportEvent::Close | TransportEvent::Error(_))
}

fn print_report(transcript: &[Turn], feedback: Option<&FeedbackResult>) {
    println!();
    println!("=== Interview Transcript ===");
    for turn in transcript {
        println!("{}: {}", turn.speaker, turn.text);
    }
    println!();
    println!("=== Performance Review ===");
    match feedback {
        Some(FeedbackResult::Ready(text)) => println!("{}", text),
        Some(FeedbackResult::Failed(message)) => println!("{}", message),
        Some(FeedbackResult::Pending) => println!("The review is still being generated."),
        None => println!("No review was generated (the conversation had no turns)."),
    }
}
