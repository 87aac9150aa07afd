//! FAQ chat - terminal client
//!
//! Reads one question per line and prints the service's answers. `/new`
//! starts a fresh session, `/quit` exits. Logs go to stderr as JSON.

use faq_chat::{ChatSession, ClientConfig, Role, SessionSnapshot};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Slack on top of the request timeout before giving up on a turn
const SETTLE_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faq_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        endpoint = %config.endpoint,
        mode = config.mode.as_str(),
        timeout_secs = config.timeout.as_secs(),
        "Starting chat client"
    );

    let handle = ChatSession::connect(&config)?;
    let settle_timeout = config.timeout + SETTLE_GRACE;

    println!(
        "Connected to {}. Ask a question, /new to start over, /quit to exit.",
        config.endpoint
    );

    let mut shown = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                match handle.new_session().await {
                    Ok(()) => {
                        shown = 0;
                        println!("-- new session {} --", handle.snapshot().session_id);
                    }
                    Err(e) => println!("({e})"),
                }
                prompt()?;
                continue;
            }
            "" => {
                prompt()?;
                continue;
            }
            _ => {}
        }

        handle.set_draft(line.as_str()).await?;
        if let Err(e) = handle.submit(line).await {
            println!("({e})");
            prompt()?;
            continue;
        }

        match handle.wait_until_settled(settle_timeout).await {
            Some(snapshot) => shown = render(&snapshot, shown),
            None => println!("(no reply yet)"),
        }
        prompt()?;
    }

    Ok(())
}

/// Print bot turns not yet shown; returns the new high-water mark
fn render(snapshot: &SessionSnapshot, shown: usize) -> usize {
    for turn in snapshot.turns.iter().skip(shown) {
        if turn.role == Role::Bot {
            println!("{}", turn.text);
        }
    }
    if !snapshot.draft.is_empty() {
        println!("(kept your message: {})", snapshot.draft);
    }
    snapshot.turns.len()
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}
