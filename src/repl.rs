//! Interactive Command Loop
//!
//! Reads command lines from any async reader, executes them through a
//! [`Session`], and writes each reply to an async writer.
//!
//! ## Loop
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 select!                      │
//! │                                              │
//! │  next line ──> meta command? ──> .view/.quit │
//! │       │                                      │
//! │       └──────> Session::execute ──> reply    │
//! │                                              │
//! │  refresh tick ──> render_view (read only)    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Commands run to completion one at a time. The refresh timer only fires
//! between commands and never modifies the store.

use crate::commands::Command;
use crate::render::render_view;
use crate::session::Session;
use crate::storage::{now_millis, Persistence};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, trace};

/// Options for [`run`].
#[derive(Debug, Clone, Default)]
pub struct ReplOptions {
    /// Re-render the document table on this interval (`None` disables)
    pub refresh: Option<Duration>,
    /// Prompt written before each line is read (`None` for no prompt)
    pub prompt: Option<String>,
}

impl ReplOptions {
    /// Creates options with no refresh and no prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the refresh interval. A zero duration disables refreshing.
    pub fn with_refresh(mut self, interval: Duration) -> Self {
        self.refresh = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Sets the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

/// Lines handled by the loop itself rather than the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meta {
    View,
    Help,
    Quit,
}

impl Meta {
    fn parse(line: &str) -> Option<Self> {
        match line {
            ".view" => Some(Meta::View),
            ".help" => Some(Meta::Help),
            ".quit" | ".exit" => Some(Meta::Quit),
            _ => None,
        }
    }
}

fn help_text() -> String {
    let mut lines: Vec<String> = Command::ALL
        .iter()
        .map(|c| format!("  {}", c.usage()))
        .collect();
    lines.push("  .view   show documents and indices".to_string());
    lines.push("  .quit   exit".to_string());
    lines.join("\n")
}

/// Runs the loop until end of input or `.quit`.
pub async fn run<R, W, P>(
    reader: R,
    writer: &mut W,
    session: &mut Session<P>,
    options: &ReplOptions,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    P: Persistence,
{
    let mut lines = reader.lines();
    let mut ticker = options.refresh.map(|period| {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });

    // The first tick of an interval completes immediately
    if let Some(interval) = ticker.as_mut() {
        interval.tick().await;
    }

    write_prompt(writer, options).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input");
                    break;
                };
                let line = line.trim();

                match Meta::parse(line) {
                    Some(Meta::Quit) => break,
                    Some(Meta::View) => {
                        write_block(writer, &render_view(session.database(), now_millis())).await?;
                    }
                    Some(Meta::Help) => write_block(writer, &help_text()).await?,
                    None => {
                        if let Some(reply) = session.execute(line) {
                            write_block(writer, &reply.to_string()).await?;
                        }
                    }
                }

                write_prompt(writer, options).await?;
            }
            _ = next_tick(&mut ticker) => {
                trace!("Refreshing view");
                write_block(writer, &render_view(session.database(), now_millis())).await?;
                write_prompt(writer, options).await?;
            }
        }
    }

    writer.flush().await
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn write_block<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

async fn write_prompt<W: AsyncWrite + Unpin>(writer: &mut W, options: &ReplOptions) -> io::Result<()> {
    if let Some(prompt) = &options.prompt {
        writer.write_all(prompt.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPersistence;
    use tokio::io::BufReader;

    async fn run_script(
        mock: tokio_test::io::Mock,
        options: &ReplOptions,
    ) -> (String, Session<MemoryPersistence>) {
        let mut session = Session::open(MemoryPersistence::new()).unwrap();
        let mut out = Vec::new();
        run(BufReader::new(mock), &mut out, &mut session, options)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), session)
    }

    #[tokio::test]
    async fn test_executes_lines_in_order() {
        let mock = tokio_test::io::Builder::new()
            .read(b"SET a {\"n\": 5}\n")
            .read(b"\n")
            .read(b"GET a\nGET b\n")
            .build();

        let (out, session) = run_script(mock, &ReplOptions::new()).await;

        assert_eq!(
            out,
            "OK\n{\n  \"n\": 5\n}\nError: Key not found: b\n"
        );
        assert_eq!(session.persistence().saves(), 1);
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let mock = tokio_test::io::Builder::new()
            .read(b"SET a {\"n\": 1}\n.quit\nDEL a\n")
            .build();

        let (out, session) = run_script(mock, &ReplOptions::new()).await;

        assert_eq!(out, "OK\n");
        assert!(session.database().contains("a"));
    }

    #[tokio::test]
    async fn test_view_and_help() {
        let mock = tokio_test::io::Builder::new()
            .read(b"SET a {\"n\": 1}\n.view\n.help\n")
            .build();

        let (out, _) = run_script(mock, &ReplOptions::new()).await;

        assert!(out.contains("KEY"));
        assert!(out.contains("(no indices)"));
        assert!(out.contains("RANGE <field> <start> <end>"));
    }

    #[tokio::test]
    async fn test_prompt() {
        let mock = tokio_test::io::Builder::new().read(b"GET x\n").build();
        let options = ReplOptions::new().with_prompt("> ");

        let (out, _) = run_script(mock, &options).await;

        assert_eq!(out, "> Error: Key not found: x\n> ");
    }

    #[tokio::test]
    async fn test_refresh_renders_between_commands() {
        let mock = tokio_test::io::Builder::new()
            .read(b"SET a {\"n\": 1} 60000\n")
            .wait(Duration::from_millis(200))
            .read(b".quit\n")
            .build();
        let options = ReplOptions::new().with_refresh(Duration::from_millis(50));

        let (out, session) = run_script(mock, &options).await;

        assert!(out.starts_with("OK\n"));
        assert!(out.contains("KEY"));
        assert!(out.contains("60s") || out.contains("59s"));
        // Refreshing never saves
        assert_eq!(session.persistence().saves(), 1);
    }

    #[test]
    fn test_zero_refresh_disables() {
        let options = ReplOptions::new().with_refresh(Duration::ZERO);
        assert_eq!(options.refresh, None);
    }
}
