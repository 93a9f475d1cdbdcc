//! Stdio gateway: read events from stdin → merge engine → print forwarded payloads.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::channel::InboundMessage;
use crate::gate::SharedMergeEngine;

/// Default separator between session id and text on one input line.
pub const DEFAULT_STDIO_SEPARATOR: &str = "\t";

/// Input framing for the stdio gateway.
#[derive(Debug, Clone)]
pub struct StdioOptions {
    /// Fixed session id; when set, the whole line is the message text.
    pub session_id: Option<String>,
    /// Separator between session id and text when no fixed session is set.
    pub separator: String,
}

impl Default for StdioOptions {
    fn default() -> Self {
        Self {
            session_id: None,
            separator: DEFAULT_STDIO_SEPARATOR.to_string(),
        }
    }
}

/// Parse one input line into a message.
///
/// With a fixed session only empty lines yield `None`; whitespace is valid text.
/// Otherwise blank or unframed lines yield `None`.
pub fn parse_stdio_line(line: &str, options: &StdioOptions) -> Option<InboundMessage> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return None;
    }
    if let Some(session_id) = options.session_id.as_deref() {
        return Some(InboundMessage::new(session_id, line));
    }
    if line.trim().is_empty() {
        return None;
    }
    if options.separator.is_empty() {
        return None;
    }
    let (session_id, text) = line.split_once(options.separator.as_str())?;
    let session_id = session_id.trim();
    if session_id.is_empty() {
        return None;
    }
    Some(InboundMessage::new(session_id, text))
}

/// Run stdio loop until EOF or Ctrl+C.
pub async fn run_stdio(engine: SharedMergeEngine, options: StdioOptions) -> Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    tokio::select! {
        forwarded = run_stdio_with(&engine, &options, reader, writer) => {
            let forwarded = forwarded?;
            tracing::info!(forwarded, "stdio input closed");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("stdio gateway interrupted");
        }
    }
    Ok(())
}

/// Drive the engine from `reader`, writing one JSON line per forwarded message.
///
/// Returns the number of forwarded messages.
pub async fn run_stdio_with<R, W>(
    engine: &SharedMergeEngine,
    options: &StdioOptions,
    reader: R,
    mut writer: W,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let Some(message) = parse_stdio_line(&line, options) else {
            if !line.trim().is_empty() {
                tracing::warn!(
                    line_chars = line.chars().count(),
                    "skipping input line without `<session><separator><text>` framing"
                );
            }
            continue;
        };
        let Some(outbound) = engine.process(message).await else {
            continue;
        };
        let mut payload =
            serde_json::to_string(&outbound).context("failed to encode forwarded message")?;
        payload.push('\n');
        writer
            .write_all(payload.as_bytes())
            .await
            .context("failed to write forwarded message")?;
        writer.flush().await.context("failed to flush output")?;
        forwarded += 1;
    }
    Ok(forwarded)
}
