//! Logging initialization: logs never share stdout with command output.
//!
//! Reads `RUST_LOG` (level) and `LOG_FILE` (path) from env (e.g. via .env).
//! When `LOG_FILE` is set, logs are appended to that file; otherwise they go to stderr.

use std::io::Write;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Installs the global subscriber.
///
/// - **RUST_LOG**: Log level filter, e.g. `info`, `debug`, `studio=debug`. Default: `info`.
/// - **LOG_FILE**: When set, logs are appended to this file (plain text, no ANSI, with span ids).
///   When unset, logs are written to stderr.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let writer = std::sync::Mutex::new(StripAnsiWriter::new(file));
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(crate::log_format::TextWithSpanIds::new())
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(filter);
        tracing_subscriber::registry().with(file_layer).init();
        tracing::info!(path = %path, "studio logging to file");
    } else {
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter);
        tracing_subscriber::registry().with(stderr_layer).init();
    }
    Ok(())
}

/// Strips ANSI CSI sequences (`ESC [ ... final`) so file logs are plain text.
struct StripAnsiWriter<W> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> StripAnsiWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(16),
        }
    }
}

impl<W: Write> Write for StripAnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        for &b in buf {
            match self.pending.len() {
                0 if b == 0x1b => self.pending.push(b),
                0 => self.inner.write_all(&[b])?,
                1 if b == b'[' => self.pending.push(b),
                1 => {
                    // Lone ESC: not a CSI sequence, keep it.
                    self.pending.push(b);
                    self.inner.write_all(&self.pending)?;
                    self.pending.clear();
                }
                _ if (0x40..=0x7e).contains(&b) => self.pending.clear(),
                _ if self.pending.len() > 64 => {
                    self.pending.push(b);
                    self.inner.write_all(&self.pending)?;
                    self.pending.clear();
                }
                _ => self.pending.push(b),
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(&self.pending)?;
            self.pending.clear();
        }
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(input: &[u8]) -> String {
        let mut w = StripAnsiWriter::new(Vec::new());
        w.write_all(input).unwrap();
        w.flush().unwrap();
        String::from_utf8(w.inner).unwrap()
    }

    #[test]
    fn removes_color_codes() {
        assert_eq!(strip(b"\x1b[1;32mINFO\x1b[0m models loaded"), "INFO models loaded");
    }

    #[test]
    fn keeps_plain_text_and_lone_escape() {
        assert_eq!(strip(b"plain"), "plain");
        assert_eq!(strip(b"a\x1bxb"), "a\x1bxb");
    }

    #[test]
    fn sequence_split_across_writes_is_removed() {
        let mut w = StripAnsiWriter::new(Vec::new());
        w.write_all(b"x\x1b[3").unwrap();
        w.write_all(b"1my").unwrap();
        w.flush().unwrap();
        assert_eq!(String::from_utf8(w.inner).unwrap(), "xy");
    }
}
