//! Status line served to each client.

use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Renders `<name> <version> up <secs>s`.
#[derive(Debug, Clone)]
pub struct StatusLine {
    name: String,
    started_at: Instant,
}

impl StatusLine {
    pub fn new(name: &str, started_at: Instant) -> Self {
        Self {
            name: name.to_string(),
            started_at,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} {} up {}s\n",
            self.name,
            env!("CARGO_PKG_VERSION"),
            self.started_at.elapsed().as_secs()
        )
    }
}

/// Write one line and close the write side.
pub async fn write_line(mut stream: TcpStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.shutdown().await
}
