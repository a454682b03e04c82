//! Output backends for host-facing events.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use poolwatch_types::{Outbound, Snapshot};

/// Output destination for snapshots and failure-cleared notices.
///
/// Configure where the driver should publish the pool's state.
#[derive(Debug)]
pub enum Output {
    /// Write events to a JSON file.
    ///
    /// The file is overwritten with each event, so it always holds the
    /// latest one.
    File(PathBuf),

    /// Send events to a TCP listener.
    ///
    /// Each event opens a connection and writes one JSON line. Connection
    /// failures are reported to the driver, which logs them and carries on.
    Tcp(String),

    /// Send events through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    #[cfg(feature = "tokio")]
    Channel(tokio::sync::mpsc::Sender<Outbound>),

    /// Keep every event in memory.
    ///
    /// Use `Output::memory()` to create this variant and get a reader.
    Memory(Recorder),
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use poolwatch_core::Output;
    ///
    /// let output = Output::file("latest.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use poolwatch_core::Output;
    ///
    /// let output = Output::tcp("127.0.0.1:7878");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// # Example
    ///
    /// ```rust
    /// use poolwatch_core::Output;
    ///
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// // Later, receive events
    /// // while let Some(event) = rx.recv().await {
    /// //     println!("{:?}", event);
    /// // }
    /// ```
    #[cfg(feature = "tokio")]
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<Outbound>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Create an in-memory output and return a reader for it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use poolwatch_core::Output;
    ///
    /// let (output, recorder) = Output::memory();
    /// assert!(recorder.events().is_empty());
    /// ```
    pub fn memory() -> (Self, Recorder) {
        let recorder = Recorder::default();
        (Output::Memory(recorder.clone()), recorder)
    }

    /// Emit an event to this output.
    #[cfg(feature = "tokio")]
    pub(crate) async fn emit(&self, event: &Outbound) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(event)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Tcp(addr) => {
                use tokio::io::AsyncWriteExt;
                use tokio::net::TcpStream;

                // One connection per event
                let mut line = serde_json::to_vec(event)?;
                line.push(b'\n');
                let mut stream = TcpStream::connect(addr).await?;
                stream.write_all(&line).await?;
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(event.clone());
            }
            Output::Memory(recorder) => recorder.record(event.clone()),
        }
        Ok(())
    }
}

/// Shared, append-only log of emitted events.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Outbound>>>,
}

impl Recorder {
    pub fn record(&self, event: Outbound) {
        self.events.lock().push(event);
    }

    /// Everything recorded so far, oldest first.
    pub fn events(&self) -> Vec<Outbound> {
        self.events.lock().clone()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| event.as_snapshot().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_output_shares_log() {
        let (output, recorder) = Output::memory();
        let Output::Memory(inner) = &output else {
            panic!("expected memory output");
        };

        inner.record(Outbound::FailureCleared);
        inner.record(Outbound::Snapshot(Snapshot::builder("dev").name("n").build()));

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.events()[0], Outbound::FailureCleared);
        assert_eq!(recorder.snapshots()[0].device_id, "dev");
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_file_output_holds_latest_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.json");
        let output = Output::file(&path);

        output.emit(&Outbound::FailureCleared).await.unwrap();
        let snapshot = Snapshot::builder("dev-3").name("vat").temperature(4.0).build();
        output.emit(&Outbound::Snapshot(snapshot)).await.unwrap();

        let written: Outbound =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_snapshot().unwrap().device_id, "dev-3");
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_tcp_output_writes_json_line() {
        use tokio::io::{AsyncBufReadExt, BufReader};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let output = Output::tcp(listener.local_addr().unwrap().to_string());

        let snapshot = Snapshot::builder("dev-4").name("oven").temperature(180.0).build();
        output.emit(&Outbound::Snapshot(snapshot)).await.unwrap();

        let (stream, _) = listener.accept().await.unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).await.unwrap();

        assert!(line.ends_with('\n'));
        let received: Outbound = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(received.as_snapshot().unwrap().name, "oven");
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn tcp_output_reports_unreachable_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let output = Output::tcp(addr);
        assert!(output.emit(&Outbound::FailureCleared).await.is_err());
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn channel_output_drops_when_full() {
        let (output, mut rx) = Output::channel(1);

        output.emit(&Outbound::FailureCleared).await.unwrap();
        output.emit(&Outbound::FailureCleared).await.unwrap();

        assert_eq!(rx.recv().await, Some(Outbound::FailureCleared));
        assert!(rx.try_recv().is_err());
    }
}
