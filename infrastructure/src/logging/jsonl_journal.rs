//! JSONL file writer for core events.
//!
//! Each [`CoreEvent`] is serialized as a single JSON line carrying its own
//! `type` tag plus an RFC3339 `recorded_at`. Lines are handed to a
//! dedicated writer thread, so `append` never waits on disk I/O.

use agora_application::EventJournal;
use agora_domain::CoreEvent;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::warn;

/// JSONL event journal that appends one JSON object per line.
///
/// `append` serializes on the caller's thread and queues the line; the
/// writer thread flushes whenever its queue drains. Dropping the journal
/// waits for every queued line to reach the file.
pub struct JsonlEventJournal {
    sender: Option<mpsc::UnboundedSender<String>>,
    writer: Option<JoinHandle<()>>,
    path: PathBuf,
}

impl JsonlEventJournal {
    /// Open the journal at the given path for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event journal directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event journal {}: {}", path.display(), e);
                return None;
            }
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = std::thread::Builder::new()
            .name("agora-journal".to_string())
            .spawn(move || write_lines(BufWriter::new(file), receiver));
        let writer = match writer {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Could not start event journal writer: {}", e);
                return None;
            }
        };

        Some(Self {
            sender: Some(sender),
            writer: Some(writer),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_lines(mut writer: BufWriter<File>, mut receiver: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = receiver.blocking_recv() {
        write_line(&mut writer, &line);
        while let Ok(line) = receiver.try_recv() {
            write_line(&mut writer, &line);
        }
        if let Err(e) = writer.flush() {
            warn!("Could not flush event journal: {}", e);
        }
    }
}

fn write_line(writer: &mut BufWriter<File>, line: &str) {
    if let Err(e) = writeln!(writer, "{}", line) {
        warn!("Could not write event journal line: {}", e);
    }
}

impl EventJournal for JsonlEventJournal {
    fn append(&self, event: &CoreEvent) {
        let mut record = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize {} event: {}", event.event_type(), e);
                return;
            }
        };
        if let serde_json::Value::Object(map) = &mut record {
            map.insert(
                "recorded_at".to_string(),
                serde_json::Value::String(
                    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                ),
            );
        }

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Some(sender) = &self.sender
            && sender.send(line).is_err()
        {
            warn!("Event journal writer has stopped; dropping {} event", event.event_type());
        }
    }
}

impl Drop for JsonlEventJournal {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain and exit
        self.sender.take();
        if let Some(writer) = self.writer.take()
            && writer.join().is_err()
        {
            warn!("Event journal writer panicked");
        }
    }
}
