//! Event Log - durable per-stream storage
//!
//! The EventLog owns one append-only JSONL file per stream and provides
//! the two primitives everything else is built on: `append_event` and
//! `read_after`.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::types::{Event, Stream};

/// Configuration for the EventLog
#[derive(Debug, Clone)]
pub struct EventLogConfig {
    /// Path to the data directory
    pub data_dir: PathBuf,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl EventLogConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get path to a stream's log file
    pub fn stream_path(&self, stream: Stream) -> PathBuf {
        self.data_dir.join(stream.file_name())
    }
}

/// Result type for EventLog operations
pub type EventLogResult<T> = Result<T, EventLogError>;

/// Errors that can occur in EventLog operations
#[derive(Debug)]
pub enum EventLogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidEvent(String),
}

impl std::fmt::Display for EventLogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventLogError::Io(e) => write!(f, "IO error: {}", e),
            EventLogError::Json(e) => write!(f, "JSON error: {}", e),
            EventLogError::InvalidEvent(msg) => write!(f, "Invalid event: {}", msg),
        }
    }
}

impl std::error::Error for EventLogError {}

impl From<std::io::Error> for EventLogError {
    fn from(e: std::io::Error) -> Self {
        EventLogError::Io(e)
    }
}

impl From<serde_json::Error> for EventLogError {
    fn from(e: serde_json::Error) -> Self {
        EventLogError::Json(e)
    }
}

/// The EventLog manages the append-only per-stream logs
pub struct EventLog {
    config: EventLogConfig,
}

impl EventLog {
    /// Create a new EventLog with default config
    pub fn new() -> Self {
        Self::with_config(EventLogConfig::default())
    }

    /// Create a new EventLog with custom config
    pub fn with_config(config: EventLogConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &EventLogConfig {
        &self.config
    }

    /// Append an event to its stream's log
    ///
    /// This is the core write operation. The line is appended and fsynced
    /// before returning, so an offset handed back to a caller is durable.
    /// The caller is responsible for assigning the offset under the
    /// stream's lock; the log rejects events that would go backwards.
    pub fn append_event(&self, event: &Event) -> EventLogResult<u64> {
        if event.offset == 0 {
            return Err(EventLogError::InvalidEvent(
                "offset 0 is reserved for the pre-history cursor".to_string(),
            ));
        }

        let path = self.config.stream_path(event.stream);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Open file in append mode
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Serialize and write
        let json_line = event.to_json_line()?;
        writeln!(file, "{}", json_line)?;

        // Sync to disk for durability
        file.sync_all()?;

        Ok(event.offset)
    }

    /// Load all events from a stream's log
    pub fn load_events(&self, stream: Stream) -> EventLogResult<Vec<Event>> {
        let path = self.config.stream_path(stream);

        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match Event::from_json_line(&line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse {} event at line {}: {}",
                        stream,
                        line_num + 1,
                        e
                    );
                    // Continue loading other events
                }
            }
        }

        Ok(events)
    }

    /// Load events with offset greater than the given cursor
    ///
    /// This is the replay primitive used on reconnect. The result is a
    /// snapshot at call time, ordered by offset, and is not restartable:
    /// anything appended after the call arrives via live broadcast instead.
    pub fn read_after(&self, stream: Stream, after_offset: u64) -> EventLogResult<Vec<Event>> {
        let all_events = self.load_events(stream)?;
        Ok(all_events
            .into_iter()
            .filter(|e| e.offset > after_offset)
            .collect())
    }

    /// Highest offset currently present in a stream's log
    pub fn head_offset(&self, stream: Stream) -> EventLogResult<u64> {
        let events = self.load_events(stream)?;
        Ok(events.iter().map(|e| e.offset).max().unwrap_or(0))
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_log() -> (EventLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = EventLogConfig::new(temp_dir.path());
        (EventLog::with_config(config), temp_dir)
    }

    fn message_event(offset: u64, content: &str) -> Event {
        Event::new(
            EventKind::DirectMessage,
            Stream::Messages,
            offset,
            format!("c{}", offset),
            json!({
                "content": content,
                "sender": "alice",
                "receiver": "bob"
            }),
        )
    }

    #[test]
    fn test_append_and_load_events() {
        let (log, _temp_dir) = create_test_log();

        log.append_event(&message_event(1, "first")).unwrap();
        log.append_event(&message_event(2, "second")).unwrap();

        let events = log.load_events(Stream::Messages).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].offset, 1);
        assert_eq!(events[1].offset, 2);
    }

    #[test]
    fn test_streams_are_independent() {
        let (log, _temp_dir) = create_test_log();

        log.append_event(&message_event(1, "hi")).unwrap();
        let room_event = Event::new(
            EventKind::RoomRegistered,
            Stream::Rooms,
            1,
            "r1".to_string(),
            json!({"roomname": "general", "credential": ""}),
        );
        log.append_event(&room_event).unwrap();

        assert_eq!(log.load_events(Stream::Messages).unwrap().len(), 1);
        assert_eq!(log.load_events(Stream::Rooms).unwrap().len(), 1);
        assert_eq!(log.load_events(Stream::Users).unwrap().len(), 0);
    }

    #[test]
    fn test_read_after() {
        let (log, _temp_dir) = create_test_log();

        for i in 1..=5 {
            log.append_event(&message_event(i, "msg")).unwrap();
        }

        let events = log.read_after(Stream::Messages, 3).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].offset, 4);
        assert_eq!(events[1].offset, 5);

        // Cursor 0 means full history
        let all = log.read_after(Stream::Messages, 0).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_head_offset() {
        let (log, _temp_dir) = create_test_log();
        assert_eq!(log.head_offset(Stream::Messages).unwrap(), 0);

        log.append_event(&message_event(1, "a")).unwrap();
        log.append_event(&message_event(2, "b")).unwrap();
        assert_eq!(log.head_offset(Stream::Messages).unwrap(), 2);
    }

    #[test]
    fn test_zero_offset_rejected() {
        let (log, _temp_dir) = create_test_log();
        let result = log.append_event(&message_event(0, "bad"));
        assert!(matches!(result, Err(EventLogError::InvalidEvent(_))));
    }

    #[test]
    fn test_corrupt_line_is_skipped() {
        let (log, temp_dir) = create_test_log();
        log.append_event(&message_event(1, "ok")).unwrap();

        // Inject a corrupt line between two valid ones
        let path = temp_dir.path().join(Stream::Messages.file_name());
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("not json\n");
        std::fs::write(&path, content).unwrap();
        log.append_event(&message_event(2, "also ok")).unwrap();

        let events = log.load_events(Stream::Messages).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].offset, 2);
    }
}
