use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

/// Append-only writer for a session's `events.jsonl`.
///
/// Every line carries `type`, `session_id`, `seq` and `ts`, then the
/// session stamp (for example `command` and `model`), then the caller
/// payload. Later keys override earlier ones. `seq` starts at 1 and is
/// shared by all clones of the writer.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventWriterInner>,
}

#[derive(Debug)]
struct EventWriterInner {
    path: PathBuf,
    session_id: String,
    stamp: EventPayload,
    seq: AtomicU64,
    lock: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self::stamped(path, session_id, EventPayload::new())
    }

    pub fn stamped(
        path: impl Into<PathBuf>,
        session_id: impl Into<String>,
        stamp: EventPayload,
    ) -> Self {
        Self {
            inner: Arc::new(EventWriterInner {
                path: path.into(),
                session_id: session_id.into(),
                stamp,
                seq: AtomicU64::new(0),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Writer tagged with a freshly generated session id.
    pub fn for_new_session(path: impl Into<PathBuf>) -> Self {
        Self::new(path, new_session_id())
    }

    /// Fresh session whose lines all name the CLI command and model.
    pub fn for_command(path: impl Into<PathBuf>, command: &str, model: &str) -> Self {
        let mut stamp = EventPayload::new();
        stamp.insert("command".to_string(), Value::String(command.to_string()));
        stamp.insert("model".to_string(), Value::String(model.to_string()));
        Self::stamped(path, new_session_id(), stamp)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Number of events handed to `emit` so far, written or not.
    pub fn emitted(&self) -> u64 {
        self.inner.seq.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(event_type.to_string()));
        event.insert(
            "session_id".to_string(),
            Value::String(self.inner.session_id.clone()),
        );
        let seq = self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1;
        event.insert("seq".to_string(), Value::from(seq));
        event.insert("ts".to_string(), Value::String(now_utc_iso()));
        for (key, value) in &self.inner.stamp {
            event.insert(key.clone(), value.clone());
        }
        for (key, value) in payload {
            event.insert(key, value);
        }

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let line = serde_json::to_string(&event)?;
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event writer lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;

        Ok(Value::Object(event))
    }
}

pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Unwraps a `json!({...})` literal into an event payload.
pub fn payload(value: Value) -> EventPayload {
    match value {
        Value::Object(map) => map,
        _ => EventPayload::new(),
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::DateTime;
    use serde_json::json;

    use super::*;

    #[test]
    fn emit_writes_compact_jsonl_line() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let writer = EventWriter::new(&path, "session-123");

        let emitted = writer.emit(
            "transform_started",
            payload(json!({"persona": "pirate", "source_chars": 42})),
        )?;

        let content = fs::read_to_string(&path)?;
        let line = content.lines().next().unwrap_or("");
        assert!(!line.contains('\n'));
        let parsed: Value = serde_json::from_str(line)?;

        assert_eq!(parsed, emitted);
        assert_eq!(parsed["type"], json!("transform_started"));
        assert_eq!(parsed["session_id"], json!("session-123"));
        assert_eq!(parsed["persona"], json!("pirate"));
        assert_eq!(parsed["source_chars"], json!(42));

        let ts = parsed["ts"].as_str().unwrap_or("");
        DateTime::parse_from_rfc3339(ts)?;
        Ok(())
    }

    #[test]
    fn payload_can_override_default_keys() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("events.jsonl"), "session-123");

        let emitted = writer.emit(
            "session_started",
            payload(json!({"type": "override", "session_id": "other"})),
        )?;

        assert_eq!(emitted["type"], json!("override"));
        assert_eq!(emitted["session_id"], json!("other"));
        Ok(())
    }

    #[test]
    fn emit_appends_lines_and_creates_parent_dirs() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("events.jsonl");
        let writer = EventWriter::for_new_session(&path);
        let clone = writer.clone();

        writer.emit("transform_started", EventPayload::new())?;
        clone.emit("transform_finished", EventPayload::new())?;

        let content = fs::read_to_string(&path)?;
        let rows: Vec<Value> = content
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["type"], json!("transform_started"));
        assert_eq!(rows[1]["type"], json!("transform_finished"));
        assert_eq!(rows[0]["session_id"], rows[1]["session_id"]);
        assert!(uuid::Uuid::parse_str(writer.session_id()).is_ok());
        Ok(())
    }

    #[test]
    fn command_stamp_and_sequence_on_every_line() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let writer = EventWriter::for_command(&path, "chat", "meta-llama/Meta-Llama-3-8B-Instruct");

        writer.emit("session_started", EventPayload::new())?;
        writer.emit("transform_started", payload(json!({"model": "override"})))?;

        let rows: Vec<Value> = fs::read_to_string(&path)?
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(rows[0]["command"], json!("chat"));
        assert_eq!(rows[0]["model"], json!("meta-llama/Meta-Llama-3-8B-Instruct"));
        assert_eq!(rows[1]["command"], json!("chat"));
        assert_eq!(rows[1]["model"], json!("override"));
        assert_eq!(rows[0]["seq"], json!(1));
        assert_eq!(rows[1]["seq"], json!(2));
        assert_eq!(writer.emitted(), 2);
        Ok(())
    }

    #[test]
    fn failed_write_still_advances_sequence() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path(), "session-123");
        assert!(writer.emit("transform_started", EventPayload::new()).is_err());
        assert_eq!(writer.emitted(), 1);
        Ok(())
    }

    #[test]
    fn payload_ignores_non_objects() {
        assert!(payload(json!([1, 2])).is_empty());
        assert_eq!(payload(json!({"a": 1})).len(), 1);
    }
}
