//! Logging for the push listener.
//!
//! Two output streams leave the process:
//!
//! * structured log lines, emitted through `tracing` and rendered by the
//!   subscriber installed in [`init`];
//! * the payload dump, written through a [`Console`] handle that is built
//!   once at startup and captured by the router state.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FILTER, DUMP_FOOTER, DUMP_HEADER};
use crate::error::{ListenerError, PushError, Result};

/// Installs the process-wide tracing subscriber.
///
/// The filter comes from `RUST_LOG` when it is set and parses, otherwise
/// everything at `info` and above is shown. Calling this twice is an error.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| ListenerError::Logging(e.to_string()))
}

type Sink = Box<dyn Write + Send>;

/// Handle to the console stream that receives payload dumps and banner rules.
///
/// Clones share the same sink. Each write takes the sink lock for its whole
/// duration, so concurrent dumps never interleave inside one frame.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Sink>>,
}

impl Console {
    /// Console backed by the process stdout.
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Console backed by any writer.
    pub fn with_writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Console {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes `payload` pretty-printed with two-space indentation, framed by
    /// the header and footer lines. Key order and number text are kept as
    /// they arrived.
    pub fn dump_payload(&self, payload: &Value) -> std::result::Result<(), PushError> {
        let mut frame = format!("\n{DUMP_HEADER}\n").into_bytes();
        serde_json::to_writer_pretty(&mut frame, payload).map_err(io::Error::from)?;
        frame.extend_from_slice(format!("\n{DUMP_FOOTER}\n\n").as_bytes());

        self.write_all(&frame)
    }

    /// Writes a single line followed by a newline.
    pub fn line(&self, text: &str) -> std::result::Result<(), PushError> {
        self.write_all(format!("{text}\n").as_bytes())
    }

    fn write_all(&self, bytes: &[u8]) -> std::result::Result<(), PushError> {
        let mut sink = self.sink.lock().map_err(|_| PushError::ConsolePoisoned)?;
        sink.write_all(bytes)?;
        sink.flush()?;
        Ok(())
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dump_payload_framing() {
        let buffer = SharedBuffer::default();
        let console = Console::with_writer(buffer.clone());

        console
            .dump_payload(&json!({"event": "ping", "value": 42}))
            .unwrap();

        assert_eq!(
            buffer.contents(),
            "\n✅ --- Payload Received --- ✅\n{\n  \"event\": \"ping\",\n  \"value\": 42\n}\n----------------------------\n\n"
        );
    }

    #[test]
    fn test_dump_keeps_key_order() {
        let buffer = SharedBuffer::default();
        let console = Console::with_writer(buffer.clone());
        let payload: Value = serde_json::from_str(r#"{"value":42,"event":"ping"}"#).unwrap();

        console.dump_payload(&payload).unwrap();

        let contents = buffer.contents();
        let value_at = contents.find("\"value\"").unwrap();
        let event_at = contents.find("\"event\"").unwrap();
        assert!(value_at < event_at, "keys were reordered: {contents}");
    }

    #[test]
    fn test_dump_keeps_number_text() {
        let buffer = SharedBuffer::default();
        let console = Console::with_writer(buffer.clone());
        let payload: Value =
            serde_json::from_str(r#"{"id":123456789012345678901234567890,"big":1e400}"#).unwrap();

        console.dump_payload(&payload).unwrap();

        let contents = buffer.contents();
        assert!(contents.contains("\"id\": 123456789012345678901234567890"), "{contents}");
        assert!(contents.contains("\"big\": 1e400"), "{contents}");
    }

    #[test]
    fn test_dump_scalar_payload() {
        let buffer = SharedBuffer::default();
        let console = Console::with_writer(buffer.clone());

        console.dump_payload(&json!("hello")).unwrap();

        assert!(buffer.contents().contains("\n\"hello\"\n"));
    }

    #[test]
    fn test_clones_share_sink() {
        let buffer = SharedBuffer::default();
        let console = Console::with_writer(buffer.clone());
        let other = console.clone();

        console.line("first").unwrap();
        other.line("second").unwrap();

        assert_eq!(buffer.contents(), "first\nsecond\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let console = Console::with_writer(BrokenPipe);

        let result = console.dump_payload(&json!([1, 2, 3]));

        assert!(matches!(result, Err(PushError::Io(_))));
    }
}
