//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles format switching.
//! This keeps format-specific logic out of command handlers entirely.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        match self.format {
            OutputFormat::Text => {
                payload.render_text(&mut handle)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut handle, payload)?;
                writeln!(handle)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct SamplePayload {
        output_path: String,
        converted: u64,
    }

    impl Render for SamplePayload {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "Output: {}", self.output_path)?;
            writeln!(w, "Converted: {}", self.converted)?;
            Ok(())
        }
    }

    #[test]
    fn test_render_text_payload() {
        let payload = SamplePayload {
            output_path: "dashboard.xml".to_owned(),
            converted: 42,
        };

        let mut buffer = Vec::new();
        payload
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("Output: dashboard.xml"));
        assert!(output.contains("Converted: 42"));
    }

    #[test]
    fn test_json_payload_roundtrips() {
        let payload = SamplePayload {
            output_path: "dashboard.xml".to_owned(),
            converted: 7,
        };

        let json = serde_json::to_string(&payload).expect("json serialization should succeed");
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("should parse back to JSON");

        assert_eq!(parsed["output_path"].as_str(), Some("dashboard.xml"));
        assert_eq!(parsed["converted"].as_u64(), Some(7));
    }

    #[test]
    fn test_json_pretty_formatting() {
        let payload = SamplePayload {
            output_path: "out.xml".to_owned(),
            converted: 1,
        };

        let json = serde_json::to_string_pretty(&payload).expect("pretty JSON should succeed");
        assert!(json.contains('\n'), "pretty JSON should contain newlines");
    }
}
