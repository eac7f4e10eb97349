//! JSON-lines label output.
//!
//! Each label becomes one `{ "record": …, "payload": … }` object. A real
//! print pipeline reads these lines and draws the codes.

use std::io::Write;

use lens_core::render::{LabelJob, LabelRenderer};

use crate::error::{AppError, AppResult};

/// Writes one JSON object per label to `out`.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    pretty: bool,
    written: usize,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        JsonLinesRenderer {
            out,
            pretty,
            written: 0,
        }
    }

    /// Labels written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and hands back the writer.
    pub fn finish(mut self) -> AppResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> LabelRenderer for JsonLinesRenderer<W> {
    type Artifact = ();
    type Error = AppError;

    fn render(&mut self, job: &LabelJob) -> AppResult<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, job)?;
        } else {
            serde_json::to_writer(&mut self.out, job)?;
        }
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}
