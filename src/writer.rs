//! CSV decision sink and JSON-lines alert sink

use crate::types::alert::ReviewAlert;
use crate::types::decision::DecisionResult;
use anyhow::{Context, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Writer appending `decision`, `risk_score` and `reasons` columns onto the
/// original input rows, in input order.
pub struct DecisionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl DecisionWriter<File> {
    /// Create the output CSV file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> DecisionWriter<W> {
    /// Wrap any writable CSV sink.
    pub fn from_writer(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Write the output header: the input columns plus the three appended
    /// decision columns.
    pub fn write_headers(&mut self, input_headers: &StringRecord) -> Result<()> {
        let mut row = input_headers.clone();
        row.push_field("decision");
        row.push_field("risk_score");
        row.push_field("reasons");
        self.writer
            .write_record(&row)
            .context("Failed to write output header")?;
        Ok(())
    }

    /// Append one decided row.
    pub fn write(&mut self, record: &StringRecord, result: &DecisionResult) -> Result<()> {
        let mut row = record.clone();
        row.push_field(result.decision.as_str());
        row.push_field(&result.risk_score.to_string());
        row.push_field(&result.reason_trail());
        self.writer
            .write_record(&row)
            .context("Failed to write decision row")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush output file")?;
        Ok(())
    }

    /// Unwrap the underlying sink, flushing buffered rows.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to finish output: {e}"))
    }
}

/// Writer emitting one JSON line per review alert.
pub struct AlertWriter<W: Write> {
    sink: W,
}

impl AlertWriter<File> {
    /// Create the alerts file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create alerts file {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> AlertWriter<W> {
    pub fn from_writer(sink: W) -> Self {
        Self { sink }
    }

    /// Record one alert.
    pub fn publish(&mut self, alert: &ReviewAlert) -> Result<()> {
        serde_json::to_writer(&mut self.sink, alert)?;
        self.sink.write_all(b"\n")?;

        debug!(
            alert_id = %alert.alert_id,
            row = alert.row,
            risk_score = alert.risk_score,
            "Recorded review alert"
        );

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush().context("Failed to flush alerts file")?;
        Ok(())
    }
}
