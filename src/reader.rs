//! CSV record source for transaction batches

use crate::types::transaction::Transaction;
use anyhow::{Context, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Reader yielding transactions from a headered CSV file.
///
/// Each row is returned together with its raw record so the sink can echo
/// the original columns. Field-level defects never fail a row (they coerce
/// to defaults during deserialization); only structurally broken rows
/// surface as errors.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
    headers: StringRecord,
}

impl TransactionReader<File> {
    /// Open a transaction CSV file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        info!(path = %path.display(), "Reading transactions");
        Self::from_reader(file)
    }
}

impl<R: Read> TransactionReader<R> {
    /// Wrap any readable CSV source.
    pub fn from_reader(source: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        let headers = reader
            .headers()
            .context("Failed to read CSV header row")?
            .clone();
        Ok(Self { reader, headers })
    }

    /// The input header row.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Iterate rows as (raw record, parsed transaction) pairs.
    pub fn rows(
        &mut self,
    ) -> impl Iterator<Item = Result<(StringRecord, Transaction), csv::Error>> + '_ {
        let headers = self.headers.clone();
        self.reader.records().map(move |record| {
            let record = record?;
            let tx: Transaction = record.deserialize(Some(&headers))?;
            Ok((record, tx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{RiskTier, UserReputation, DEFAULT_HOUR};

    #[test]
    fn test_reads_rows_in_order() {
        let data = "\
amount_mxn,ip_risk,user_reputation
100,low,new
2500,high,trusted
50,medium,recurrent
";
        let mut reader = TransactionReader::from_reader(data.as_bytes()).unwrap();
        let rows: Vec<_> = reader.rows().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].1.amount_mxn, 100.0);
        assert_eq!(rows[1].1.ip_risk, RiskTier::High);
        assert_eq!(rows[1].1.user_reputation, UserReputation::Trusted);
        assert_eq!(rows[2].1.user_reputation, UserReputation::Recurrent);
    }

    #[test]
    fn test_raw_record_is_preserved() {
        let data = "amount_mxn,extra_column\n42,keep-me\n";
        let mut reader = TransactionReader::from_reader(data.as_bytes()).unwrap();
        let (record, tx) = reader.rows().next().unwrap().unwrap();

        assert_eq!(&record[1], "keep-me");
        assert_eq!(tx.amount_mxn, 42.0);
        // columns the schema does not know still default the parsed side
        assert_eq!(tx.hour, DEFAULT_HOUR);
    }

    #[test]
    fn test_structurally_broken_row_errors_without_stopping_iteration() {
        let data = "\
amount_mxn,ip_risk
100,low
250,medium,unexpected-third-field
300,high
";
        let mut reader = TransactionReader::from_reader(data.as_bytes()).unwrap();
        let rows: Vec<_> = reader.rows().collect();

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(rows[1].is_err());
        assert!(rows[2].is_ok());
    }
}
