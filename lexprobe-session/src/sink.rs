use crate::error::SinkError;
use lexprobe_core::TrialRecord;
use std::io::Write;

/// Destination for finished trial records.
pub trait ResultSink {
    fn persist(&mut self, record: &TrialRecord) -> Result<(), SinkError>;
}

/// Keeps records in memory, in persist order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<TrialRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TrialRecord> {
        self.records
    }
}

impl ResultSink for MemorySink {
    fn persist(&mut self, record: &TrialRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Writes one JSON object per record, newline separated.
///
/// Each record goes out in a single `write_all`, so a record that fails to
/// serialise leaves nothing behind. A writer that accepts part of the line
/// before failing can still leave a fragment, and retrying then repeats the
/// record.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn persist(&mut self, record: &TrialRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.out.write_all(&line)?;
        self.out.flush()?;
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn persist(&mut self, record: &TrialRecord) -> Result<(), SinkError> {
        (**self).persist(record)
    }
}
