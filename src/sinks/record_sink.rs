use std::path::PathBuf;

use crate::{error::InventoryError, record::InventoryRecord};

/// Destination for an ordered stream of inventory records.
pub trait RecordSink {
    fn write_all<I>(&mut self, records: I) -> Result<SinkResult, InventoryError>
    where
        Self: Sized,
        I: IntoIterator<Item = InventoryRecord>,
    {
        for record in records {
            self.write_record(&record)?;
        }

        self.finish()
    }
    fn write_record(&mut self, record: &InventoryRecord) -> Result<(), InventoryError>;
    fn finish(&mut self) -> Result<SinkResult, InventoryError>;
}

#[derive(Debug)]
pub struct SinkResult {
    pub file_written: PathBuf,
    pub rows_written: u64,
}
