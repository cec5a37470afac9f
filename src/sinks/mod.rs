pub mod csv_file;
pub mod record_sink;

pub use csv_file::CsvFileSink;
pub use record_sink::{RecordSink, SinkResult};
