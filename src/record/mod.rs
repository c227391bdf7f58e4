mod record_sink;
mod simulation_record;

pub use record_sink::{CsvRecordSink, RecordSink, SinkError, SinkMode};
pub use simulation_record::SimulationRecord;

#[cfg(test)]
pub use simulation_record::RECORD_HEADER;
