pub mod record;

pub use record::{sort_records, FieldValue, NewRecord, Record};
