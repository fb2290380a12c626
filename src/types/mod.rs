pub mod example;
pub mod identifiers;
pub mod record;
pub mod window;

pub use example::{DisplayRecord, Example, ExamplePartition, WordInfo};
pub use identifiers::{ExampleId, ExampleIdError, GroupId, GroupIdSequence};
pub use record::{read_records, ContextRecord, RecordError, RecordShape, Records};
pub use window::ContextWindow;
