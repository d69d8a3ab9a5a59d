pub mod builder;
pub mod codec;
pub mod markup;
pub mod segment;
pub mod stats;

pub use builder::parse_bill_markup;
pub use segment::{BillChangeSet, Segment, SegmentKind, Stats};
