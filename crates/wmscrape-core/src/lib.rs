pub mod fields;
pub mod merge;
pub mod records;
pub mod tree;

pub use merge::merge;
pub use records::{MergedRow, ProductRecord, SearchItem};
pub use tree::descend;
