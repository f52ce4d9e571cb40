mod path_ext;

pub use path_ext::{BestEffortPathExt, LogicalPathExt, logical_directory, logical_segments};
