//! Command-line presentation of the route hierarchy.

mod router;

pub use router::Router;
