pub mod geo;
pub mod ids;
pub mod math;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use ids::*;
