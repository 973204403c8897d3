pub mod camera;
pub mod context;
pub mod lifecycle;
pub mod provider;

pub use camera::*;
pub use context::*;
pub use lifecycle::*;
pub use provider::*;
