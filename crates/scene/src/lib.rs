pub mod inspector;
pub mod selection;

pub use inspector::*;
pub use selection::*;
