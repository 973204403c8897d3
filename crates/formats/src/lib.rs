pub mod runout;

pub use runout::*;
