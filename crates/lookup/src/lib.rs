pub mod client;
pub mod pixel;
pub mod tiles;
pub mod weather;

pub use client::*;
pub use pixel::*;
pub use tiles::*;
pub use weather::*;
