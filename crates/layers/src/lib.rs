pub mod composition;
pub mod layer;
pub mod raster;
pub mod symbology;
pub mod vector;

pub use composition::*;
pub use layer::*;
pub use raster::*;
pub use symbology::*;
pub use vector::*;
