pub mod dump;
mod error;
pub mod extent;
mod header;
pub mod image;
pub mod tables;

pub use dump::*;
pub use error::*;
pub use extent::*;
pub use image::*;
pub use tables::*;
