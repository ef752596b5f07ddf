pub mod food;
pub mod predict;
pub mod system;

pub use food::*;
pub use predict::*;
pub use system::*;
