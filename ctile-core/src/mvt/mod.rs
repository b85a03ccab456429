pub mod varint;
pub mod writer;

pub use writer::{GeomType, LayerWriter, TileWriter};
