//! Domain models for the functions service.

pub mod disc;
pub mod order;

pub use disc::Disc;
pub use order::StickerOrder;
