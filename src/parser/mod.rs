pub mod detector;
pub mod entity;

pub use detector::{InputKind, classify};
pub use entity::{ContentUrls, Downloadable};
