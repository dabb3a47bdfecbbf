pub mod block;
pub mod block_collection;
pub mod image;
pub mod profile;

pub use block::{Block, BlockInput, BlockKind, BlockPatch};
pub use block_collection::BlockCollection;
pub use image::{ImageError, ImageSource, InlineImage};
pub use profile::{Profile, UserRef};
