pub mod assets;
pub mod attachments;
pub mod display_list;

pub use assets::{AssetManager, TextureRef};
pub use attachments::AttachmentLoader;
pub use display_list::{DrawCommand, Paint};
