pub mod avatar;
pub mod content_images;

pub use avatar::AvatarService;
pub use content_images::ContentImageService;
