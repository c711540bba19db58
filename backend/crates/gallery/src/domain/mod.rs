//! Domain Layer

pub mod entity;
pub mod image_host;
pub mod repository;
pub mod value_object;

pub use entity::gallery_image::{GalleryImage, RemoteImage};
pub use image_host::{HostError, ImageHost, ImageUpload, UploadedImage};
pub use repository::{GalleryRepository, ListFilter};
pub use value_object::{category::Category, image_id::ImageId};
