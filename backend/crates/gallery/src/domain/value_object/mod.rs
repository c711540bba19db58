pub mod category;
pub mod image_id;
pub mod image_text;
