pub mod classify_types;
pub mod image_types;
pub mod seasoning;
