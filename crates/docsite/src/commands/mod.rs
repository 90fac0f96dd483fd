pub mod og_images;
pub mod token;
