pub mod editor;
pub mod post;
