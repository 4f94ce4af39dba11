pub mod contacts;
pub mod images;
