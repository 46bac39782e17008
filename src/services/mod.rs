pub mod catalog;
pub mod classifier;
pub mod i18n;
pub mod image_processor;
pub mod ranking;
pub mod share;
pub mod store;
