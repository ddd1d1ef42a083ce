pub mod catalog;
pub mod config;
pub mod index;
pub mod keys;
pub mod model;
pub mod records;
pub mod store;
pub mod transfer;
pub mod view;
