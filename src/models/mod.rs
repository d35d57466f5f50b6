pub mod admin;
pub mod event;
pub mod gallery;
pub mod message;
pub mod ordering;
pub mod settings;
pub mod work;
