pub mod auth;
pub mod catalog;
pub mod description;
pub mod recommendations;
