pub mod page;
pub mod settings;
