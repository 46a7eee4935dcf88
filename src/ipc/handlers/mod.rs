pub mod backup_exchange;
pub mod classes;
pub mod core;
pub mod notes;
pub mod settings;
pub mod students;
pub mod user;
