pub mod alphabet;
pub mod builder;
pub mod config;
pub mod text;
