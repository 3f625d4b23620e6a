pub mod cli;
pub mod config;
pub mod convert;
pub mod file;
pub mod interactive;
pub mod soffice;
pub mod utils;
