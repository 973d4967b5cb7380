pub mod archive;
pub mod azkaban;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod repo;
pub mod result;
pub mod version;

pub use result::Result;
