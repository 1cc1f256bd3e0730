pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod storage;
