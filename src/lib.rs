// src/lib.rs

//! blogboard Library

pub mod board;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
