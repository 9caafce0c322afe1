// src/lib.rs

//! Campus Notifier Library
//!
//! Watches a university academic calendar and notice board, and pushes
//! Telegram messages for today's events, upcoming deadlines and new postings.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
