#![forbid(unsafe_code)]

//! `revq` — Slack work-queue bot library.
//!
//! Tracks per-channel queues of pending merge/pull requests and reminds
//! each channel on its own cron schedule while requests are outstanding.

pub mod config;
pub mod cron;
pub mod errors;
pub mod locks;
pub mod models;
pub mod persistence;
pub mod queue;
pub mod reminders;
pub mod scheduler;
pub mod slack;
pub mod taskid;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
