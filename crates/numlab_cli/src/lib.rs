//! Example driver for `numlab_core`: configuration, logging and the
//! printable demo reports.

pub mod commands;
pub mod config;
