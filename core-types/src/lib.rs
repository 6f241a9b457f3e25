// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared schemas, enums, error types, and configuration for the sales
//! message processor.

pub mod config;
pub mod status;
pub mod types;

pub use config::AppConfig;
