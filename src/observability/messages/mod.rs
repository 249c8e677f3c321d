// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging, one module per subsystem.

pub mod bridge;
pub mod config;
pub mod interface;
pub mod module;
pub mod reconstruct;
pub mod vfs;
