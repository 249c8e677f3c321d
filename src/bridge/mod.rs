// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The boundary bridge: write inputs, invoke the module, read outputs.

mod args;
#[allow(clippy::module_inception)]
mod bridge;
mod worker;


pub use args::PipelineArgs;
pub use bridge::{Bridge, PipelineRequest, PipelineResult};
pub use worker::{PipelineWorker, WorkerRun};
