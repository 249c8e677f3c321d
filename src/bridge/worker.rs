// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::bridge::{Bridge, PipelineRequest, PipelineResult};
use crate::errors::{BridgeError, Result};
use crate::module::{PipelineModule, WasiModule};
use crate::observability::messages::bridge::WorkerTaskFailed;

/// Async front for one module instance.
///
/// Each call moves the worker onto a blocking thread and hands it back with
/// the checked result, so calls on one worker never overlap. Independent
/// workers may run concurrently.
pub struct PipelineWorker<M: PipelineModule + 'static> {
    bridge: Bridge<M>,
}

/// The worker is `None` only when the blocking task panicked and took the
/// module with it.
pub type WorkerRun<M> = (Option<PipelineWorker<M>>, Result<PipelineResult>);

impl<M: PipelineModule + 'static> PipelineWorker<M> {
    pub fn new(module: M) -> Self {
        Self {
            bridge: Bridge::new(module),
        }
    }

    pub fn bridge(&self) -> &Bridge<M> {
        &self.bridge
    }

    pub fn into_bridge(self) -> Bridge<M> {
        self.bridge
    }

    /// Run `request` over the filesystem transport and apply [`PipelineResult::check`].
    pub async fn run(self, request: PipelineRequest) -> WorkerRun<M> {
        self.dispatch(move |bridge| bridge.run(request)).await
    }

    async fn dispatch<F>(self, call: F) -> WorkerRun<M>
    where
        F: FnOnce(&mut Bridge<M>) -> Result<PipelineResult> + Send + 'static,
    {
        let mut bridge = self.bridge;
        let joined = tokio::task::spawn_blocking(move || {
            let result = call(&mut bridge).and_then(PipelineResult::check);
            (bridge, result)
        })
        .await;

        match joined {
            Ok((bridge, result)) => (Some(Self { bridge }), result),
            Err(e) => {
                tracing::error!("{}", WorkerTaskFailed { error: &e });
                (None, Err(BridgeError::Worker(e.to_string())))
            }
        }
    }
}

impl PipelineWorker<WasiModule> {
    /// Run `request` over the memory transport and apply [`PipelineResult::check`].
    pub async fn run_memory_io(self, request: PipelineRequest) -> WorkerRun<WasiModule> {
        self.dispatch(move |bridge| bridge.run_memory_io(request)).await
    }
}
