//! Conversion orchestrator.
//!
//! Drives one conversion attempt: checks preconditions, shows progress,
//! calls the conversion service and writes the result or the error back
//! into the shared state.
//!
//! While the request is in flight a separate task animates the progress bar
//! from `AnimationConfig::start` toward `AnimationConfig::end`. The animation
//! says nothing about real transfer progress. It is owned by a guard that
//! stops it on every exit path, and it checks the stop flag under the state
//! lock, so it can never write after the terminal progress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::AnimationConfig;
use crate::managers::image_state_manager::{ImageStateManagerTrait, SharedImageState};
use crate::managers::object_url_registry::ObjectUrlRegistry;
use crate::services::image_service::ImageServiceTrait;
use crate::types::progress::ProgressPatch;

pub const MSG_PREPARING: &str = "변환 준비 중...";
pub const MSG_UPLOADING: &str = "이미지 업로드 중...";
pub const MSG_FINALIZING: &str = "변환 완료 처리 중...";
pub const MSG_COMPLETE: &str = "변환이 완료되었습니다!";

const FINALIZING_PROGRESS: u8 = 90;

/// Where the orchestrator is in its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPhase {
    Idle,
    Validating,
    Submitting,
    AwaitingResponse,
    Succeeded,
    Failed,
}

/// Result of a `convert` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Preconditions did not hold; nothing changed.
    Skipped,
    Succeeded,
    /// The attempt failed with the stored user-facing message.
    Failed(String),
}

/// Cosmetic progress animation running beside the request.
///
/// Dropping the value stops the animation.
pub struct ProgressAnimation {
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressAnimation {
    /// Spawns the animation task on the current tokio runtime.
    pub fn start(state: SharedImageState, config: AnimationConfig) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();

        let tick = config.tick.max(Duration::from_millis(1));
        let end = config.end.max(config.start);
        let ticks = (config.duration.as_millis() / tick.as_millis()).max(1) as f64;
        let step = (f64::from(end) - f64::from(config.start)) / ticks;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately.
            interval.tick().await;

            let mut current = f64::from(config.start);
            loop {
                interval.tick().await;
                current += step;
                {
                    let mut state = state.lock();
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    let value = current.round().min(f64::from(end)) as u8;
                    state.set_progress(&ProgressPatch::percent(value));
                }
                if current >= f64::from(end) {
                    break;
                }
            }
        });

        Self {
            stopped,
            handle: Some(handle),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stops the animation.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressAnimation {
    fn drop(&mut self) {
        self.stop();
    }
}

/// An attempt between Submitting and its terminal state. Dropped unsettled
/// (the `convert` future was dropped mid-request), it clears the in-flight
/// progress so a new attempt can start.
struct PendingAttempt<'a> {
    state: &'a SharedImageState,
    phase: &'a Mutex<ConversionPhase>,
    settled: bool,
}

impl PendingAttempt<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        log::warn!("Conversion abandoned before the service answered");
        self.state
            .lock()
            .set_progress(&ProgressPatch::full(false, 0, ""));
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = ConversionPhase::Idle;
    }
}

/// Drives conversion attempts against a conversion service.
pub struct ConversionOrchestrator<S> {
    service: S,
    state: SharedImageState,
    registry: ObjectUrlRegistry,
    animation: AnimationConfig,
    phase: Mutex<ConversionPhase>,
}

impl<S: ImageServiceTrait> ConversionOrchestrator<S> {
    pub fn new(
        service: S,
        state: SharedImageState,
        registry: ObjectUrlRegistry,
        animation: AnimationConfig,
    ) -> Self {
        Self {
            service,
            state,
            registry,
            animation,
            phase: Mutex::new(ConversionPhase::Idle),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn phase(&self) -> ConversionPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: ConversionPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Runs one conversion attempt.
    ///
    /// Without a selected file, or while another attempt is in flight, this is
    /// a no-op. Failures never escape: their message is stored in state.
    /// Dropping the future mid-request stops the animation, clears the
    /// in-flight progress and returns the phase to `Idle`.
    pub async fn convert(&self) -> ConversionOutcome {
        let prepared = {
            let mut state = self.state.lock();
            match state.selected_file().cloned().filter(|_| state.can_convert()) {
                Some(file) => {
                    self.set_phase(ConversionPhase::Validating);
                    let options = state.conversion_options().clone();
                    self.set_phase(ConversionPhase::Submitting);
                    state.set_error(None);
                    state.set_progress(&ProgressPatch::full(true, 0, MSG_PREPARING));
                    state.set_progress(&ProgressPatch::step(self.animation.start, MSG_UPLOADING));
                    Some((file, options))
                }
                None => None,
            }
        };

        let Some((file, options)) = prepared else {
            log::debug!("Conversion skipped: no file selected or already converting");
            return ConversionOutcome::Skipped;
        };

        let pending = PendingAttempt {
            state: &self.state,
            phase: &self.phase,
            settled: false,
        };
        let animation = ProgressAnimation::start(self.state.clone(), self.animation);

        self.set_phase(ConversionPhase::AwaitingResponse);
        let result = self.service.convert_image(&file, &options).await;
        animation.cancel();
        pending.settle();

        let mut state = self.state.lock();
        match result {
            Ok(image) => {
                state.set_progress(&ProgressPatch::step(FINALIZING_PROGRESS, MSG_FINALIZING));
                let metadata = image.metadata();
                let url = self.registry.create_object_url(image.blob);
                state.set_converted_image_url(Some(url));
                state.set_converted_metadata(Some(metadata));
                state.set_progress(&ProgressPatch::full(false, 100, MSG_COMPLETE));
                drop(state);

                self.set_phase(ConversionPhase::Succeeded);
                ConversionOutcome::Succeeded
            }
            Err(e) => {
                let message = e.to_string();
                state.set_error(Some(message.clone()));
                state.set_progress(&ProgressPatch::full(false, 0, ""));
                drop(state);

                self.set_phase(ConversionPhase::Failed);
                ConversionOutcome::Failed(message)
            }
        }
    }
}
