//! Tests for the conversion orchestrator against a scripted conversion service.
//!
//! Timing tests run on a paused tokio clock, so the animation and the fake
//! service delay advance deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use imgconv::config::AnimationConfig;
use imgconv::managers::image_state_manager::{ImageStateManagerTrait, SharedImageState};
use imgconv::managers::object_url_registry::ObjectUrlRegistry;
use imgconv::services::conversion_orchestrator::{
    ConversionOrchestrator, ConversionOutcome, ConversionPhase, ProgressAnimation, MSG_COMPLETE,
    MSG_UPLOADING,
};
use imgconv::services::image_service::ImageServiceTrait;
use imgconv::types::conversion::{ConvertedImage, SupportedFormats};
use imgconv::types::errors::{ConversionError, MSG_SERVER_ERROR};
use imgconv::types::file::{Blob, SelectedFile};
use imgconv::types::options::{ConversionOptions, ConversionOptionsPatch, ImageFormat};
use imgconv::types::progress::ProgressPatch;

/// Conversion service returning a fixed result after a delay.
struct FakeService {
    result: Result<ConvertedImage, ConversionError>,
    delay: Duration,
    calls: AtomicUsize,
    last_options: std::sync::Mutex<Option<ConversionOptions>>,
}

impl FakeService {
    fn new(result: Result<ConvertedImage, ConversionError>, delay: Duration) -> Self {
        Self {
            result,
            delay,
            calls: AtomicUsize::new(0),
            last_options: std::sync::Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageServiceTrait for FakeService {
    async fn convert_image(
        &self,
        _file: &SelectedFile,
        options: &ConversionOptions,
    ) -> Result<ConvertedImage, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());
        tokio::time::sleep(self.delay).await;
        self.result.clone()
    }

    async fn get_supported_formats(&self) -> SupportedFormats {
        SupportedFormats::default()
    }
}

fn converted() -> ConvertedImage {
    ConvertedImage {
        blob: Blob::new(vec![7u8; 64], "image/webp"),
        width: 640,
        height: 480,
        size: 64,
    }
}

struct Fixture {
    orchestrator: Arc<ConversionOrchestrator<FakeService>>,
    state: SharedImageState,
    registry: ObjectUrlRegistry,
}

fn fixture(result: Result<ConvertedImage, ConversionError>, delay: Duration) -> Fixture {
    let state = SharedImageState::new();
    let registry = ObjectUrlRegistry::new();
    let orchestrator = Arc::new(ConversionOrchestrator::new(
        FakeService::new(result, delay),
        state.clone(),
        registry.clone(),
        AnimationConfig::default(),
    ));
    Fixture {
        orchestrator,
        state,
        registry,
    }
}

fn select(state: &SharedImageState) {
    state
        .lock()
        .set_selected_file(Some(SelectedFile::from_bytes("photo.png", vec![1u8; 16])));
}

#[tokio::test(start_paused = true)]
async fn test_convert_without_file_is_noop() {
    let f = fixture(Ok(converted()), Duration::ZERO);
    let before = f.state.snapshot();

    let outcome = f.orchestrator.convert().await;

    assert_eq!(outcome, ConversionOutcome::Skipped);
    assert_eq!(f.state.snapshot(), before);
    assert_eq!(f.orchestrator.service().calls(), 0);
    assert_eq!(f.orchestrator.phase(), ConversionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_successful_conversion_populates_result() {
    let f = fixture(Ok(converted()), Duration::from_millis(500));
    select(&f.state);

    let outcome = f.orchestrator.convert().await;

    assert_eq!(outcome, ConversionOutcome::Succeeded);
    assert_eq!(f.orchestrator.phase(), ConversionPhase::Succeeded);
    let state = f.state.lock();
    assert!(!state.progress().is_converting);
    assert_eq!(state.progress().progress, 100);
    assert_eq!(state.progress().message, MSG_COMPLETE);
    assert!(state.error().is_none());

    let metadata = state.converted_metadata().unwrap();
    assert_eq!((metadata.width, metadata.height, metadata.size), (640, 480, 64));
    let url = state.converted_image_url().unwrap();
    assert_eq!(f.registry.resolve(url.as_str()).map(|b| b.size()), Some(64));
}

#[tokio::test(start_paused = true)]
async fn test_failed_conversion_stores_message() {
    let f = fixture(Err(ConversionError::ServerError), Duration::from_millis(200));
    select(&f.state);

    let outcome = f.orchestrator.convert().await;

    assert_eq!(outcome, ConversionOutcome::Failed(MSG_SERVER_ERROR.to_string()));
    assert_eq!(f.orchestrator.phase(), ConversionPhase::Failed);
    let state = f.state.lock();
    assert_eq!(state.error(), Some(MSG_SERVER_ERROR));
    assert!(!state.progress().is_converting);
    assert_eq!(state.progress().progress, 0);
    assert_eq!(state.progress().message, "");
    assert!(state.converted_image_url().is_none());
    assert!(state.selected_file().is_some(), "the file stays selected for a retry");
}

#[tokio::test(start_paused = true)]
async fn test_new_attempt_clears_previous_error() {
    let f = fixture(Ok(converted()), Duration::from_secs(1));
    select(&f.state);
    f.state.lock().set_error(Some("earlier".to_string()));

    let task = tokio::spawn({
        let orchestrator = f.orchestrator.clone();
        async move { orchestrator.convert().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(f.state.lock().error().is_none());
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_progress_animates_while_waiting() {
    let f = fixture(Ok(converted()), Duration::from_secs(10));
    select(&f.state);

    let task = tokio::spawn({
        let orchestrator = f.orchestrator.clone();
        async move { orchestrator.convert().await }
    });

    tokio::time::sleep(Duration::from_millis(5)).await;
    {
        let state = f.state.lock();
        assert!(state.progress().is_converting);
        assert_eq!(state.progress().progress, 25);
        assert_eq!(state.progress().message, MSG_UPLOADING);
        assert!(!state.can_convert());
    }
    assert_eq!(f.orchestrator.phase(), ConversionPhase::AwaitingResponse);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let midway = f.state.lock().progress().progress;
    assert!((40..=55).contains(&midway), "progress after ~1s was {}", midway);

    tokio::time::sleep(Duration::from_secs(4)).await;
    {
        let state = f.state.lock();
        assert_eq!(state.progress().progress, 90, "animation stops at its end value");
        assert!(state.progress().is_converting);
    }

    assert_eq!(task.await.unwrap(), ConversionOutcome::Succeeded);
    assert_eq!(f.state.lock().progress().progress, 100);
}

#[tokio::test(start_paused = true)]
async fn test_animation_never_overwrites_terminal_progress() {
    let f = fixture(Ok(converted()), Duration::from_millis(450));
    select(&f.state);

    f.orchestrator.convert().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    let state = f.state.lock();
    assert_eq!(state.progress().progress, 100);
    assert_eq!(state.progress().message, MSG_COMPLETE);
}

#[tokio::test(start_paused = true)]
async fn test_second_convert_while_in_flight_is_skipped() {
    let f = fixture(Ok(converted()), Duration::from_secs(2));
    select(&f.state);

    let first = tokio::spawn({
        let orchestrator = f.orchestrator.clone();
        async move { orchestrator.convert().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(f.orchestrator.convert().await, ConversionOutcome::Skipped);
    assert_eq!(first.await.unwrap(), ConversionOutcome::Succeeded);
    assert_eq!(f.orchestrator.service().calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_current_options_are_submitted() {
    let f = fixture(Ok(converted()), Duration::ZERO);
    select(&f.state);
    f.state
        .lock()
        .set_conversion_options(&ConversionOptionsPatch::target_format(ImageFormat::Png));

    f.orchestrator.convert().await;

    let sent = f.orchestrator.service().last_options.lock().unwrap().clone();
    assert_eq!(sent.map(|o| o.target_format), Some(ImageFormat::Png));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_animation_stops_writing() {
    let state = SharedImageState::new();
    let animation = ProgressAnimation::start(state.clone(), AnimationConfig::default());

    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(state.lock().progress().progress > 25);

    animation.cancel();
    state.lock().set_progress(&ProgressPatch::percent(3));
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(state.lock().progress().progress, 3);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_animation_stops_it() {
    let state = SharedImageState::new();
    {
        let animation = ProgressAnimation::start(state.clone(), AnimationConfig::default());
        assert!(!animation.is_stopped());
    }
    state.lock().set_progress(&ProgressPatch::percent(1));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(state.lock().progress().progress, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_convert_frees_the_state() {
    let f = fixture(Ok(converted()), Duration::from_secs(30));
    select(&f.state);

    let abandoned = tokio::time::timeout(Duration::from_millis(700), f.orchestrator.convert()).await;
    assert!(abandoned.is_err());

    {
        let state = f.state.lock();
        assert!(!state.progress().is_converting);
        assert_eq!(state.progress().progress, 0);
        assert!(state.can_convert());
    }
    assert_eq!(f.orchestrator.phase(), ConversionPhase::Idle);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(f.state.lock().progress().progress, 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_animation_still_runs() {
    let state = SharedImageState::new();
    let config = AnimationConfig {
        tick: Duration::ZERO,
        duration: Duration::from_millis(10),
        ..AnimationConfig::default()
    };
    let animation = ProgressAnimation::start(state.clone(), config);

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(state.lock().progress().progress, 90);
    assert!(!animation.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_end_below_start_holds_at_start() {
    let state = SharedImageState::new();
    let config = AnimationConfig {
        start: 40,
        end: 10,
        ..AnimationConfig::default()
    };
    let _animation = ProgressAnimation::start(state.clone(), config);

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(state.lock().progress().progress, 40);
}
