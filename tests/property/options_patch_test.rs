//! Property-based tests for conversion option and progress merge-patches.
//!
//! A patch overwrites exactly the fields it names and keeps every other
//! field, and applying the same patch twice changes nothing further.

use imgconv::managers::image_state_manager::{ImageStateManager, ImageStateManagerTrait};
use imgconv::types::options::{ConversionOptions, ConversionOptionsPatch, ImageFormat};
use imgconv::types::progress::{ConversionProgress, ProgressPatch};
use proptest::prelude::*;

fn arb_format() -> impl Strategy<Value = ImageFormat> {
    prop_oneof![
        Just(ImageFormat::Webp),
        Just(ImageFormat::Jpeg),
        Just(ImageFormat::Png),
        Just(ImageFormat::Jpg),
    ]
}

fn arb_options() -> impl Strategy<Value = ConversionOptions> {
    (
        arb_format(),
        proptest::option::of(1u8..=100),
        proptest::option::of(1u32..10_000),
        proptest::option::of(1u32..10_000),
        proptest::option::of(0.1f64..100.0),
    )
        .prop_map(
            |(target_format, quality, max_width, max_height, max_size_mb)| ConversionOptions {
                target_format,
                quality,
                max_width,
                max_height,
                max_size_mb,
            },
        )
}

fn arb_patch() -> impl Strategy<Value = ConversionOptionsPatch> {
    (
        proptest::option::of(arb_format()),
        proptest::option::of(proptest::option::of(1u8..=100)),
        proptest::option::of(proptest::option::of(1u32..10_000)),
        proptest::option::of(proptest::option::of(1u32..10_000)),
        proptest::option::of(proptest::option::of(0.1f64..100.0)),
    )
        .prop_map(
            |(target_format, quality, max_width, max_height, max_size_mb)| ConversionOptionsPatch {
                target_format,
                quality,
                max_width,
                max_height,
                max_size_mb,
            },
        )
}

fn arb_progress_patch() -> impl Strategy<Value = ProgressPatch> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(0u8..=100),
        proptest::option::of("[a-z ]{0,12}"),
    )
        .prop_map(|(is_converting, progress, message)| ProgressPatch {
            is_converting,
            progress,
            message,
        })
}

proptest! {
    #[test]
    fn prop_patch_touches_only_named_fields(base in arb_options(), patch in arb_patch()) {
        let merged = base.apply(&patch);

        prop_assert_eq!(merged.target_format, patch.target_format.unwrap_or(base.target_format));
        prop_assert_eq!(merged.quality, patch.quality.unwrap_or(base.quality));
        prop_assert_eq!(merged.max_width, patch.max_width.unwrap_or(base.max_width));
        prop_assert_eq!(merged.max_height, patch.max_height.unwrap_or(base.max_height));
        prop_assert_eq!(merged.max_size_mb, patch.max_size_mb.unwrap_or(base.max_size_mb));
    }

    #[test]
    fn prop_patch_is_idempotent(base in arb_options(), patch in arb_patch()) {
        let once = base.apply(&patch);
        let twice = once.apply(&patch);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_empty_patch_is_identity(base in arb_options()) {
        let patch = ConversionOptionsPatch::default();
        prop_assert!(patch.is_empty());
        prop_assert_eq!(base.apply(&patch), base);
    }

    #[test]
    fn prop_state_applies_patches_in_order(patches in proptest::collection::vec(arb_patch(), 0..8)) {
        let mut state = ImageStateManager::new();
        let mut expected = ConversionOptions::default();
        for patch in &patches {
            state.set_conversion_options(patch);
            expected = expected.apply(patch);
        }
        prop_assert_eq!(state.conversion_options(), &expected);
        prop_assert!(state.selected_file().is_none());
    }

    #[test]
    fn prop_progress_patch_keeps_unnamed_fields(patch in arb_progress_patch()) {
        let base = ConversionProgress {
            is_converting: true,
            progress: 42,
            message: "이미지 업로드 중...".to_string(),
        };
        let merged = base.apply(&patch);

        prop_assert_eq!(merged.is_converting, patch.is_converting.unwrap_or(true));
        prop_assert_eq!(merged.progress, patch.progress.unwrap_or(42));
        prop_assert_eq!(merged.message, patch.message.clone().unwrap_or(base.message.clone()));
    }
}
