//! Property-based tests for the file selection filters.
//!
//! A file reaches the conversion state only when its extension is accepted
//! and its size is within the bound; rejected files leave the state as it was.

use imgconv::managers::image_state_manager::SharedImageState;
use imgconv::managers::object_url_registry::ObjectUrlRegistry;
use imgconv::managers::upload_manager::{validate_file, UploadManager, UploadManagerTrait};
use imgconv::types::file::{SelectedFile, ACCEPTED_EXTENSIONS, MAX_FILE_SIZE};
use proptest::prelude::*;

fn arb_accepted_ext() -> impl Strategy<Value = String> {
    proptest::sample::select(ACCEPTED_EXTENSIONS.to_vec()).prop_flat_map(|ext| {
        // Any mix of upper and lower case.
        proptest::collection::vec(any::<bool>(), ext.len()).prop_map(move |upper| {
            ext.chars()
                .zip(upper)
                .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
                .collect::<String>()
        })
    })
}

fn arb_rejected_ext() -> impl Strategy<Value = String> {
    "[a-z]{1,5}".prop_filter("accepted extension", |ext| {
        !ACCEPTED_EXTENSIONS.contains(&ext.as_str())
    })
}

proptest! {
    #[test]
    fn prop_accepted_extension_within_bound_passes(
        stem in "[a-zA-Z0-9_-]{1,16}",
        ext in arb_accepted_ext(),
        size in 0u64..=MAX_FILE_SIZE,
    ) {
        let name = format!("{}.{}", stem, ext);
        prop_assert!(validate_file(&name, size).is_ok());
    }

    #[test]
    fn prop_oversized_files_rejected(
        ext in arb_accepted_ext(),
        excess in 1u64..1_000_000_000,
    ) {
        let name = format!("image.{}", ext);
        prop_assert!(validate_file(&name, MAX_FILE_SIZE + excess).is_err());
    }

    #[test]
    fn prop_other_extensions_rejected(stem in "[a-z]{1,8}", ext in arb_rejected_ext()) {
        let name = format!("{}.{}", stem, ext);
        prop_assert!(validate_file(&name, 10).is_err());
    }

    #[test]
    fn prop_rejected_drop_keeps_previous_selection(
        ext in arb_rejected_ext(),
        extra in 2usize..5,
    ) {
        let state = SharedImageState::new();
        let mut manager = UploadManager::new(state.clone(), ObjectUrlRegistry::new());
        manager.drop_files(vec![SelectedFile::from_bytes("keep.png", vec![1u8])]).unwrap();
        let before = state.snapshot();

        let bad_type = manager.drop_files(vec![SelectedFile::from_bytes(format!("x.{}", ext), vec![1u8])]);
        let many = manager.drop_files(
            (0..extra).map(|i| SelectedFile::from_bytes(format!("{}.png", i), vec![1u8])).collect(),
        );

        prop_assert!(bad_type.is_err());
        prop_assert!(many.is_err());
        prop_assert_eq!(state.snapshot(), before);
    }
}
