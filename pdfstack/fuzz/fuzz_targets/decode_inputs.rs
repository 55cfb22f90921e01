#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfstack::config::FailurePolicy;
use pdfstack::merge::MergeEngine;
use pdfstack::selection::SelectionSnapshot;
use pdfstack::validation::{FileDescriptor, InputValidator};
use std::sync::OnceLock;
use tokio::runtime::{Builder, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

fn runtime() -> &'static Runtime {
    RUNTIME.get_or_init(|| Builder::new_multi_thread().enable_all().build().unwrap())
}

const MEDIA_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

// The first byte picks the declared type; the rest is the file. Whatever the
// bytes are, a merge must either produce a document or a decode failure.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, bytes)) = data.split_first() else {
        return;
    };
    let media_type = MEDIA_TYPES[usize::from(selector) % MEDIA_TYPES.len()];

    let batch = vec![FileDescriptor::new("fuzz", media_type, bytes.to_vec())];
    let snapshot = SelectionSnapshot::from(InputValidator::new().classify(batch).accepted);

    let engine = MergeEngine::new().with_failure_policy(FailurePolicy::Abort);
    if let Ok(mut result) = runtime().block_on(engine.merge(&snapshot)) {
        let _ = result.document.to_bytes();
    }
});
