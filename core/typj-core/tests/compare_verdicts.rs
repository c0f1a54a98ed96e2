mod common;

use common::{scripted, Glyphs};
use typj_core::store::Verdict;

#[tokio::test]
async fn matching_renders_mean_supported() {
    let (mut comparator, _) = scripted(&[("Noto Sans JP", Glyphs::Owns)]);
    assert_eq!(comparator.compare("Noto Sans JP").await, Verdict::Supported);
    assert_eq!(comparator.measure("Noto Sans JP").unwrap(), 0);
}

#[tokio::test]
async fn diverging_fallbacks_mean_unsupported() {
    let (mut comparator, _) = scripted(&[("Arial", Glyphs::Lacks)]);
    assert!(comparator.measure("Arial").unwrap() >= 20);
    assert_eq!(comparator.compare("Arial").await, Verdict::Unsupported);
}

#[tokio::test]
async fn render_errors_fail_closed() {
    let (mut comparator, _) = scripted(&[("Glitchy", Glyphs::Broken)]);
    assert!(comparator.measure("Glitchy").is_err());
    assert_eq!(comparator.compare("Glitchy").await, Verdict::Unsupported);
}

#[tokio::test]
async fn each_comparison_waits_for_its_font() {
    let (mut comparator, log) = scripted(&[]);
    comparator.compare("Arial").await;
    comparator.compare("Times").await;

    assert_eq!(
        log.lock().readiness,
        vec!["Arial".to_string(), "Times".to_string()]
    );
}
