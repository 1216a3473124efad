//! End-to-end integration tests for prepress.
//!
//! These tests launch a real headless Chrome and, where present, the real
//! Ghostscript binary. They are gated behind the `E2E_ENABLED` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use prepress::{
    convert, ConversionConfig, Ghostscript, PageSize, PostScriptEngine, SlideSize,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

fn write_document_fixture(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("flyer.html");
    std::fs::write(
        &path,
        r#"<!doctype html>
<html>
<head>
  <style>
    @page { margin: 0; }
    body { margin: 0; background: #fdf6e3; font-family: sans-serif; }
    h1 { color: #b58900; padding: 40px; }
  </style>
</head>
<body><h1>Grand Opening</h1><p style="padding:0 40px">Saturday, 10am.</p></body>
</html>
"#,
    )
    .unwrap();
    path
}

fn write_deck_fixture(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("deck.html");
    // A minimal stand-in deck exposing the reveal.js readiness surface.
    std::fs::write(
        &path,
        r#"<!doctype html>
<html>
<head>
  <script>window.Reveal = { isReady: function () { return true; } };</script>
  <style>body { margin: 0; } section { height: 100vh; }</style>
</head>
<body>
  <div class="reveal"><section><h1>Title</h1></section></div>
</body>
</html>
"#,
    )
    .unwrap();
    path
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ── Render-only (no Ghostscript needed) ──────────────────────────────────────

#[tokio::test]
async fn document_renders_to_a_pdf_without_postprocess() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let input = write_document_fixture(&dir);
    let out = dir.path().join("flyer.pdf");

    let config = ConversionConfig::document(&input, &out, PageSize::A4)
        .postprocess(false)
        .settle_delay_ms(100)
        .build()
        .unwrap();

    let summary = convert(&config).await.expect("render should succeed");
    assert!(!summary.postprocessed);
    assert!(!summary.fallback);

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"), "output must be a PDF");
    assert!(bytes.len() > 1_000, "suspiciously small PDF: {}", bytes.len());
}

#[tokio::test]
async fn slide_deck_renders_with_the_framework_probe() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let input = write_deck_fixture(&dir);
    let out = dir.path().join("deck.pdf");

    let config = ConversionConfig::slides(&input, &out, SlideSize::Widescreen)
        .slides_per_page(2)
        .postprocess(false)
        .settle_delay_ms(100)
        .build()
        .unwrap();

    let summary = convert(&config).await.expect("render should succeed");
    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF-"));
    assert!(summary.render_duration_ms > 0);
}

#[tokio::test]
async fn missing_input_aborts_without_launching_chrome() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let config = ConversionConfig::document(
        dir.path().join("ghost.html"),
        dir.path().join("out.pdf"),
        PageSize::A4,
    )
    .postprocess(false)
    .build()
    .unwrap();

    let start = std::time::Instant::now();
    assert!(convert(&config).await.is_err());
    // Input validation must fail in milliseconds, well before any browser work.
    assert!(start.elapsed().as_secs() < 2);
}

// ── Full pipeline (needs Ghostscript) ────────────────────────────────────────

#[tokio::test]
async fn postprocessed_output_is_pdf_1_3_with_no_transparency_groups() {
    e2e_skip_unless_enabled!();
    if !Ghostscript.is_available() {
        println!("SKIP — Ghostscript not installed");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input = write_document_fixture(&dir);
    let out = dir.path().join("flyer.pdf");

    let config = ConversionConfig::document(&input, &out, PageSize::A4Bleed)
        .settle_delay_ms(100)
        .build()
        .unwrap();

    let summary = convert(&config).await.expect("full pipeline should succeed");
    assert!(summary.postprocessed);
    assert!(!summary.fallback);

    let bytes = std::fs::read(&out).unwrap();
    assert!(
        bytes.starts_with(b"%PDF-1.3"),
        "header must declare PDF 1.3, got: {:?}",
        &bytes[..bytes.len().min(8)]
    );
    assert!(
        !contains_subslice(&bytes, b"/Transparency"),
        "normalised output must not contain transparency groups"
    );
}

#[tokio::test]
async fn requested_postprocess_with_missing_tool_is_fatal() {
    e2e_skip_unless_enabled!();
    if Ghostscript.is_available() {
        println!("SKIP — Ghostscript is installed; cannot exercise the missing-tool path");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input = write_document_fixture(&dir);
    let out = dir.path().join("flyer.pdf");

    let config = ConversionConfig::document(&input, &out, PageSize::A4)
        .build()
        .unwrap();

    let err = convert(&config).await.unwrap_err();
    assert!(err.to_string().contains("Ghostscript not found"));
    assert!(!out.exists(), "no output file may be produced");
}
