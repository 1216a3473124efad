//! Print normalisation: two sequential Ghostscript passes over the raw PDF.
//!
//! ## Why two passes?
//!
//! Browser PDF output leans on features older print RIPs mishandle:
//! transparency groups, embedded subset fonts, high-version xref streams.
//! A single `pdfwrite` pass preserves too much of that structure, so the
//! pipeline first flattens everything to PostScript (`ps2write`), then
//! rebuilds a PDF from the flat stream:
//!
//! 1. **PDF → PostScript** — discards transparency groups and document
//!    structure that cannot be expressed in PostScript.
//! 2. **PostScript → PDF 1.3** — re-emits a prepress-quality PDF with every
//!    glyph outlined (`-dNoOutputFonts`), downsampling disabled, colour
//!    untouched, and auto-rotation off.
//!
//! The result opens identically on a 15-year-old imagesetter and a modern
//! viewer, at the cost of larger files and unselectable text.

use crate::error::PrepressError;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::{debug, info};

/// Capability interface over the external PostScript/PDF processor.
///
/// Narrow on purpose: the orchestrator only ever needs to ask "are you
/// installed?" and "run these arguments". Tests substitute a fake; the
/// production implementation is [`Ghostscript`].
pub trait PostScriptEngine: Send + Sync {
    /// Probe for the engine binary. Absence is a distinct condition from a
    /// run that starts and fails.
    fn is_available(&self) -> bool;

    /// Run the engine. `Ok` carries the exit status and captured streams
    /// even for non-zero exits; `Err` means the process could not start.
    fn run(&self, args: &[OsString]) -> io::Result<Output>;
}

/// The system `gs` binary, discovered on `PATH`.
pub struct Ghostscript;

const GS_PROGRAM: &str = "gs";

impl PostScriptEngine for Ghostscript {
    fn is_available(&self) -> bool {
        Command::new(GS_PROGRAM)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn run(&self, args: &[OsString]) -> io::Result<Output> {
        Command::new(GS_PROGRAM)
            .args(args)
            .stdin(Stdio::null())
            .output()
    }
}

/// Normalise `raw_pdf` into a print-safe PDF at `output`.
///
/// On `Err` the caller falls back to delivering `raw_pdf` unmodified; this
/// function never touches `raw_pdf` itself. The intermediate PostScript
/// file lives next to `raw_pdf` under a randomised name and is deleted when
/// its guard drops, whatever the outcome of stage 2.
pub fn normalize(
    engine: &dyn PostScriptEngine,
    raw_pdf: &Path,
    output: &Path,
) -> Result<(), PrepressError> {
    let ps_dir = raw_pdf.parent().unwrap_or_else(|| Path::new("."));
    let ps_file = tempfile::Builder::new()
        .prefix("prepress-")
        .suffix(".ps")
        .tempfile_in(ps_dir)
        .map_err(|e| PrepressError::Internal(format!("intermediate PostScript file: {e}")))?;

    info!("Stage 1: converting PDF to PostScript");
    run_stage(
        engine,
        STAGE_ONE,
        &stage_one_args(raw_pdf, ps_file.path()),
    )?;

    info!("Stage 2: converting PostScript to printer-compatible PDF");
    run_stage(
        engine,
        STAGE_TWO,
        &stage_two_args(ps_file.path(), output),
    )?;

    info!("Post-processing complete: fonts outlined, transparency flattened to PDF 1.3");
    Ok(())
}

const STAGE_ONE: &str = "stage 1 (PDF to PostScript)";
const STAGE_TWO: &str = "stage 2 (PostScript to PDF)";

fn run_stage(
    engine: &dyn PostScriptEngine,
    stage: &'static str,
    args: &[OsString],
) -> Result<(), PrepressError> {
    debug!("{stage}: gs {:?}", args);
    let out = engine
        .run(args)
        .map_err(|e| PrepressError::PostProcessFailed {
            stage,
            detail: format!("failed to start: {e}"),
        })?;

    if out.status.success() {
        Ok(())
    } else {
        Err(PrepressError::PostProcessFailed {
            stage,
            detail: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        })
    }
}

fn output_file_arg(path: &Path) -> OsString {
    let mut arg = OsString::from("-sOutputFile=");
    arg.push(path);
    arg
}

/// Stage 1 arguments: flatten the PDF into PostScript.
fn stage_one_args(input_pdf: &Path, ps_out: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-dNOPAUSE"),
        OsString::from("-dBATCH"),
        OsString::from("-dSAFER"),
        OsString::from("-sDEVICE=ps2write"),
        output_file_arg(ps_out),
        input_pdf.into(),
    ]
}

/// Stage 2 arguments: rebuild a PDF 1.3 with outlined fonts.
fn stage_two_args(ps_in: &Path, output_pdf: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-dNOPAUSE"),
        OsString::from("-dBATCH"),
        OsString::from("-dSAFER"),
        OsString::from("-sDEVICE=pdfwrite"),
        // PDF 1.3 has no transparency model, forcing a full flatten.
        OsString::from("-dCompatibilityLevel=1.3"),
        OsString::from("-dPDFSETTINGS=/prepress"),
        // Every glyph becomes vector outlines; no font embedding or
        // substitution can happen downstream.
        OsString::from("-dNoOutputFonts"),
        OsString::from("-dColorImageResolution=600"),
        OsString::from("-dGrayImageResolution=600"),
        OsString::from("-dMonoImageResolution=1200"),
        OsString::from("-dDownsampleColorImages=false"),
        OsString::from("-dDownsampleGrayImages=false"),
        OsString::from("-dDownsampleMonoImages=false"),
        OsString::from("-dColorConversionStrategy=/LeaveColorUnchanged"),
        OsString::from("-dAutoRotatePages=/None"),
        output_file_arg(output_pdf),
        ps_in.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::path::PathBuf;
    use std::process::ExitStatus;
    use std::sync::Mutex;

    /// Scripted engine: answers each `run` call from a queue and records
    /// the argument lists it received.
    struct FakeEngine {
        results: Mutex<Vec<io::Result<Output>>>,
        pub calls: Mutex<Vec<Vec<OsString>>>,
    }

    impl FakeEngine {
        fn new(results: Vec<io::Result<Output>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn ok() -> io::Result<Output> {
            Ok(Output {
                status: ExitStatus::from_raw(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            })
        }

        fn failing(stderr: &str) -> io::Result<Output> {
            Ok(Output {
                status: ExitStatus::from_raw(0x100), // exit code 1
                stdout: Vec::new(),
                stderr: stderr.as_bytes().to_vec(),
            })
        }
    }

    impl PostScriptEngine for FakeEngine {
        fn is_available(&self) -> bool {
            true
        }

        fn run(&self, args: &[OsString]) -> io::Result<Output> {
            self.calls.lock().unwrap().push(args.to_vec());
            self.results.lock().unwrap().remove(0)
        }
    }

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn stage_one_uses_the_postscript_writer() {
        let args = as_strings(&stage_one_args(
            Path::new("/tmp/in.pdf"),
            Path::new("/tmp/x.ps"),
        ));
        assert!(args.contains(&"-sDEVICE=ps2write".to_string()));
        assert!(args.contains(&"-dSAFER".to_string()));
        assert!(args.contains(&"-sOutputFile=/tmp/x.ps".to_string()));
        assert_eq!(args.last().unwrap(), "/tmp/in.pdf");
    }

    #[test]
    fn stage_two_carries_the_full_prepress_profile() {
        let args = as_strings(&stage_two_args(
            Path::new("/tmp/x.ps"),
            Path::new("/tmp/out.pdf"),
        ));
        for expected in [
            "-sDEVICE=pdfwrite",
            "-dCompatibilityLevel=1.3",
            "-dPDFSETTINGS=/prepress",
            "-dNoOutputFonts",
            "-dColorImageResolution=600",
            "-dGrayImageResolution=600",
            "-dMonoImageResolution=1200",
            "-dDownsampleColorImages=false",
            "-dDownsampleGrayImages=false",
            "-dDownsampleMonoImages=false",
            "-dColorConversionStrategy=/LeaveColorUnchanged",
            "-dAutoRotatePages=/None",
            "-sOutputFile=/tmp/out.pdf",
        ] {
            assert!(args.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(args.last().unwrap(), "/tmp/x.ps");
    }

    #[test]
    fn normalize_runs_both_stages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("render.pdf");
        std::fs::write(&raw, b"%PDF-1.4").unwrap();

        let engine = FakeEngine::new(vec![FakeEngine::ok(), FakeEngine::ok()]);
        normalize(&engine, &raw, &dir.path().join("out.pdf")).unwrap();

        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(as_strings(&calls[0]).contains(&"-sDEVICE=ps2write".to_string()));
        assert!(as_strings(&calls[1]).contains(&"-sDEVICE=pdfwrite".to_string()));
    }

    #[test]
    fn stage_failure_surfaces_stderr_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("render.pdf");
        std::fs::write(&raw, b"%PDF-1.4").unwrap();

        let engine = FakeEngine::new(vec![FakeEngine::failing("ioerror in runpdf")]);
        let err = normalize(&engine, &raw, &dir.path().join("out.pdf")).unwrap_err();

        assert!(matches!(
            &err,
            PrepressError::PostProcessFailed { stage, .. } if *stage == STAGE_ONE
        ));
        assert!(err.to_string().contains("ioerror in runpdf"));
        assert_eq!(engine.calls.lock().unwrap().len(), 1, "stage 2 must not run");
    }

    #[test]
    fn intermediate_postscript_is_deleted_whatever_the_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("render.pdf");
        std::fs::write(&raw, b"%PDF-1.4").unwrap();

        let ps_path_of = |engine: &FakeEngine| -> PathBuf {
            let calls = engine.calls.lock().unwrap();
            let arg = calls[0]
                .iter()
                .find_map(|a| {
                    a.to_string_lossy()
                        .strip_prefix("-sOutputFile=")
                        .map(String::from)
                })
                .unwrap();
            PathBuf::from(arg)
        };

        // Success path.
        let engine = FakeEngine::new(vec![FakeEngine::ok(), FakeEngine::ok()]);
        normalize(&engine, &raw, &dir.path().join("out.pdf")).unwrap();
        assert!(!ps_path_of(&engine).exists());

        // Stage-2 failure path.
        let engine = FakeEngine::new(vec![FakeEngine::ok(), FakeEngine::failing("boom")]);
        normalize(&engine, &raw, &dir.path().join("out.pdf")).unwrap_err();
        assert!(!ps_path_of(&engine).exists());
    }

    #[test]
    fn spawn_failure_is_reported_as_stage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("render.pdf");
        std::fs::write(&raw, b"%PDF-1.4").unwrap();

        let engine = FakeEngine::new(vec![Err(io::Error::new(
            io::ErrorKind::NotFound,
            "gs vanished",
        ))]);
        let err = normalize(&engine, &raw, &dir.path().join("out.pdf")).unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }
}
