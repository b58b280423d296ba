use super::*;
use crate::WrightError;
use crate::config::RendererConfig;
use crate::project::ProjectManifest;

fn job() -> RenderJob {
    RenderJob::for_manifest(&ProjectManifest::default(), "Clock", "out/clock.mp4")
}

#[test]
fn placeholders_are_substituted() {
    let r = ExternalRenderer::from_config(&RendererConfig::default());
    assert_eq!(
        r.command_line(&job()),
        ["remotion", "render", "src/index.ts", "Clock", "out/clock.mp4"]
    );
}

#[test]
fn missing_program_is_a_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let r = ExternalRenderer::new("framewright-no-such-renderer", ["{out}"]);
    let err = r.render(dir.path(), &job()).unwrap_err();
    assert!(matches!(err, WrightError::Render(_)));
    assert!(err.to_string().contains("failed to spawn"));
}

#[cfg(unix)]
#[test]
fn runs_in_the_project_dir_and_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let ok = ExternalRenderer::new("sh", ["-c", "test -f marker && touch \"$1\"", "sh", "{out}"]);
    std::fs::write(dir.path().join("marker"), "x").unwrap();
    let out = dir.path().join("video/out.mp4");
    let job = RenderJob {
        entry: "src/index.ts".into(),
        composition: "Clock".into(),
        out: out.clone(),
    };
    assert_eq!(ok.render(dir.path(), &job).unwrap(), out);
    assert!(out.exists());

    let bad = ExternalRenderer::new("sh", ["-c", "echo 'bundle failed' >&2; exit 3"]);
    let err = bad.render(dir.path(), &job).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("bundle failed"), "{msg}");
    assert!(msg.contains("status"));
}

struct FailsAfter(&'static [u8], bool);

impl std::io::Read for FailsAfter {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.1 {
            return Err(std::io::Error::other("pipe closed"));
        }
        self.1 = true;
        let n = self.0.len().min(buf.len());
        buf[..n].copy_from_slice(&self.0[..n]);
        Ok(n)
    }
}

#[test]
fn stderr_read_errors_keep_partial_output() {
    let bytes = external::drain(FailsAfter(b"bundling...", false));
    assert_eq!(bytes, b"bundling...");
    assert!(external::drain(std::io::empty()).is_empty());
}
