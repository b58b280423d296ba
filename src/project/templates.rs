use serde::{Deserialize, Serialize};

use crate::project::manifest::{ProjectManifest, TemplateId};

/// Composition settings baked into generated templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositionSpec {
    /// Composition id passed to the renderer.
    pub id: String,
    /// Frames per second.
    pub fps: u32,
    /// Length in frames.
    pub duration_frames: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for CompositionSpec {
    fn default() -> Self {
        Self {
            id: "Artifact".to_owned(),
            fps: 30,
            duration_frames: 300,
            width: 1920,
            height: 1080,
        }
    }
}

/// Minimal valid contents for a templated file located at `at`.
///
/// Imports are computed relative to `at` from the manifest's payload and root entries.
pub fn render_template(
    template: TemplateId,
    at: &str,
    manifest: &ProjectManifest,
    comp: &CompositionSpec,
) -> String {
    match template {
        TemplateId::RootTemplate => {
            let payload = manifest.primary().map_or("src/Artifact.tsx", |e| e.path.as_str());
            let id = serde_json::to_string(&comp.id).unwrap_or_else(|_| "\"Artifact\"".to_owned());
            format!(
                "import {{ Composition }} from 'remotion';
import Artifact from '{import}';

export const RemotionRoot = () => {{
  return (
    <Composition
      id={{{id}}}
      component={{Artifact}}
      durationInFrames={{{duration}}}
      fps={{{fps}}}
      width={{{width}}}
      height={{{height}}}
    />
  );
}};
",
                import = relative_import(at, payload),
                duration = comp.duration_frames,
                fps = comp.fps,
                width = comp.width,
                height = comp.height,
            )
        }
        TemplateId::EntryTemplate => {
            let root = manifest
                .with_template(TemplateId::RootTemplate)
                .map_or("src/Root.tsx", |e| e.path.as_str());
            format!(
                "import {{ registerRoot }} from 'remotion';
import {{ RemotionRoot }} from '{}';

registerRoot(RemotionRoot);
",
                relative_import(at, root)
            )
        }
        TemplateId::ConfigTemplate => "import { Config } from '@remotion/cli/config';

Config.setVideoImageFormat('jpeg');
Config.setOverwriteOutput(true);
"
        .to_owned(),
    }
}

/// Module specifier for `to` as imported from the file `from` (both project-relative).
pub(crate) fn relative_import(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = {
        let mut parts: Vec<&str> = from.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
        parts.pop();
        parts
    };
    let mut target: Vec<&str> = to.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    if let Some(last) = target.last_mut() {
        let name: &str = *last;
        *last = match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        };
    }
    let dir_len = target.len().saturating_sub(1);
    let common = from_dir
        .iter()
        .zip(&target[..dir_len])
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = Vec::new();
    match from_dir.len() - common {
        0 => out.push("."),
        ups => out.extend(std::iter::repeat_n("..", ups)),
    }
    out.extend(&target[common..]);
    out.join("/")
}
