//! Bridge to the external video renderer. Rendering itself happens out of process.

mod external;

pub use external::{ExternalRenderer, RenderJob};

#[cfg(test)]
#[path = "../../tests/unit/render/external.rs"]
mod tests;
