//! Console host: prints what a graphical viewport would do.

use std::path::Path;

use charforge_backend_blender::BlenderErrorInfo;
use charforge_core::{Notifier, SculptTransform, Viewport};
use charforge_spec::KeyedMap;
use colored::Colorize;

/// Viewport that logs every call at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleViewport;

impl Viewport for ConsoleViewport {
    fn load_preview(&mut self, path: &Path) {
        tracing::debug!("viewport: load {}", path.display());
    }

    fn refresh_view(&mut self) {
        tracing::debug!("viewport: refresh");
    }

    fn update_preview(&mut self, anatomy: &KeyedMap<bool>, assets: &KeyedMap<Vec<String>>) {
        let layers: Vec<&str> = anatomy
            .iter()
            .filter(|(_, on)| **on)
            .map(|(k, _)| k)
            .collect();
        let asset_count: usize = assets.iter().map(|(_, list)| list.len()).sum();
        tracing::debug!(
            "viewport: layers [{}], {} assets",
            layers.join(", "),
            asset_count
        );
    }

    fn apply_sculpt_transform(&mut self, _params: &KeyedMap<i32>, transform: &SculptTransform) {
        tracing::debug!(
            "viewport: scale {:.3} about {:?}, offset {:?}",
            transform.scale,
            transform.pivot,
            transform.offset
        );
    }
}

/// Prints tool failures and model warnings to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn tool_error(&mut self, info: &BlenderErrorInfo) {
        eprintln!("{} {}", "Blender error:".red().bold(), info.message);
        if let Some(detail) = &info.detail {
            eprintln!("  {}", detail.dimmed());
        }
        if let Some(fix) = &info.suggested_fix {
            eprintln!("  {} {}", "fix:".yellow(), fix);
        }
    }

    fn model_warning(&mut self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}
