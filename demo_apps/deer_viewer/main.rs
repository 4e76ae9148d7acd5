//! Deer viewer.
//!
//! Usage: `deer_viewer [settings.json]`
//!
//! Press `1` for the first trigger (idle by default), `2` for the second
//! (die), `Escape` to quit. The window title shows load progress, then the
//! playing clip and its cursor.

use std::sync::Arc;

use fawn::app::winit::{ViewerApp, Window};
use fawn::{FixedCamera, FrameView, LoadStatus, RenderSurface, ViewerSettings};

/// Reports viewer state through the window title.
struct TitleSurface {
    window: Arc<Window>,
    base_title: String,
    last_title: String,
}

impl TitleSurface {
    fn describe(&self, frame: &FrameView<'_>) -> String {
        match frame.load_status {
            LoadStatus::Idle => format!("{} | waiting", self.base_title),
            LoadStatus::Loading { progress: None } => format!("{} | loading", self.base_title),
            LoadStatus::Loading {
                progress: Some(progress),
            } => format!(
                "{} | loading {:.0}%",
                self.base_title,
                progress.fraction() * 100.0
            ),
            LoadStatus::Failed(err) => format!("{} | failed: {err}", self.base_title),
            LoadStatus::Ready => match frame.active {
                Some(action) => format!(
                    "{} | {} {:.2}s",
                    self.base_title,
                    action.name(),
                    action.time()
                ),
                None => format!("{} | idle", self.base_title),
            },
        }
    }
}

impl RenderSurface for TitleSurface {
    fn render(&mut self, frame: &FrameView<'_>) {
        let title = self.describe(frame);
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Viewport resized to {width}x{height}");
    }
}

fn main() -> anyhow::Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => ViewerSettings::from_json_file(path)?,
        None => ViewerSettings::default().with_title("Deer Viewer"),
    };

    let base_title = settings.title.clone();
    ViewerApp::new(settings).run(move |window: &Arc<Window>| {
        let surface = TitleSurface {
            window: Arc::clone(window),
            base_title: base_title.clone(),
            last_title: String::new(),
        };
        (surface, FixedCamera)
    })?;
    Ok(())
}
