use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use goml_ids::NodeID;
use goml_project::Project;

use crate::document::{Document, DocumentServices};
use crate::frame_loop::{FrameLoop, FrameReport};

/// Totals from [`Runtime::run_frames`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub skipped: u64,
    pub callbacks: usize,
    pub failures: usize,
    pub elapsed: f64,
}

/// Host for one shared document and the loop that drives it.
pub struct Runtime {
    document: Rc<RefCell<Document>>,
    frame_loop: Rc<FrameLoop>,
    project: Option<Project>,
    clock_ms: f64,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Runtime on this thread's default frame loop, so callbacks added through
    /// the free functions of [`crate::frame_loop`] run with the document.
    pub fn new() -> Self {
        Self::with_services(DocumentServices::default())
    }

    pub fn with_services(services: DocumentServices) -> Self {
        let frame_loop = services.frame_loop.clone();
        Self {
            document: Document::new_shared_with(services),
            frame_loop,
            project: None,
            clock_ms: 0.0,
        }
    }

    /// Builds the project's main document.
    pub fn from_project(project: Project) -> anyhow::Result<Self> {
        let source = project.read_main_document()?;
        let mut runtime = Self::new();
        runtime
            .load_str(&source)
            .with_context(|| format!("failed to build {}", project.main_document_path().display()))?;
        runtime.project = Some(project);
        Ok(runtime)
    }

    pub fn load_project(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let project = Project::load(root)?;
        log::info!("loaded project {}", project.name());
        Self::from_project(project)
    }

    pub fn load_str(&mut self, source: &str) -> anyhow::Result<Vec<NodeID>> {
        let roots = self.document.borrow_mut().load_str(source)?;
        log::debug!("built {} top-level elements", roots.len());
        Ok(roots)
    }

    pub fn document(&self) -> &Rc<RefCell<Document>> {
        &self.document
    }

    pub fn frame_loop(&self) -> &Rc<FrameLoop> {
        &self.frame_loop
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Ticks the loop at `now_ms`. The document must not be borrowed.
    pub fn tick(&mut self, now_ms: f64) -> Option<FrameReport> {
        self.clock_ms = self.clock_ms.max(now_ms);
        self.frame_loop.tick(now_ms)
    }

    /// Drives `frames` ticks on a simulated clock advancing `1000 / fps` ms
    /// from wherever the loop's clock stands.
    pub fn run_frames(&mut self, frames: u64, fps: f64) -> RunSummary {
        let step = if fps > 0.0 { 1000.0 / fps } else { 1000.0 / 60.0 };
        let mut summary = RunSummary::default();
        for _ in 0..frames {
            let now = self.clock_ms.max(self.frame_loop.now_ms()) + step;
            match self.tick(now) {
                Some(report) => {
                    summary.frames += 1;
                    summary.callbacks += report.invoked;
                    summary.failures += report.failures.len();
                    summary.elapsed = report.time.total;
                }
                None => summary.skipped += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;
    use goml_project::ProjectSettings;

    const SCENE: &str = r##"
        <head>
          <scenes>
            <scene id="main">
              <cam id="eye" position=(0, 0, 10) />
              <mesh geo="Box" mtl="MeshBasic" />
            </scene>
          </scenes>
        </head>
        <body>
          <rdrs>
            <rdr width="400" height="200">
              <vps>
                <vp cam="#eye" scene="#main" />
              </vps>
            </rdr>
          </rdrs>
        </body>
    "##;

    fn recording_runtime() -> (Runtime, RecordingBackend) {
        let backend = RecordingBackend::new();
        let runtime = Runtime::with_services(DocumentServices {
            renderer: Box::new(backend.clone()),
            frame_loop: Rc::new(FrameLoop::new()),
            ..DocumentServices::default()
        });
        (runtime, backend)
    }

    #[test]
    fn run_frames_draws_every_frame() {
        let (mut runtime, backend) = recording_runtime();
        runtime.load_str(SCENE).unwrap();

        let summary = runtime.run_frames(3, 60.0);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failures, 0);
        assert_eq!(summary.callbacks, 3);
        assert!((summary.elapsed - 0.05).abs() < 1e-9);

        let passes = backend.passes();
        assert_eq!(passes.len(), 3);
        assert_eq!(passes[0].viewport.width, 400.0);
        assert_eq!(passes[0].viewport.height, 200.0);
    }

    #[test]
    fn starter_document_draws() {
        let (mut runtime, backend) = recording_runtime();
        runtime.load_str(goml_project::default_main_document()).unwrap();
        let summary = runtime.run_frames(2, 30.0);
        assert_eq!(summary.failures, 0);
        assert_eq!(backend.passes().len(), 2);
        assert_eq!(backend.passes()[0].clear_color, 0x101018);
    }

    #[test]
    fn solar_demo_draws_both_viewports() {
        let (mut runtime, backend) = recording_runtime();
        runtime
            .load_str(include_str!("../../../../demos/solar/main.goml"))
            .unwrap();
        let summary = runtime.run_frames(1, 60.0);
        assert_eq!(summary.failures, 0);

        let passes = backend.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[1].viewport.x, 960.0);
        assert_eq!(passes[1].viewport.width, 320.0);
        assert_eq!(passes[0].clear_color, 0x000010);

        let doc = runtime.document().borrow();
        let planet = doc.get_element_by_id("planet").unwrap();
        assert_eq!(doc.get_scene(planet), doc.get_element_by_id("system"));
    }

    #[test]
    fn default_runtime_runs_free_function_callbacks() {
        let hits = Rc::new(std::cell::Cell::new(0));
        let counter = Rc::clone(&hits);
        let callback = crate::frame_loop::FrameCallback::new(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        crate::frame_loop::update_system(&callback, true);

        let mut runtime = Runtime::new();
        assert!(Rc::ptr_eq(runtime.frame_loop(), &crate::frame_loop::default_loop()));
        runtime.load_str(SCENE).unwrap();
        let summary = runtime.run_frames(3, 60.0);
        assert_eq!(summary.frames, 3);
        assert_eq!(hits.get(), 3);

        // A second runtime on the same thread picks up the loop's clock.
        let mut again = Runtime::new();
        assert_eq!(again.run_frames(2, 60.0).skipped, 0);
        assert_eq!(hits.get(), 5);
        crate::frame_loop::reset();
    }

    #[test]
    fn stale_ticks_are_skipped() {
        let (mut runtime, _) = recording_runtime();
        assert!(runtime.tick(16.0).is_some());
        assert!(runtime.tick(16.0).is_none());
        assert!(runtime.tick(8.0).is_none());
        assert_eq!(runtime.frame_loop().frames(), 1);
    }

    #[test]
    fn borrowed_document_is_reported_not_panicked() {
        let (mut runtime, _) = recording_runtime();
        runtime.load_str(SCENE).unwrap();
        let document = runtime.document().clone();
        let _guard = document.borrow();
        let report = runtime.tick(16.0).unwrap();
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn from_project_reads_main_document() {
        let dir = std::env::temp_dir().join(format!("goml_runtime_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("main.goml"), SCENE).unwrap();

        let settings = ProjectSettings::from_toml_str(
            "[project]\nname = \"Demo\"\nmain_document = \"main.goml\"\n",
        )
        .unwrap();
        let runtime = Runtime::from_project(Project::from_settings(&dir, settings)).unwrap();
        assert_eq!(runtime.project().map(Project::name), Some("Demo"));
        assert!(runtime.document().borrow().get_element_by_id("eye").is_some());

        std::fs::remove_dir_all(&dir).ok();
    }
}
