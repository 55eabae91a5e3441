//! Scripted host and prompt doubles shared by the crate's tests.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::models::{NodeId, SceneConfigRef};

use super::errors::{HostError, HostResult};
use super::traits::{RenderHost, UserPrompt};
use super::types::{
    CameraHandle, CameraInfo, DeveloperToggles, FrameRender, RenderGlobals, RenderSignal,
    TimeOutput,
};

/// In-memory host whose render calls follow a script.
///
/// Camera handles are indices into the camera list. Unless a script says
/// otherwise, every render completes and writes its output file, which is
/// what the engine's file-exists check expects.
pub(crate) struct ScriptedHost {
    pub cameras: Vec<(NodeId, String)>,
    pub time_output: TimeOutput,
    pub globals: RenderGlobals,
    pub scene_configs: Vec<SceneConfigRef>,
    pub renderer: String,
    pub toggles: DeveloperToggles,
    pub settings_open: bool,
    pub project_root: PathBuf,
    pub output_dir: PathBuf,
    pub error_log: PathBuf,
    /// Scripted outcomes, consumed one per render call; empty means Completed.
    pub script: VecDeque<HostResult<RenderSignal>>,
    /// Create the output file when a render completes.
    pub write_outputs: bool,

    // Call records inspected by tests.
    pub renders: Vec<FrameRender>,
    pub previews: Vec<PathBuf>,
    pub activated: Vec<SceneConfigRef>,
    pub render_presets_loaded: Vec<PathBuf>,
    pub layer_presets_loaded: Vec<PathBuf>,
    pub resolution_sets: Vec<(u32, u32)>,
    pub aspect_sets: Vec<f32>,
    pub commits: u32,
    pub opens: u32,
    pub closes: u32,
}

impl ScriptedHost {
    pub fn new(root: &Path) -> Self {
        let output_dir = root.join("renders");
        fs::create_dir_all(&output_dir).unwrap();
        Self {
            cameras: Vec::new(),
            time_output: TimeOutput::Single { frame: 0 },
            globals: RenderGlobals {
                width: 640,
                height: 480,
                pixel_aspect: 1.0,
            },
            scene_configs: Vec::new(),
            renderer: "V-Ray 6 Hotfix 3".to_string(),
            toggles: DeveloperToggles::default(),
            settings_open: false,
            project_root: root.to_path_buf(),
            output_dir,
            error_log: root.join("vraylog.txt"),
            script: VecDeque::new(),
            write_outputs: true,
            renders: Vec::new(),
            previews: Vec::new(),
            activated: Vec::new(),
            render_presets_loaded: Vec::new(),
            layer_presets_loaded: Vec::new(),
            resolution_sets: Vec::new(),
            aspect_sets: Vec::new(),
            commits: 0,
            opens: 0,
            closes: 0,
        }
    }

    pub fn add_camera(&mut self, name: &str) -> NodeId {
        let id = NodeId::generate();
        self.cameras.push((id, name.to_string()));
        id
    }

    /// Queue one scripted outcome for the next render call.
    pub fn script_next(&mut self, outcome: HostResult<RenderSignal>) {
        self.script.push_back(outcome);
    }

    fn info_at(&self, index: usize) -> CameraInfo {
        CameraInfo::new(CameraHandle(index as u64), self.cameras[index].1.clone())
    }
}

impl RenderHost for ScriptedHost {
    fn cameras(&self) -> Vec<CameraInfo> {
        (0..self.cameras.len()).map(|i| self.info_at(i)).collect()
    }

    fn camera_by_identity(&self, id: &NodeId) -> Option<CameraInfo> {
        self.cameras
            .iter()
            .position(|(cid, _)| cid == id)
            .map(|i| self.info_at(i))
    }

    fn camera_by_name(&self, name: &str) -> Option<CameraInfo> {
        self.cameras
            .iter()
            .position(|(_, cname)| cname == name)
            .map(|i| self.info_at(i))
    }

    fn identity_of(&mut self, camera: CameraHandle) -> NodeId {
        let index = camera.0 as usize;
        let id = self.cameras[index].0;
        let duplicated = self
            .cameras
            .iter()
            .enumerate()
            .any(|(i, (cid, _))| i != index && *cid == id);
        if duplicated {
            let fresh = NodeId::generate();
            self.cameras[index].0 = fresh;
            fresh
        } else {
            id
        }
    }

    fn time_output(&self) -> TimeOutput {
        self.time_output.clone()
    }

    fn render_globals(&self) -> RenderGlobals {
        self.globals
    }

    fn set_render_resolution(&mut self, width: u32, height: u32) {
        self.globals.width = width;
        self.globals.height = height;
        self.resolution_sets.push((width, height));
    }

    fn set_pixel_aspect(&mut self, pixel_aspect: f32) {
        self.globals.pixel_aspect = pixel_aspect;
        self.aspect_sets.push(pixel_aspect);
    }

    fn scene_configs(&self) -> Vec<SceneConfigRef> {
        self.scene_configs.clone()
    }

    fn activate_scene_config(&mut self, config: &SceneConfigRef) -> HostResult<()> {
        if !self.scene_configs.contains(config) {
            return Err(HostError::not_found(config.kind.to_string(), &config.name));
        }
        self.activated.push(config.clone());
        Ok(())
    }

    fn render_presets_dir(&self) -> PathBuf {
        self.project_root.join("renderpresets")
    }

    fn layer_presets_dir(&self) -> PathBuf {
        self.project_root.join("layerpresets")
    }

    fn load_render_preset(&mut self, path: &Path) -> HostResult<()> {
        self.render_presets_loaded.push(path.to_path_buf());
        Ok(())
    }

    fn load_layer_preset(&mut self, path: &Path) -> HostResult<()> {
        self.layer_presets_loaded.push(path.to_path_buf());
        Ok(())
    }

    fn active_renderer(&self) -> String {
        self.renderer.clone()
    }

    fn developer_toggles(&self) -> DeveloperToggles {
        self.toggles
    }

    fn render_settings_open(&self) -> bool {
        self.settings_open
    }

    fn commit_render_settings(&mut self) {
        self.commits += 1;
    }

    fn open_render_settings(&mut self) {
        self.settings_open = true;
        self.opens += 1;
    }

    fn close_render_settings(&mut self) {
        self.settings_open = false;
        self.closes += 1;
    }

    fn project_root(&self) -> PathBuf {
        self.project_root.clone()
    }

    fn render_output_dir(&self) -> PathBuf {
        self.output_dir.clone()
    }

    fn error_log_path(&self) -> PathBuf {
        self.error_log.clone()
    }

    fn render_frame(&mut self, render: &FrameRender) -> HostResult<RenderSignal> {
        self.renders.push(render.clone());
        let outcome = self.script.pop_front().unwrap_or(Ok(RenderSignal::Completed));
        if matches!(outcome, Ok(RenderSignal::Completed)) && self.write_outputs {
            fs::write(&render.output, b"exr").unwrap();
        }
        outcome
    }

    fn save_preview(&mut self, path: &Path) -> HostResult<()> {
        fs::write(path, b"png").unwrap();
        self.previews.push(path.to_path_buf());
        Ok(())
    }
}

/// Prompt double that replays queued answers and records every question.
///
/// Once the queue is empty it keeps answering with the first option.
pub(crate) struct RecordingPrompt {
    answers: Mutex<VecDeque<Option<usize>>>,
    pub questions: Mutex<Vec<(String, String)>>,
}

impl RecordingPrompt {
    pub fn accepting() -> Self {
        Self::with_answers(Vec::new())
    }

    pub fn with_answers(answers: Vec<Option<usize>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.lock().len()
    }
}

impl UserPrompt for RecordingPrompt {
    fn ask(&self, title: &str, message: &str, _options: &[&str]) -> Option<usize> {
        self.questions
            .lock()
            .push((title.to_string(), message.to_string()));
        self.answers.lock().pop_front().unwrap_or(Some(0))
    }
}
