//! Two-pass queue executor.
//!
//! A run walks the queue twice through the same per-entry pipeline. The
//! pre-check pass validates everything, prompts the user where needed and
//! never renders; the commit pass renders. Keeping one pipeline for both
//! passes is what guarantees pre-check and commit cannot diverge on what
//! counts as a valid entry.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{Local, NaiveDateTime};

use crate::config::RenderSettings;
use crate::entries::{is_default_field, RenderEntry, RenderQueue};
use crate::host::{
    error_log, CameraInfo, FrameRender, RenderGlobals, RenderHost, RenderSignal, UserPrompt,
};
use crate::logging::RunLogger;
use crate::models::SceneConfigRef;

use super::errors::{EntryError, EntryResult};
use super::frames;
use super::output::{self, FramePath, OutputTarget};
use super::preflight;
use super::scope::GlobalsScope;
use super::template::{self, ResolvedName, TemplateValues};
use super::types::{
    EntryReport, EntryStatus, FrameOutcome, FrameReport, QueueOutcome, RunMode, RunReport,
};

/// Drives one queue run against a host.
///
/// The executor borrows the host and prompt for the duration of the run;
/// it keeps no state between runs.
pub struct QueueExecutor<'a> {
    host: &'a mut dyn RenderHost,
    prompt: &'a dyn UserPrompt,
    settings: RenderSettings,
    logger: Arc<RunLogger>,
}

/// Per-pass values threaded through the entry pipeline.
struct PassContext<'a> {
    mode: RunMode,
    /// Output-name timestamp, fixed once per run.
    stamp: &'a str,
    default_dir: &'a Path,
    project_root: &'a Path,
    /// Renderable-entry count from pre-check, for commit progress lines.
    expected: usize,
}

/// An entry after validation, ready to render.
struct ResolvedEntry {
    camera: CameraInfo,
    frames: Vec<i32>,
    range_display: String,
    width: u32,
    height: u32,
    pixel_aspect: f32,
    resolution_display: String,
    scene_config: String,
    name: String,
    target: OutputTarget,
}

impl<'a> QueueExecutor<'a> {
    pub fn new(
        host: &'a mut dyn RenderHost,
        prompt: &'a dyn UserPrompt,
        settings: RenderSettings,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            host,
            prompt,
            settings,
            logger,
        }
    }

    /// Run the whole queue: pre-check first, then commit.
    ///
    /// The commit pass only starts when pre-check found no errors, the user
    /// accepted every warning, and at least one entry has work to do.
    pub fn run(&mut self, queue: &RenderQueue) -> RunReport {
        let stamp = output::run_stamp(Local::now());
        let default_dir = queue.default_output_dir(&*self.host);
        let project_root = self.host.project_root();

        self.logger.info("Starting render pre-check...");
        let pass_started = Local::now().naive_local();
        let precheck = self.run_pass(
            queue,
            &PassContext {
                mode: RunMode::Precheck,
                stamp: &stamp,
                default_dir: &default_dir,
                project_root: &project_root,
                expected: 0,
            },
        );
        self.logger.debug(&format!(
            "Pre-check took {}.",
            format_elapsed(pass_started, Local::now().naive_local())
        ));
        match precheck.outcome {
            QueueOutcome::Declined | QueueOutcome::PrecheckFailed => return precheck,
            _ => {}
        }
        if precheck.would_render == 0 {
            let mut report = precheck;
            report.outcome = QueueOutcome::NothingToRender;
            return report;
        }

        self.logger.info("Starting batch render...");
        let pass_started = Local::now().naive_local();
        let mut report = self.run_pass(
            queue,
            &PassContext {
                mode: RunMode::Commit,
                stamp: &stamp,
                default_dir: &default_dir,
                project_root: &project_root,
                expected: precheck.would_render,
            },
        );
        report.would_render = precheck.would_render;
        self.logger.debug(&format!(
            "Render pass took {}.",
            format_elapsed(pass_started, Local::now().naive_local())
        ));
        report
    }

    /// Walk every entry once in the given mode.
    fn run_pass(&mut self, queue: &RenderQueue, ctx: &PassContext<'_>) -> RunReport {
        let mut report = RunReport::new(QueueOutcome::Completed);

        let preflight = preflight::check(&mut *self.host, &self.settings.expected_renderer);
        if let Some(warning) = &preflight.warning {
            if ctx.mode.is_precheck() {
                let message = format!("{warning}. Do you want to proceed?");
                if !self.prompt.confirm("Warning!", &message) {
                    if preflight.close_render_settings {
                        self.host.close_render_settings();
                    }
                    report.outcome = QueueOutcome::Declined;
                    return report;
                }
            } else {
                self.logger.warn(warning);
            }
        }

        let mut error_found = false;
        let mut aborted = false;
        let mut progress = 0usize;
        let mut canceled_frames = 0usize;

        self.logger.indent();
        for (index, entry) in queue.entries().iter().enumerate() {
            if !entry.enabled {
                report.entries.push(EntryReport::skipped(index, &entry.name));
                continue;
            }
            if ctx.mode.is_precheck() {
                self.logger
                    .info(&format!("Checking: [{}] {}", index + 1, entry.name));
            }

            self.logger.indent();
            let outcome = self.run_entry(entry, index, ctx, &mut progress, &mut canceled_frames);
            self.logger.dedent();

            match outcome {
                Ok(entry_report) => {
                    report.entries.push(entry_report);
                }
                Err(err) => {
                    self.logger.error(&err.to_string());
                    error_found = true;
                    let status = if err.is_user_cancel() {
                        EntryStatus::Canceled
                    } else if ctx.mode.is_precheck() {
                        EntryStatus::CheckedError
                    } else {
                        EntryStatus::Failed
                    };
                    report
                        .entries
                        .push(EntryReport::errored(index, &entry.name, status, err.to_string()));
                    continue;
                }
            }

            if !ctx.mode.is_precheck() && self.cancel_threshold_reached(canceled_frames) {
                aborted = true;
                self.logger.reset_indent();
                self.logger.warn("Canceled render queue!");
                break;
            }
        }
        self.logger.reset_indent();

        if preflight.close_render_settings {
            self.host.close_render_settings();
        }

        report.canceled_frames = canceled_frames;
        report.would_render = report
            .entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::CheckedOk)
            .count();
        report.outcome = self.pass_outcome(ctx.mode, &report, error_found, aborted);
        report
    }

    fn pass_outcome(
        &self,
        mode: RunMode,
        report: &RunReport,
        error_found: bool,
        aborted: bool,
    ) -> QueueOutcome {
        if mode.is_precheck() {
            return if error_found {
                self.logger.error("Error(s) found. Canceled render!");
                QueueOutcome::PrecheckFailed
            } else {
                self.logger.info("No errors found!");
                QueueOutcome::Completed
            };
        }
        if aborted {
            return QueueOutcome::Aborted;
        }
        self.logger.info("Rendering done!");
        let clean = !error_found
            && report.entries.iter().all(|entry| {
                entry
                    .frames
                    .iter()
                    .all(|frame| frame.outcome == FrameOutcome::Rendered)
            });
        if clean {
            QueueOutcome::Completed
        } else {
            QueueOutcome::CompletedWithErrors
        }
    }

    /// Process one entry inside a globals scope.
    ///
    /// Whatever happens in between, the host's render globals go back to
    /// their pre-entry values before this returns.
    fn run_entry(
        &mut self,
        entry: &RenderEntry,
        index: usize,
        ctx: &PassContext<'_>,
        progress: &mut usize,
        canceled_frames: &mut usize,
    ) -> EntryResult<EntryReport> {
        let camera = self
            .host
            .camera_by_identity(&entry.camera_id)
            .ok_or_else(|| EntryError::camera_not_found(&entry.camera_name))?;
        let frame_list = frames::resolve(&entry.frame_range, &self.host.time_output())?;

        let scope = GlobalsScope::capture(&*self.host);
        let saved = scope.saved();
        let result = match self.resolve_entry(entry, ctx, camera, frame_list, saved) {
            Ok(resolved) => Ok(self.process_frames(entry, index, ctx, &resolved, progress, canceled_frames)),
            Err(err) => Err(err),
        };
        scope.restore(&mut *self.host);
        result
    }

    /// Apply the entry's overrides and validate everything but the render.
    fn resolve_entry(
        &mut self,
        entry: &RenderEntry,
        ctx: &PassContext<'_>,
        camera: CameraInfo,
        frame_list: Vec<i32>,
        saved: RenderGlobals,
    ) -> EntryResult<ResolvedEntry> {
        let range_display = frames::display(&frame_list);

        let (width, height) = if is_default_field(&entry.resolution) {
            (saved.width, saved.height)
        } else {
            let (width, height) = parse_resolution(&entry.resolution)?;
            self.host.set_render_resolution(width, height);
            (width, height)
        };
        let resolution_display = format!("{width}x{height}");

        let pixel_aspect = if is_default_field(&entry.pixel_aspect) {
            saved.pixel_aspect
        } else {
            let value = parse_pixel_aspect(&entry.pixel_aspect)?;
            self.host.set_pixel_aspect(value);
            value
        };

        // Scene and preset selections load before the name resolves, since
        // the template can reference their values.
        let scene_config = self.activate_scene_config(&entry.scene_config)?;
        self.load_render_preset(&entry.render_preset)?;
        self.load_layer_preset(&entry.layer_preset)?;

        let values = TemplateValues {
            camera: template::strip_camera_suffix(
                &camera.name,
                &self.settings.physical_camera_suffix,
            ),
            scene_config: scene_config.clone(),
            render_preset: entry.render_preset.clone(),
            layer_preset: entry.layer_preset.clone(),
            resolution: resolution_display.clone(),
            pixel_aspect: entry.pixel_aspect.clone(),
        };
        let resolved_name = template::resolve(&entry.name, &values);
        if resolved_name.blank_values && ctx.mode.is_precheck() {
            self.confirm_blank_name(&resolved_name)?;
        }
        template::validate(&resolved_name.name)?;

        let target = output::resolve_target(
            &entry.output_path,
            &resolved_name.name,
            ctx.default_dir,
            ctx.project_root,
        )?;

        Ok(ResolvedEntry {
            camera,
            frames: frame_list,
            range_display,
            width,
            height,
            pixel_aspect,
            resolution_display,
            scene_config,
            name: resolved_name.name,
            target,
        })
    }

    /// Walk the entry's frames: probe output names, and render in commit.
    fn process_frames(
        &mut self,
        entry: &RenderEntry,
        index: usize,
        ctx: &PassContext<'_>,
        resolved: &ResolvedEntry,
        progress: &mut usize,
        canceled_frames: &mut usize,
    ) -> EntryReport {
        *progress += 1;

        if ctx.mode.is_precheck() {
            // Output names are still probed so near-duplicates surface
            // before anything renders.
            for frame in resolved.frames.iter().copied() {
                self.probe_frame(&resolved.target, frame, ctx);
            }
            return EntryReport::finished(index, &entry.name, EntryStatus::CheckedOk, Vec::new());
        }

        self.logger.info(&format!(
            "Rendering: [{}] ({}/{}) {} | {} | {} | {} | {} | {} | {} | {}",
            index + 1,
            *progress,
            ctx.expected,
            resolved.name,
            resolved.camera.name,
            resolved.resolution_display,
            resolved.range_display,
            resolved.pixel_aspect,
            resolved.scene_config,
            entry.render_preset,
            entry.layer_preset,
        ));

        let total = resolved.frames.len();
        let mut reports = Vec::with_capacity(total);
        self.logger.indent();
        for (position, frame) in resolved.frames.iter().copied().enumerate() {
            let exr = output::unique_frame_path(&resolved.target.exr, frame, ctx.stamp);
            let png = output::unique_frame_path(&resolved.target.png, frame, ctx.stamp);
            let file_name = exr
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.logger.info(&format!(
                "Rendering frame {frame} ({}/{total}) {file_name}",
                position + 1
            ));

            self.logger.indent();
            let frame_report = self.render_frame(resolved, frame, &exr.path, &png.path);
            self.logger.dedent();

            if frame_report.outcome == FrameOutcome::Canceled {
                *canceled_frames += 1;
            }
            reports.push(frame_report);

            if self.cancel_threshold_reached(*canceled_frames) {
                break;
            }
        }
        self.logger.dedent();

        let status = entry_status(&reports);
        EntryReport::finished(index, &entry.name, status, reports)
    }

    /// Render one frame and classify the result.
    fn render_frame(
        &mut self,
        resolved: &ResolvedEntry,
        frame: i32,
        exr: &Path,
        png: &Path,
    ) -> FrameReport {
        let started = Local::now().naive_local();
        let request = FrameRender {
            camera: resolved.camera.handle,
            frame,
            width: resolved.width,
            height: resolved.height,
            pixel_aspect: resolved.pixel_aspect,
            output: exr.to_path_buf(),
        };
        let signal = self.host.render_frame(&request);
        let elapsed = format_elapsed(started, Local::now().naive_local());

        match signal {
            Err(source) => {
                let detail = self
                    .host_log_error(started)
                    .unwrap_or_else(|| source.to_string());
                self.logger.error(&format!("Render failed! Elapsed time: {elapsed}"));
                self.logger.error(&detail);
                FrameReport::failed(frame, exr, detail)
            }
            Ok(RenderSignal::Canceled) => {
                // An error in the host's log at or after render start means
                // the render died, not that the user backed out.
                if let Some(detail) = self.host_log_error(started) {
                    self.logger.error(&format!("Render failed! Elapsed time: {elapsed}"));
                    self.logger.error(&detail);
                    return FrameReport::failed(frame, exr, detail);
                }
                self.logger.warn(&format!("Render was canceled! Elapsed time: {elapsed}"));
                FrameReport::canceled(frame)
            }
            Ok(RenderSignal::Completed) => {
                if !exr.exists() {
                    let detail = self
                        .host_log_error(started)
                        .unwrap_or_else(|| "Output file missing!".to_string());
                    self.logger.error(&format!("Render failed! Elapsed time: {elapsed}"));
                    self.logger.error(&detail);
                    return FrameReport::failed(frame, exr, detail);
                }
                if let Some(age) = file_age_secs(exr) {
                    if age >= self.settings.stale_after_secs {
                        self.logger.warn(&format!(
                            "Output file is {age}s old; it may not have been written by this render."
                        ));
                    }
                }
                if let Err(source) = self.host.save_preview(png) {
                    self.logger
                        .warn(&format!("Couldn't save the preview image: {source}"));
                }
                self.logger
                    .success(&format!("Image rendered successfully! Elapsed time: {elapsed}"));
                self.logger.info(&format!("Output path: {}", exr.display()));
                FrameReport::rendered(frame, exr)
            }
        }
    }

    fn activate_scene_config(&mut self, field: &str) -> EntryResult<String> {
        match SceneConfigRef::parse(field) {
            Ok(None) => Ok(String::new()),
            Ok(Some(config)) => {
                self.host
                    .activate_scene_config(&config)
                    .map_err(|_| EntryError::scene_config_not_found(field))?;
                Ok(config.name)
            }
            Err(_) => Err(EntryError::scene_config_not_found(field)),
        }
    }

    fn load_render_preset(&mut self, field: &str) -> EntryResult<()> {
        if field.is_empty() {
            return Ok(());
        }
        let path = self.host.render_presets_dir().join(field);
        self.host
            .load_render_preset(&path)
            .map_err(|source| EntryError::host("loading render preset", source))
    }

    fn load_layer_preset(&mut self, field: &str) -> EntryResult<()> {
        if field.is_empty() {
            return Ok(());
        }
        let path = self.host.layer_presets_dir().join(field);
        self.host
            .load_layer_preset(&path)
            .map_err(|source| EntryError::host("loading layer preset", source))
    }

    fn confirm_blank_name(&self, resolved: &ResolvedName) -> EntryResult<()> {
        let message = format!(
            "Some of the replacement values in the render name are blank or default. \
             This may result in odd file names.\n\n\
             Original render name: {}\nRender name: {}\n\nDo you want to proceed?",
            resolved.original, resolved.name
        );
        if self.prompt.confirm("Warning!", &message) {
            Ok(())
        } else {
            Err(EntryError::blank_name_declined(&resolved.original))
        }
    }

    fn probe_frame(&self, target: &OutputTarget, frame: i32, ctx: &PassContext<'_>) {
        for base in [&target.exr, &target.png] {
            let allocated = output::unique_frame_path(base, frame, ctx.stamp);
            if allocated.collisions > 0 {
                self.notify_collision(&allocated);
            }
        }
    }

    fn notify_collision(&self, allocated: &FramePath) {
        let new_name = allocated
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let message = format!(
            "An image with the same name already exists. A number will be appended \
             to the end of the file name to prevent overwriting. If this is not the \
             desired result, move or rename the existing file.\n\
             Original name: {}\nNew name:      {new_name}",
            allocated.first_candidate.display()
        );
        self.prompt.notify("Image already exists!", &message);
    }

    fn host_log_error(&self, since: NaiveDateTime) -> Option<String> {
        let path = self.host.error_log_path();
        error_log::first_error_since(&path, since)
    }

    fn cancel_threshold_reached(&self, canceled_frames: usize) -> bool {
        let threshold = self.settings.cancel_threshold as usize;
        threshold > 0 && canceled_frames >= threshold
    }
}

fn entry_status(frame_reports: &[FrameReport]) -> EntryStatus {
    if frame_reports
        .iter()
        .any(|frame| frame.outcome == FrameOutcome::Failed)
    {
        EntryStatus::Failed
    } else if frame_reports
        .iter()
        .any(|frame| frame.outcome == FrameOutcome::Canceled)
    {
        EntryStatus::Canceled
    } else {
        EntryStatus::Rendered
    }
}

fn parse_resolution(field: &str) -> EntryResult<(u32, u32)> {
    let error = || EntryError::parse("resolution", format!("expected WxH, got '{field}'"));
    let (width, height) = field.trim().split_once('x').ok_or_else(error)?;
    let width = width.trim().parse::<u32>().map_err(|_| error())?;
    let height = height.trim().parse::<u32>().map_err(|_| error())?;
    Ok((width, height))
}

fn parse_pixel_aspect(field: &str) -> EntryResult<f32> {
    field.trim().parse::<f32>().map_err(|_| {
        EntryError::parse("pixel aspect", format!("expected a number, got '{field}'"))
    })
}

fn file_age_secs(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    SystemTime::now()
        .duration_since(modified)
        .ok()
        .map(|age| age.as_secs())
}

fn format_elapsed(started: NaiveDateTime, ended: NaiveDateTime) -> String {
    let seconds = (ended - started).num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use parking_lot::Mutex;
    use tempfile::TempDir;

    use crate::host::testing::{RecordingPrompt, ScriptedHost};
    use crate::host::HostError;
    use crate::logging::{LogConfig, RunLoggerBuilder};
    use crate::models::{NodeId, SceneConfigKind};

    use super::*;

    fn test_logger(dir: &Path) -> Arc<RunLogger> {
        Arc::new(
            RunLoggerBuilder::new("run", dir.join("logs"))
                .config(LogConfig::debug())
                .build()
                .unwrap(),
        )
    }

    fn run_queue(
        host: &mut ScriptedHost,
        prompt: &RecordingPrompt,
        settings: RenderSettings,
        queue: &RenderQueue,
        dir: &Path,
    ) -> RunReport {
        let logger = test_logger(dir);
        let mut executor = QueueExecutor::new(host, prompt, settings, logger);
        executor.run(queue)
    }

    #[test]
    fn full_run_renders_every_frame() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam_a = host.add_camera("CamA");
        let cam_b = host.add_camera("CamB");

        let mut queue = RenderQueue::in_memory();
        let mut first = RenderEntry::new(cam_a, "CamA");
        first.frame_range = "1:2".to_string();
        let mut second = RenderEntry::new(cam_b, "CamB");
        second.frame_range = "7:7".to_string();
        queue.add(first);
        queue.add(second);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Completed);
        assert_eq!(report.would_render, 2);
        assert_eq!(report.rendered_frames(), 3);
        assert_eq!(host.renders.len(), 3);
        assert_eq!(host.previews.len(), 3);
        for entry in &report.entries {
            assert_eq!(entry.status, EntryStatus::Rendered);
            for frame in &entry.frames {
                assert!(frame.output.as_ref().unwrap().exists());
            }
        }
        // Default names resolve to the camera name.
        let first_output = host.renders[0].output.file_name().unwrap().to_string_lossy().into_owned();
        assert!(first_output.starts_with("CamA_0001_"), "{first_output}");
        // Both passes opened and then closed the settings panel.
        assert_eq!(host.opens, 2);
        assert_eq!(host.closes, 2);
        assert_eq!(prompt.question_count(), 0);
    }

    #[test]
    fn precheck_surveys_every_entry_before_failing() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam_a = host.add_camera("CamA");
        let cam_b = host.add_camera("CamB");

        let mut queue = RenderQueue::in_memory();
        queue.add(RenderEntry::new(cam_a, "CamA"));
        queue.add(RenderEntry::new(NodeId::generate(), "Ghost"));
        queue.add(RenderEntry::new(cam_b, "CamB"));

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::PrecheckFailed);
        assert_eq!(report.would_render, 2);
        assert!(host.renders.is_empty());
        let statuses: Vec<_> = report.entries.iter().map(|entry| entry.status).collect();
        assert_eq!(
            statuses,
            vec![
                EntryStatus::CheckedOk,
                EntryStatus::CheckedError,
                EntryStatus::CheckedOk
            ]
        );
        assert!(report.entries[1].error.as_ref().unwrap().contains("Ghost"));
    }

    #[test]
    fn cancel_threshold_aborts_the_queue() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam_a = host.add_camera("CamA");
        let cam_b = host.add_camera("CamB");
        host.script_next(Ok(RenderSignal::Canceled));
        host.script_next(Ok(RenderSignal::Canceled));

        let mut queue = RenderQueue::in_memory();
        let mut first = RenderEntry::new(cam_a, "CamA");
        first.frame_range = "1:5".to_string();
        queue.add(first);
        queue.add(RenderEntry::new(cam_b, "CamB"));

        let prompt = RecordingPrompt::accepting();
        let original_globals = host.globals;
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Aborted);
        assert_eq!(report.canceled_frames, 2);
        // Frames 3..5 and the second entry never start.
        let attempted: Vec<_> = host.renders.iter().map(|render| render.frame).collect();
        assert_eq!(attempted, vec![1, 2]);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].status, EntryStatus::Canceled);
        // No log entry, so the cancels are the user's, with nothing to report.
        assert!(report.entries[0].frames.iter().all(|frame| frame.detail.is_none()));
        // Cleanup still ran.
        assert_eq!(host.globals, original_globals);
        assert_eq!(host.closes, 2);
    }

    #[test]
    fn threshold_zero_disables_the_queue_abort() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");
        for _ in 0..3 {
            host.script_next(Ok(RenderSignal::Canceled));
        }

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.frame_range = "1:3".to_string();
        queue.add(entry);

        let mut settings = RenderSettings::default();
        settings.cancel_threshold = 0;
        let prompt = RecordingPrompt::accepting();
        let report = run_queue(&mut host, &prompt, settings, &queue, dir.path());

        assert_eq!(report.outcome, QueueOutcome::CompletedWithErrors);
        assert_eq!(report.canceled_frames, 3);
        assert_eq!(host.renders.len(), 3);
    }

    #[test]
    fn overridden_globals_are_restored_between_entries() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.resolution = "800x600".to_string();
        entry.pixel_aspect = "2.0".to_string();
        queue.add(entry);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Completed);
        // The render itself saw the override.
        assert_eq!(host.renders[0].width, 800);
        assert_eq!(host.renders[0].height, 600);
        assert_eq!(host.renders[0].pixel_aspect, 2.0);
        // The globals do not keep it.
        assert_eq!(host.globals.width, 640);
        assert_eq!(host.globals.height, 480);
        assert_eq!(host.globals.pixel_aspect, 1.0);
    }

    #[test]
    fn blank_template_decline_cancels_the_entry() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.name = "{Camera}_{Scene State}".to_string();
        queue.add(entry);

        // A dismissed prompt counts as "No".
        let prompt = RecordingPrompt::with_answers(vec![None]);
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::PrecheckFailed);
        assert_eq!(report.entries[0].status, EntryStatus::Canceled);
        assert!(report.entries[0].error.as_ref().unwrap().contains("blank"));
        assert_eq!(prompt.question_count(), 1);
        assert!(host.renders.is_empty());
    }

    #[test]
    fn declined_preflight_warning_stops_the_run() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");
        host.toggles.debug_shading = true;

        let mut queue = RenderQueue::in_memory();
        queue.add(RenderEntry::new(cam, "CamA"));

        let prompt = RecordingPrompt::with_answers(vec![Some(1)]);
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Declined);
        assert!(report.entries.is_empty());
        assert!(host.renders.is_empty());
        let questions = prompt.questions.lock();
        assert!(questions[0]
            .1
            .contains("Debug shading is enabled. Do you want to proceed?"));
        // The panel this pass opened was closed again on the way out.
        assert_eq!(host.closes, 1);
    }

    #[test]
    fn nothing_to_render_skips_the_commit_pass() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.enabled = false;
        queue.add(entry);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::NothingToRender);
        assert_eq!(report.entries[0].status, EntryStatus::Skipped);
        assert!(host.renders.is_empty());
        // Only the pre-check pass touched the settings panel.
        assert_eq!(host.opens, 1);
    }

    #[test]
    fn missing_output_directory_fails_precheck() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.output_path = dir
            .path()
            .join("missing")
            .join("shot.exr")
            .to_string_lossy()
            .into_owned();
        queue.add(entry);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::PrecheckFailed);
        assert!(report.entries[0]
            .error
            .as_ref()
            .unwrap()
            .contains("doesn't exist"));
    }

    #[test]
    fn unparsable_overrides_fail_precheck() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut bad_resolution = RenderEntry::new(cam, "CamA");
        bad_resolution.resolution = "very big".to_string();
        let mut bad_aspect = RenderEntry::new(cam, "CamA");
        bad_aspect.pixel_aspect = "wide".to_string();
        queue.add(bad_resolution);
        queue.add(bad_aspect);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::PrecheckFailed);
        assert!(report.entries[0].error.as_ref().unwrap().contains("resolution"));
        assert!(report.entries[1].error.as_ref().unwrap().contains("pixel aspect"));
    }

    #[test]
    fn failed_render_reports_completed_with_errors() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");
        host.script_next(Err(HostError::render("glass fault")));

        let mut queue = RenderQueue::in_memory();
        queue.add(RenderEntry::new(cam, "CamA"));

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::CompletedWithErrors);
        assert_eq!(report.entries[0].status, EntryStatus::Failed);
        let detail = report.entries[0].frames[0].detail.as_ref().unwrap();
        assert!(detail.contains("glass fault"));
    }

    #[test]
    fn canceled_signal_with_log_error_counts_as_failed() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");
        // A crashed render surfaces as a cancel signal plus a log entry.
        host.script_next(Ok(RenderSignal::Canceled));
        fs::write(
            &host.error_log,
            "[2030/Jan/01|00:00:00] error: Frame buffer allocation failed\n",
        )
        .unwrap();

        let mut queue = RenderQueue::in_memory();
        queue.add(RenderEntry::new(cam, "CamA"));

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::CompletedWithErrors);
        assert_eq!(report.entries[0].status, EntryStatus::Failed);
        // It does not count toward the cancel threshold.
        assert_eq!(report.canceled_frames, 0);
        let detail = report.entries[0].frames[0].detail.as_ref().unwrap();
        assert!(detail.contains("Frame buffer allocation failed"));
    }

    #[test]
    fn repeated_frames_get_numbered_suffixes() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");
        host.time_output = crate::host::TimeOutput::Frames {
            spec: "5, 5".to_string(),
        };

        let mut queue = RenderQueue::in_memory();
        queue.add(RenderEntry::new(cam, "CamA"));

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Completed);
        assert_eq!(host.renders.len(), 2);
        let first = host.renders[0].output.file_name().unwrap().to_string_lossy().into_owned();
        let second = host.renders[1].output.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!first.contains("(1)"), "{first}");
        assert!(second.ends_with(" (1).exr"), "{second}");
        assert!(host.renders[0].output.exists());
        assert!(host.renders[1].output.exists());
    }

    #[test]
    fn empty_range_completes_without_rendering() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.frame_range = "10:5".to_string();
        queue.add(entry);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Completed);
        assert_eq!(report.would_render, 1);
        assert_eq!(report.entries[0].status, EntryStatus::Rendered);
        assert!(report.entries[0].frames.is_empty());
        assert!(host.renders.is_empty());
    }

    #[test]
    fn scene_config_and_presets_apply_before_the_name_resolves() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");
        host.scene_configs
            .push(SceneConfigRef::new(SceneConfigKind::StateSet, "Interior"));

        let mut queue = RenderQueue::in_memory();
        let mut entry = RenderEntry::new(cam, "CamA");
        entry.name = "{Camera}_{State Set}".to_string();
        entry.scene_config = "State Set: Interior".to_string();
        entry.render_preset = "draft.rps".to_string();
        entry.layer_preset = "layers.vfbl".to_string();
        queue.add(entry);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::Completed);
        // Both passes ran the side effects.
        assert_eq!(host.activated.len(), 2);
        assert_eq!(host.render_presets_loaded.len(), 2);
        assert_eq!(host.layer_presets_loaded.len(), 2);
        assert_eq!(
            host.render_presets_loaded[0],
            dir.path().join("renderpresets").join("draft.rps")
        );
        let output = host.renders[0].output.file_name().unwrap().to_string_lossy().into_owned();
        assert!(output.starts_with("CamA_Interior_0000_"), "{output}");
    }

    #[test]
    fn unknown_scene_config_fails_the_entry() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        let mut missing = RenderEntry::new(cam, "CamA");
        missing.scene_config = "State Set: Missing".to_string();
        let mut untagged = RenderEntry::new(cam, "CamA");
        untagged.scene_config = "Interior".to_string();
        queue.add(missing);
        queue.add(untagged);

        let prompt = RecordingPrompt::accepting();
        let report = run_queue(
            &mut host,
            &prompt,
            RenderSettings::default(),
            &queue,
            dir.path(),
        );

        assert_eq!(report.outcome, QueueOutcome::PrecheckFailed);
        for entry in &report.entries {
            assert!(entry.error.as_ref().unwrap().contains("does not exist"));
        }
        assert!(report.entries[0]
            .error
            .as_ref()
            .unwrap()
            .contains("State Set: Missing"));
    }

    #[test]
    fn stale_output_warns_but_still_counts_as_success() {
        let dir = TempDir::new().unwrap();
        let mut host = ScriptedHost::new(dir.path());
        let cam = host.add_camera("CamA");

        let mut queue = RenderQueue::in_memory();
        queue.add(RenderEntry::new(cam, "CamA"));

        // A zero threshold makes every freshly written file look stale.
        let mut settings = RenderSettings::default();
        settings.stale_after_secs = 0;

        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = Arc::new(
            RunLoggerBuilder::new("run", dir.path().join("logs"))
                .callback(Box::new(move |line| sink.lock().push(line.to_string())))
                .build()
                .unwrap(),
        );

        let prompt = RecordingPrompt::accepting();
        let mut executor = QueueExecutor::new(&mut host, &prompt, settings, logger);
        let report = executor.run(&queue);

        assert_eq!(report.outcome, QueueOutcome::Completed);
        assert_eq!(report.entries[0].status, EntryStatus::Rendered);
        assert!(lines
            .lock()
            .iter()
            .any(|line| line.contains("may not have been written")));
    }

    #[test]
    fn elapsed_formatting_counts_up() {
        let start = NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let end = NaiveDateTime::parse_from_str("2024-01-01 11:02:03", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(format_elapsed(start, end), "1:02:03");
        assert_eq!(format_elapsed(end, start), "0:00:00");
    }
}
