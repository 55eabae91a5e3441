//! Render queue state management with persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::RenderHost;
use crate::models::NodeId;

use super::types::RenderEntry;

// Table column names, fixed by the persisted format.
const COL_USE: &str = "Use";
const COL_NAME: &str = "Name";
const COL_CAMERA: &str = "Camera";
const COL_OUTPUT: &str = "Output Path";
const COL_RANGE: &str = "Range";
const COL_RESOLUTION: &str = "Resolution";
const COL_PIXEL_ASPECT: &str = "Pixel Aspect";
const COL_SCENE_CONFIG: &str = "Scene State";
const COL_RENDER_PRESET: &str = "Render Preset";
const COL_LAYER_PRESET: &str = "Layer Preset";

/// One table cell: display value plus a hidden value.
///
/// Only the camera column uses the hidden slot (the stable identity);
/// everywhere else it is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Cell(Value, Value);

impl Cell {
    fn text(value: &str) -> Self {
        Cell(Value::String(value.to_string()), Value::Null)
    }

    fn flag(value: bool) -> Self {
        Cell(Value::Bool(value), Value::Null)
    }

    fn with_hidden(value: &str, hidden: String) -> Self {
        Cell(Value::String(value.to_string()), Value::String(hidden))
    }

    fn as_text(&self) -> &str {
        self.0.as_str().unwrap_or("")
    }

    fn as_flag(&self, default: bool) -> bool {
        self.0.as_bool().unwrap_or(default)
    }

    fn hidden_text(&self) -> Option<&str> {
        self.1.as_str()
    }
}

type Row = BTreeMap<String, Cell>;

/// Persistent form of the whole queue.
///
/// This is the record an embedding application stores, whether in a JSON
/// file (see [`RenderQueue::save`]) or inside the host document itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueRecord {
    pub default_output_path: String,
    table_data: Vec<Row>,
}

/// In-memory render queue with file persistence.
#[derive(Debug)]
pub struct RenderQueue {
    /// Entries in queue order.
    entries: Vec<RenderEntry>,
    /// Directory entries with a default output path render into.
    default_output_path: String,
    /// Path to the queue file for persistence.
    queue_file: PathBuf,
}

impl RenderQueue {
    /// Create a queue persisted to the given file, loading it if present.
    ///
    /// The host is needed to re-resolve cameras from their stored
    /// identities.
    pub fn new(queue_file: impl Into<PathBuf>, host: &mut dyn RenderHost) -> Self {
        let queue_file = queue_file.into();

        let mut queue = Self {
            entries: Vec::new(),
            default_output_path: String::new(),
            queue_file,
        };

        if queue.queue_file.exists() {
            match fs::read_to_string(&queue.queue_file) {
                Ok(content) => match serde_json::from_str::<QueueRecord>(&content) {
                    Ok(record) => {
                        queue.apply_record(&record, host);
                        tracing::info!(
                            "Loaded {} entries from {}",
                            queue.entries.len(),
                            queue.queue_file.display()
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse queue file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read queue file: {}", e);
                }
            }
        }

        queue
    }

    /// Create a queue without persistence (for testing).
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            default_output_path: String::new(),
            queue_file: PathBuf::new(),
        }
    }

    /// Persist the queue to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if self.queue_file.as_os_str().is_empty() {
            return Ok(()); // In-memory queue, nothing to save
        }

        // Ensure parent directory exists
        if let Some(parent) = self.queue_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.to_record())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        // Write atomically via temp file
        let temp_file = self.queue_file.with_extension("json.tmp");
        fs::write(&temp_file, &json)?;
        fs::rename(&temp_file, &self.queue_file)?;

        tracing::debug!("Saved {} entries to queue file", self.entries.len());
        Ok(())
    }

    /// Build the persistent record for the current queue state.
    pub fn to_record(&self) -> QueueRecord {
        QueueRecord {
            default_output_path: self.default_output_path.clone(),
            table_data: self.entries.iter().map(entry_to_row).collect(),
        }
    }

    /// Replace the queue contents from a persisted record.
    ///
    /// Cameras resolve by stable identity first and fall back to a name
    /// lookup (with a logged warning) when the identity is stale. A camera
    /// found by neither is kept as-is and will fail when its entry runs.
    pub fn apply_record(&mut self, record: &QueueRecord, host: &mut dyn RenderHost) {
        self.default_output_path = record.default_output_path.clone();
        self.entries = record
            .table_data
            .iter()
            .map(|row| row_to_entry(row, host))
            .collect();
    }

    /// Get all entries.
    pub fn entries(&self) -> &[RenderEntry] {
        &self.entries
    }

    /// Get an entry by index.
    pub fn get(&self, index: usize) -> Option<&RenderEntry> {
        self.entries.get(index)
    }

    /// Get a mutable entry by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut RenderEntry> {
        self.entries.get_mut(index)
    }

    /// Number of entries in the queue.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that will render.
    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }

    /// The queue-level default output directory.
    pub fn default_output_path(&self) -> &str {
        &self.default_output_path
    }

    pub fn set_default_output_path(&mut self, path: impl Into<String>) {
        self.default_output_path = path.into();
    }

    /// The directory default-path entries render into, falling back to the
    /// host's configured render-output directory when unset.
    pub fn default_output_dir(&self, host: &dyn RenderHost) -> PathBuf {
        if self.default_output_path.is_empty() {
            host.render_output_dir()
        } else {
            PathBuf::from(&self.default_output_path)
        }
    }

    /// Add an entry to the queue.
    pub fn add(&mut self, entry: RenderEntry) {
        self.entries.push(entry);
    }

    /// Insert copies of the selected entries right below the selection.
    pub fn duplicate(&mut self, indices: &[usize]) -> usize {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort();
        sorted.retain(|&idx| idx < self.entries.len());

        let copies: Vec<RenderEntry> = sorted
            .iter()
            .filter_map(|&idx| self.entries.get(idx).cloned())
            .collect();
        let count = copies.len();
        let mut at = sorted.last().map_or(self.entries.len(), |&idx| idx + 1);
        for copy in copies {
            self.entries.insert(at, copy);
            at += 1;
        }
        count
    }

    /// Remove entries by indices (in descending order to preserve indices).
    pub fn remove_indices(&mut self, mut indices: Vec<usize>) {
        indices.sort_by(|a, b| b.cmp(a)); // Sort descending
        for idx in indices {
            if idx < self.entries.len() {
                self.entries.remove(idx);
            }
        }
    }

    /// Move selected entries up by one position.
    ///
    /// A selection touching the top row stays put; moving only part of it
    /// would scramble the render order.
    pub fn move_up(&mut self, indices: &[usize]) {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort();

        if sorted.first() == Some(&0) {
            return;
        }
        for &idx in &sorted {
            if idx > 0 && idx < self.entries.len() {
                self.entries.swap(idx, idx - 1);
            }
        }
    }

    /// Move selected entries down by one position.
    ///
    /// A selection touching the bottom row stays put, like `move_up` at
    /// the top.
    pub fn move_down(&mut self, indices: &[usize]) {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|a, b| b.cmp(a)); // Sort descending

        if self.entries.is_empty() || sorted.first() == Some(&(self.entries.len() - 1)) {
            return;
        }
        for &idx in &sorted {
            if idx + 1 < self.entries.len() {
                self.entries.swap(idx, idx + 1);
            }
        }
    }

    /// Clear the queue.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append one default entry per scene camera not already queued.
    ///
    /// Returns the number of entries added.
    pub fn add_missing_cameras(&mut self, host: &mut dyn RenderHost) -> usize {
        let mut added = 0;
        for camera in host.cameras() {
            let id = host.identity_of(camera.handle);
            if self.entries.iter().any(|e| e.camera_id == id) {
                continue;
            }
            self.entries.push(RenderEntry::new(id, camera.name));
            added += 1;
        }
        added
    }

    /// Append one entry per camera and scene-configuration pair.
    ///
    /// Each added entry names itself `{Camera}_{State Set}` so renders from
    /// the same camera under different configurations stay distinct.
    /// Returns the number of entries added.
    pub fn add_camera_config_combos(&mut self, host: &mut dyn RenderHost) -> usize {
        let configs = host.scene_configs();
        let mut added = 0;
        for camera in host.cameras() {
            let id = host.identity_of(camera.handle);
            for config in &configs {
                let mut entry = RenderEntry::new(id, camera.name.clone());
                entry.name = "{Camera}_{State Set}".to_string();
                entry.scene_config = config.tagged();
                self.entries.push(entry);
                added += 1;
            }
        }
        added
    }
}

/// Serialize one entry as a table row.
fn entry_to_row(entry: &RenderEntry) -> Row {
    let mut row = Row::new();
    row.insert(COL_USE.to_string(), Cell::flag(entry.enabled));
    row.insert(COL_NAME.to_string(), Cell::text(&entry.name));
    row.insert(
        COL_CAMERA.to_string(),
        Cell::with_hidden(&entry.camera_name, entry.camera_id.to_string()),
    );
    row.insert(COL_OUTPUT.to_string(), Cell::text(&entry.output_path));
    row.insert(COL_RANGE.to_string(), Cell::text(&entry.frame_range));
    row.insert(COL_RESOLUTION.to_string(), Cell::text(&entry.resolution));
    row.insert(COL_PIXEL_ASPECT.to_string(), Cell::text(&entry.pixel_aspect));
    row.insert(COL_SCENE_CONFIG.to_string(), Cell::text(&entry.scene_config));
    row.insert(
        COL_RENDER_PRESET.to_string(),
        Cell::text(&entry.render_preset),
    );
    row.insert(COL_LAYER_PRESET.to_string(), Cell::text(&entry.layer_preset));
    row
}

/// Rebuild one entry from a table row, re-resolving its camera.
fn row_to_entry(row: &Row, host: &mut dyn RenderHost) -> RenderEntry {
    let text = |col: &str| row.get(col).map(|c| c.as_text().to_string()).unwrap_or_default();

    let display_name = text(COL_CAMERA);
    let stored_id: Option<NodeId> = row
        .get(COL_CAMERA)
        .and_then(|c| c.hidden_text())
        .and_then(|s| s.parse().ok());

    let (camera_id, camera_name) = resolve_camera(stored_id, &display_name, host);

    let mut entry = RenderEntry::new(camera_id, camera_name);
    entry.enabled = row
        .get(COL_USE)
        .map(|c| c.as_flag(true))
        .unwrap_or(true);
    entry.name = text(COL_NAME);
    entry.output_path = text(COL_OUTPUT);
    entry.frame_range = text(COL_RANGE);
    entry.resolution = text(COL_RESOLUTION);
    entry.pixel_aspect = text(COL_PIXEL_ASPECT);
    entry.scene_config = text(COL_SCENE_CONFIG);
    entry.render_preset = text(COL_RENDER_PRESET);
    entry.layer_preset = text(COL_LAYER_PRESET);
    entry
}

/// Resolve a stored camera reference against the open document.
fn resolve_camera(
    stored_id: Option<NodeId>,
    display_name: &str,
    host: &mut dyn RenderHost,
) -> (NodeId, String) {
    if let Some(id) = stored_id {
        if let Some(info) = host.camera_by_identity(&id) {
            return (id, info.name);
        }
    }

    if let Some(info) = host.camera_by_name(display_name) {
        tracing::warn!("Found \"{}\" by name instead of internal ID.", display_name);
        let repaired = host.identity_of(info.handle);
        return (repaired, info.name);
    }

    tracing::error!("Can't find camera \"{}\" in the scene.", display_name);
    (
        stored_id.unwrap_or_else(NodeId::nil),
        display_name.to_string(),
    )
}
