//! Synthetic KITTI raw drives for tests.

use std::path::Path;

use tempfile::TempDir;

use crate::kitti_raw::SequenceId;

/// A drive laid out under a temporary root, removed on drop.
pub struct KittiRawFixture {
    temp_dir: TempDir,
    id: SequenceId,
}

impl KittiRawFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let id = SequenceId::new("2011_09_30", "2011_09_30_drive_0018_sync");
        Self { temp_dir, id }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn id(&self) -> &SequenceId {
        &self.id
    }

    /// Write an OXTS record; fields beyond the first six are padded the way
    /// real files carry velocities and accuracies.
    pub fn write_oxts(&self, index: usize, fields: &[f64]) {
        let mut line: Vec<String> = fields.iter().map(|v| v.to_string()).collect();
        line.extend(std::iter::repeat("0".to_string()).take(24));
        self.write_oxts_line(index, &line.join(" "));
    }

    pub fn write_oxts_line(&self, index: usize, line: &str) {
        let path = self.id.oxts_path(self.root(), index);
        write_file(&path, format!("{line}\n").as_bytes());
    }

    pub fn write_velodyne(&self, index: usize, points: &[[f32; 4]], trailing_bytes: usize) {
        let mut bytes: Vec<u8> = points
            .iter()
            .flat_map(|p| p.iter().flat_map(|v| v.to_le_bytes()))
            .collect();
        bytes.extend(std::iter::repeat(0u8).take(trailing_bytes));
        write_file(&self.id.velodyne_path(self.root(), index), &bytes);
    }

    pub fn write_velodyne_timestamps(&self, stamps: &[&str]) {
        let content: String = stamps.iter().map(|s| format!("{s}\n")).collect();
        write_file(&self.id.velodyne_timestamps_path(self.root()), content.as_bytes());
    }
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(path, bytes).expect("Failed to write fixture file");
}
