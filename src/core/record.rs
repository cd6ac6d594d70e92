//! The per-image data unit flowing through the engine.

use crate::core::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a record relates to its similarity group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The one image in a group recommended for keeping
    Keeper,
    /// A group member the user can safely discard
    Removable,
    /// Not part of any emitted group
    Unclustered,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Keeper => write!(f, "keeper"),
            Role::Removable => write!(f, "removable"),
            Role::Unclustered => write!(f, "unclustered"),
        }
    }
}

/// One scanned image: identity, measurements, and grouping state.
///
/// The identity half (path, size, dimensions, fingerprint) is fixed at
/// construction. The grouping half (`group_id`, `role`, `selected`) is
/// written by the clustering pass and may be toggled afterwards by a front
/// end; it is plain data, with no notification mechanism attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    path: PathBuf,
    byte_size: u64,
    width: u32,
    height: u32,
    fingerprint: Fingerprint,

    /// Sequential group label, assigned in cluster discovery order from 1
    pub group_id: Option<u32>,
    pub role: Role,
    /// Whether the user currently has this file marked for the sweep.
    /// Removables start selected, keepers never do.
    pub selected: bool,
}

impl ImageRecord {
    pub fn new(
        path: PathBuf,
        byte_size: u64,
        width: u32,
        height: u32,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            path,
            byte_size,
            width,
            height,
            fingerprint,
            group_id: None,
            role: Role::Unclustered,
            selected: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel count of the original image, the primary keeper-selection key
    pub fn total_pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// File name component, for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fingerprint::GridSize;

    fn record(width: u32, height: u32) -> ImageRecord {
        let fp = Fingerprint::of_samples(&[128; 64], GridSize::Standard).unwrap();
        ImageRecord::new(PathBuf::from("/photos/a.png"), 1024, width, height, fp)
    }

    #[test]
    fn new_record_is_unclustered() {
        let rec = record(640, 480);
        assert_eq!(rec.role, Role::Unclustered);
        assert_eq!(rec.group_id, None);
        assert!(!rec.selected);
    }

    #[test]
    fn total_pixels_multiplies_dimensions() {
        assert_eq!(record(640, 480).total_pixels(), 307_200);
        assert_eq!(record(0, 480).total_pixels(), 0);
    }

    #[test]
    fn total_pixels_does_not_overflow_u32() {
        // 100 megapixel panorama: width * height exceeds u32.
        let rec = record(100_000, 50_000);
        assert_eq!(rec.total_pixels(), 5_000_000_000);
    }

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(record(1, 1).file_name(), "a.png");
    }
}
