//! Attached display description

use crate::window::Size;
use serde::{Deserialize, Serialize};

/// Snapshot of one attached display
///
/// Produced on the toolkit thread at query time; never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// Name reported by the OS, if any
    pub name: Option<String>,
    /// Size in logical pixels
    pub size: Size,
    /// Size in physical pixels
    pub physical_size: Size,
    /// Ratio between physical and logical pixels
    pub scale_factor: f64,
    /// Whether this is the system's primary display
    pub is_primary: bool,
    /// Whether the focused window is on this display
    pub is_current: bool,
}

impl DisplayInfo {
    /// Build a display description from its physical size and scale factor
    pub fn from_physical(name: Option<String>, physical_size: Size, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        let size = Size::new(
            (physical_size.width as f64 / scale).round() as u32,
            (physical_size.height as f64 / scale).round() as u32,
        );
        Self {
            name,
            size,
            physical_size,
            scale_factor: scale,
            is_primary: false,
            is_current: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_size_from_scale() {
        let info = DisplayInfo::from_physical(None, Size::new(2880, 1800), 2.0);
        assert_eq!(info.size, Size::new(1440, 900));
        assert_eq!(info.physical_size, Size::new(2880, 1800));
    }

    #[test]
    fn test_invalid_scale_falls_back_to_one() {
        let info = DisplayInfo::from_physical(Some("eDP-1".into()), Size::new(1920, 1080), 0.0);
        assert_eq!(info.scale_factor, 1.0);
        assert_eq!(info.size, Size::new(1920, 1080));
    }
}
