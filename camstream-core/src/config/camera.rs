//! Camera capture settings
//!
//! Handed to the sensor driver at bring-up. Only JPEG output is supported
//! since the stream announces every payload as `image/jpeg`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest (worst) JPEG quality value the sensor accepts
pub const MAX_JPEG_QUALITY: u8 = 63;

/// Output resolution
///
/// Discriminants match the sensor driver's frame size index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FrameSize {
    R96x96 = 0,
    Qqvga = 1,
    Qcif = 2,
    Hqvga = 3,
    R240x240 = 4,
    Qvga = 5,
    Cif = 6,
    Hvga = 7,
    #[default]
    Vga = 8,
    Svga = 9,
    Xga = 10,
    Hd = 11,
    Sxga = 12,
    Uxga = 13,
}

impl FrameSize {
    const ALL: [FrameSize; 14] = [
        FrameSize::R96x96,
        FrameSize::Qqvga,
        FrameSize::Qcif,
        FrameSize::Hqvga,
        FrameSize::R240x240,
        FrameSize::Qvga,
        FrameSize::Cif,
        FrameSize::Hvga,
        FrameSize::Vga,
        FrameSize::Svga,
        FrameSize::Xga,
        FrameSize::Hd,
        FrameSize::Sxga,
        FrameSize::Uxga,
    ];

    /// Width and height in pixels
    pub const fn dimensions(self) -> (u16, u16) {
        match self {
            FrameSize::R96x96 => (96, 96),
            FrameSize::Qqvga => (160, 120),
            FrameSize::Qcif => (176, 144),
            FrameSize::Hqvga => (240, 176),
            FrameSize::R240x240 => (240, 240),
            FrameSize::Qvga => (320, 240),
            FrameSize::Cif => (400, 296),
            FrameSize::Hvga => (480, 320),
            FrameSize::Vga => (640, 480),
            FrameSize::Svga => (800, 600),
            FrameSize::Xga => (1024, 768),
            FrameSize::Hd => (1280, 720),
            FrameSize::Sxga => (1280, 1024),
            FrameSize::Uxga => (1600, 1200),
        }
    }

    /// Sensor driver frame size index
    pub const fn as_index(self) -> u8 {
        self as u8
    }

    /// Look up a frame size by driver index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Configuration name of this frame size
    pub const fn name(self) -> &'static str {
        match self {
            FrameSize::R96x96 => "96x96",
            FrameSize::Qqvga => "qqvga",
            FrameSize::Qcif => "qcif",
            FrameSize::Hqvga => "hqvga",
            FrameSize::R240x240 => "240x240",
            FrameSize::Qvga => "qvga",
            FrameSize::Cif => "cif",
            FrameSize::Hvga => "hvga",
            FrameSize::Vga => "vga",
            FrameSize::Svga => "svga",
            FrameSize::Xga => "xga",
            FrameSize::Hd => "hd",
            FrameSize::Sxga => "sxga",
            FrameSize::Uxga => "uxga",
        }
    }

    /// Look up a frame size by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.name() == name)
    }
}

/// Which frame the driver hands out when several are buffered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GrabMode {
    /// Fill buffers only when they are empty (oldest frame first)
    WhenEmpty,
    /// Always return the most recent frame
    #[default]
    Latest,
}

/// Frame buffer memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FbLocation {
    /// Internal RAM
    #[default]
    Dram,
    /// External PSRAM (must be enabled for the chip)
    Psram,
}

/// Sensor capture settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraConfig {
    /// Output resolution
    pub frame_size: FrameSize,
    /// JPEG quality, 0-63; lower is better quality and larger frames
    pub jpeg_quality: u8,
    /// Sensor master clock in Hz
    pub xclk_freq_hz: u32,
    /// Number of frame buffers the driver allocates
    pub fb_count: u8,
    /// Buffer hand-out policy
    pub grab_mode: GrabMode,
    /// Buffer memory
    pub fb_location: FbLocation,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_size: FrameSize::Vga,
            jpeg_quality: 12,
            xclk_freq_hz: 20_000_000,
            fb_count: 1,
            grab_mode: GrabMode::Latest,
            fb_location: FbLocation::Dram,
        }
    }
}
