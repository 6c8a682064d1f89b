//! Board variant descriptors
//!
//! Each supported camera board wires the sensor's parallel bus to different
//! GPIOs. The variant is chosen by configuration at runtime; the streaming
//! loop never looks at it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::camera::FbLocation;

/// Supported camera boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoardVariant {
    /// AI-Thinker ESP32-CAM
    #[default]
    AiThinkerEsp32Cam,
    /// ESP32-WROVER development board with camera header
    Esp32WroverDev,
    /// ESP32-S3-WROOM camera board (octal PSRAM)
    Esp32S3WroomCam,
}

impl BoardVariant {
    /// All known variants
    pub const ALL: [BoardVariant; 3] = [
        BoardVariant::AiThinkerEsp32Cam,
        BoardVariant::Esp32WroverDev,
        BoardVariant::Esp32S3WroomCam,
    ];

    /// Configuration name of this variant
    pub const fn name(self) -> &'static str {
        match self {
            BoardVariant::AiThinkerEsp32Cam => "esp32cam_aithinker",
            BoardVariant::Esp32WroverDev => "esp32_wrover_dev",
            BoardVariant::Esp32S3WroomCam => "esp32s3_wroom_cam",
        }
    }

    /// Look up a variant by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|board| board.name() == name)
    }

    /// Camera pin map for this board
    pub const fn camera_pins(self) -> CameraPins {
        match self {
            BoardVariant::AiThinkerEsp32Cam => CameraPins {
                pwdn: Some(32),
                reset: None,
                xclk: 0,
                sccb_sda: 26,
                sccb_scl: 27,
                data: [5, 18, 19, 21, 36, 39, 34, 35],
                vsync: 25,
                href: 23,
                pclk: 22,
            },
            BoardVariant::Esp32WroverDev => CameraPins {
                pwdn: None,
                reset: None,
                xclk: 21,
                sccb_sda: 26,
                sccb_scl: 27,
                data: [4, 5, 18, 19, 36, 39, 34, 35],
                vsync: 25,
                href: 23,
                pclk: 22,
            },
            BoardVariant::Esp32S3WroomCam => CameraPins {
                pwdn: None,
                reset: None,
                xclk: 15,
                sccb_sda: 4,
                sccb_scl: 5,
                data: [11, 9, 8, 10, 12, 18, 17, 16],
                vsync: 6,
                href: 7,
                pclk: 13,
            },
        }
    }

    /// Where frame buffers live unless configured otherwise
    pub const fn default_fb_location(self) -> FbLocation {
        match self {
            BoardVariant::Esp32S3WroomCam => FbLocation::Psram,
            BoardVariant::AiThinkerEsp32Cam | BoardVariant::Esp32WroverDev => FbLocation::Dram,
        }
    }
}

/// Sensor-side pin assignment
///
/// `None` means the line is not wired; the driver then uses the software
/// alternative (e.g. SCCB soft reset instead of the reset pin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CameraPins {
    /// Power-down pin
    pub pwdn: Option<u8>,
    /// Hardware reset pin
    pub reset: Option<u8>,
    /// Sensor master clock output
    pub xclk: u8,
    /// SCCB (I2C-like) data
    pub sccb_sda: u8,
    /// SCCB clock
    pub sccb_scl: u8,
    /// Parallel data bus, D0 first
    pub data: [u8; 8],
    /// Vertical sync
    pub vsync: u8,
    /// Horizontal reference
    pub href: u8,
    /// Pixel clock
    pub pclk: u8,
}

impl CameraPins {
    /// Every wired GPIO in this map
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.pwdn
            .into_iter()
            .chain(self.reset)
            .chain([self.xclk, self.sccb_sda, self.sccb_scl])
            .chain(self.data)
            .chain([self.vsync, self.href, self.pclk])
    }

    /// First GPIO assigned to more than one signal, if any
    pub fn find_duplicate(&self) -> Option<u8> {
        let mut seen: u64 = 0;
        for pin in self.iter() {
            let bit = 1u64 << (pin % 64);
            if seen & bit != 0 {
                return Some(pin);
            }
            seen |= bit;
        }
        None
    }
}

/// Image sensor models found on the supported boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorModel {
    /// OmniVision OV2640 (2 MP)
    #[default]
    Ov2640,
    /// OmniVision OV3660 (3 MP)
    Ov3660,
    /// OmniVision OV5640 (5 MP)
    Ov5640,
}

impl SensorModel {
    /// Identify a sensor from the product ID it reports over SCCB
    pub const fn from_pid(pid: u16) -> Option<Self> {
        match pid {
            0x26 => Some(SensorModel::Ov2640),
            0x3660 => Some(SensorModel::Ov3660),
            0x5640 => Some(SensorModel::Ov5640),
            _ => None,
        }
    }

    /// Whether images must be mirrored horizontally to appear upright
    pub const fn needs_hmirror(self) -> bool {
        matches!(self, SensorModel::Ov5640)
    }

    /// Configuration name of this model
    pub const fn name(self) -> &'static str {
        match self {
            SensorModel::Ov2640 => "ov2640",
            SensorModel::Ov3660 => "ov3660",
            SensorModel::Ov5640 => "ov5640",
        }
    }

    /// Look up a model by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        [SensorModel::Ov2640, SensorModel::Ov3660, SensorModel::Ov5640]
            .into_iter()
            .find(|model| model.name() == name)
    }
}
