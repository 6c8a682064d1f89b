//! Top-level stream configuration
//!
//! Built once at startup and handed by reference to the bring-up code and
//! the stream loop. There is no global configuration state.

use camstream_hal::UartConfig;
use camstream_protocol::Delimiter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::board::{BoardVariant, SensorModel};
use super::camera::{CameraConfig, MAX_JPEG_QUALITY};

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Delay before retrying after no frame was available
pub const DEFAULT_RETRY_DELAY_MS: u32 = 1000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// JPEG quality above the sensor maximum
    InvalidJpegQuality,
    /// Driver needs at least one frame buffer
    InvalidFbCount,
    /// Sensor clock of zero
    InvalidXclk,
    /// UART baud rate of zero
    InvalidBaudRate,
    /// Retry delay of zero
    InvalidRetryDelay,
    /// GPIO assigned to two camera signals
    PinConflict(u8),
    /// Config version mismatch
    VersionMismatch,
    /// Binary encoding failed
    Serialize,
    /// Binary decoding failed
    Deserialize,
}

/// Complete stream configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Camera board, selects the pin map
    pub board: BoardVariant,
    /// Sensor fitted to the board
    pub sensor: SensorModel,
    /// Capture settings
    pub camera: CameraConfig,
    /// Serial line settings
    pub uart: UartConfig,
    /// Pause after an empty capture before trying again
    pub retry_delay_ms: u32,
    /// Envelope boundary marker
    pub delimiter: Delimiter,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            board: BoardVariant::default(),
            sensor: SensorModel::default(),
            camera: CameraConfig::default(),
            uart: UartConfig::default(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            delimiter: Delimiter::default(),
        }
    }
}

impl StreamConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration for a specific board
    pub fn for_board(board: BoardVariant) -> Self {
        let mut config = Self::default();
        config.board = board;
        config.camera.fb_location = board.default_fb_location();
        config
    }

    /// Check value ranges and the board pin map
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.camera.jpeg_quality > MAX_JPEG_QUALITY {
            return Err(ConfigError::InvalidJpegQuality);
        }
        if self.camera.fb_count == 0 {
            return Err(ConfigError::InvalidFbCount);
        }
        if self.camera.xclk_freq_hz == 0 {
            return Err(ConfigError::InvalidXclk);
        }
        if self.uart.baudrate == 0 {
            return Err(ConfigError::InvalidBaudRate);
        }
        if self.retry_delay_ms == 0 {
            return Err(ConfigError::InvalidRetryDelay);
        }
        if let Some(pin) = self.board.camera_pins().find_duplicate() {
            return Err(ConfigError::PinConflict(pin));
        }
        Ok(())
    }
}
