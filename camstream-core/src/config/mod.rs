//! Configuration types
//!
//! The stream configuration is a context object built once at startup,
//! either from defaults, from a TOML file or from postcard binary data.

pub mod board;
pub mod camera;
#[cfg(feature = "serde")]
pub mod persist;
pub mod stream;
pub mod toml;

pub use board::{BoardVariant, CameraPins, SensorModel};
pub use camera::{CameraConfig, FbLocation, FrameSize, GrabMode, MAX_JPEG_QUALITY};
#[cfg(feature = "serde")]
pub use persist::{decode_config, encode_config, MAX_CONFIG_SIZE};
pub use stream::{ConfigError, StreamConfig, CONFIG_VERSION, DEFAULT_RETRY_DELAY_MS};
pub use toml::{parse_config, ParseError};
