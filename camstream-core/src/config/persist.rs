//! Binary configuration storage
//!
//! Configuration is stored as postcard-serialized bytes so it fits in a
//! small flash partition next to the firmware.

use super::stream::{ConfigError, StreamConfig, CONFIG_VERSION};

/// Upper bound on an encoded configuration
pub const MAX_CONFIG_SIZE: usize = 256;

/// Serialize a configuration into `buf`, returning the used prefix
pub fn encode_config<'a>(
    config: &StreamConfig,
    buf: &'a mut [u8],
) -> Result<&'a mut [u8], ConfigError> {
    postcard::to_slice(config, buf).map_err(|_| ConfigError::Serialize)
}

/// Deserialize and validate a configuration
pub fn decode_config(bytes: &[u8]) -> Result<StreamConfig, ConfigError> {
    let config: StreamConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

    if config.version != CONFIG_VERSION {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "config version mismatch: found {}, expected {}",
            config.version,
            CONFIG_VERSION
        );
        return Err(ConfigError::VersionMismatch);
    }

    config.validate()?;
    Ok(config)
}
