//! Minimal TOML parser for stream configuration
//!
//! Handles only the subset the stream configuration needs. It does NOT
//! support the full TOML spec and needs no allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - `[stream]`, `[camera]` and `[uart]` section headers
//! - String escapes `\n`, `\r`, `\t`, `\\`, `\"` and `\xHH`
//! - Comments (# ...)
//!
//! Unknown keys are ignored so that newer config files still load.
//!
//! ```toml
//! version = 1
//!
//! [stream]
//! retry_delay_ms = 1000
//! delimiter = "\n12345678900STREAM00987654321\n"
//!
//! [camera]
//! board = "esp32cam_aithinker"
//! sensor = "ov2640"
//! frame_size = "vga"
//! jpeg_quality = 12
//!
//! [uart]
//! baud_rate = 115200
//! ```

use heapless::Vec;

use camstream_hal::uart::{DataBits, Parity, StopBits};
use camstream_protocol::{Delimiter, MAX_DELIMITER_LEN};

use super::board::{BoardVariant, SensorModel};
use super::camera::{FbLocation, FrameSize, GrabMode};
use super::stream::{ConfigError, StreamConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a section, a comment, nor `key = value`
    InvalidLine,
    /// Invalid value type or unknown enumeration name
    InvalidValue,
    /// Delimiter empty, too long, or badly escaped
    InvalidDelimiter,
    /// Parsed values failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Stream,
    Camera,
    Uart,
}

/// Parse TOML configuration into a validated StreamConfig
pub fn parse_config(input: &str) -> Result<StreamConfig, ParseError> {
    let mut config = StreamConfig::new();
    let mut section = Section::Root;
    let mut fb_location_set = false;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        if section == Section::Camera && key == "fb_location" {
            fb_location_set = true;
        }
        apply_value(&mut config, section, key, value)?;
    }

    // The board decides buffer placement unless the file says otherwise
    if !fb_location_set {
        config.camera.fb_location = config.board.default_fb_location();
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "stream" => Ok(Section::Stream),
        "camera" => Ok(Section::Camera),
        "uart" => Ok(Section::Uart),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match comment_start(value) {
        Some(hash_pos) => value[..hash_pos].trim(),
        None => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Byte offset of the first `#` that is not inside a string literal
fn comment_start(value: &str) -> Option<usize> {
    let mut open = false;
    let mut escaped = false;
    for (pos, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if open => escaped = true,
            '"' => open = !open,
            '#' if !open => return Some(pos),
            _ => {}
        }
    }
    None
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value, allowing `_` digit separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Decode a quoted string with escapes into raw delimiter bytes
fn parse_delimiter(value: &str) -> Result<Delimiter, ParseError> {
    let raw = parse_string(value)?.as_bytes();
    let mut bytes: Vec<u8, MAX_DELIMITER_LEN> = Vec::new();
    let mut i = 0;

    while i < raw.len() {
        let byte = if raw[i] == b'\\' {
            let escape = raw.get(i + 1).ok_or(ParseError::InvalidDelimiter)?;
            i += 2;
            match escape {
                b'n' => b'\n',
                b'r' => b'\r',
                b't' => b'\t',
                b'\\' => b'\\',
                b'"' => b'"',
                b'x' => {
                    let hex = raw.get(i..i + 2).ok_or(ParseError::InvalidDelimiter)?;
                    i += 2;
                    hex.iter().try_fold(0u8, |acc, &digit| {
                        let value = (digit as char).to_digit(16)?;
                        Some((acc << 4) | value as u8)
                    })
                    .ok_or(ParseError::InvalidDelimiter)?
                }
                _ => return Err(ParseError::InvalidDelimiter),
            }
        } else {
            i += 1;
            raw[i - 1]
        };
        bytes.push(byte).map_err(|_| ParseError::InvalidDelimiter)?;
    }

    Delimiter::new(&bytes).map_err(|_| ParseError::InvalidDelimiter)
}

fn parse_data_bits(value: &str) -> Result<DataBits, ParseError> {
    match parse_int::<u8>(value)? {
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        9 => Ok(DataBits::Nine),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_parity(value: &str) -> Result<Parity, ParseError> {
    match parse_string(value)? {
        "none" => Ok(Parity::None),
        "even" => Ok(Parity::Even),
        "odd" => Ok(Parity::Odd),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_stop_bits(value: &str) -> Result<StopBits, ParseError> {
    match parse_int::<u8>(value)? {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_grab_mode(value: &str) -> Result<GrabMode, ParseError> {
    match parse_string(value)? {
        "latest" => Ok(GrabMode::Latest),
        "when_empty" => Ok(GrabMode::WhenEmpty),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_fb_location(value: &str) -> Result<FbLocation, ParseError> {
    match parse_string(value)? {
        "dram" => Ok(FbLocation::Dram),
        "psram" => Ok(FbLocation::Psram),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    config: &mut StreamConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Root, "version") => config.version = parse_int(value)?,

        (Section::Stream, "retry_delay_ms") => config.retry_delay_ms = parse_int(value)?,
        (Section::Stream, "delimiter") => config.delimiter = parse_delimiter(value)?,

        (Section::Camera, "board") => {
            config.board =
                BoardVariant::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)?
        }
        (Section::Camera, "sensor") => {
            config.sensor =
                SensorModel::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)?
        }
        (Section::Camera, "frame_size") => {
            config.camera.frame_size =
                FrameSize::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)?
        }
        (Section::Camera, "jpeg_quality") => config.camera.jpeg_quality = parse_int(value)?,
        (Section::Camera, "xclk_freq_hz") => config.camera.xclk_freq_hz = parse_int(value)?,
        (Section::Camera, "fb_count") => config.camera.fb_count = parse_int(value)?,
        (Section::Camera, "grab_mode") => config.camera.grab_mode = parse_grab_mode(value)?,
        (Section::Camera, "fb_location") => config.camera.fb_location = parse_fb_location(value)?,

        (Section::Uart, "baud_rate") => config.uart.baudrate = parse_int(value)?,
        (Section::Uart, "data_bits") => config.uart.data_bits = parse_data_bits(value)?,
        (Section::Uart, "parity") => config.uart.parity = parse_parity(value)?,
        (Section::Uart, "stop_bits") => config.uart.stop_bits = parse_stop_bits(value)?,

        // Unknown keys are ignored
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camstream_protocol::DEFAULT_DELIMITER;

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("camera").unwrap(), Section::Camera);
        assert_eq!(parse_section_header(" uart ").unwrap(), Section::Uart);
        assert_eq!(
            parse_section_header("display"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_key_value_strips_comments() {
        assert_eq!(
            parse_key_value("jpeg_quality = 10 # sharper"),
            Some(("jpeg_quality", "10"))
        );
        assert_eq!(
            parse_key_value(r##"delimiter = "#frame#" # marker"##),
            Some(("delimiter", r##""#frame#""##))
        );
        assert_eq!(parse_key_value("= 3"), None);
    }

    #[test]
    fn test_parse_int_with_separators() {
        assert_eq!(parse_int::<u32>("20_000_000"), Ok(20_000_000));
        assert_eq!(parse_int::<u8>("256"), Err(ParseError::InvalidValue));
        assert_eq!(
            parse_int::<u32>("1234567890123456789012345"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_parse_delimiter_escapes() {
        let delim = parse_delimiter(r#""\n12345678900STREAM00987654321\n""#).unwrap();
        assert_eq!(delim.as_bytes(), DEFAULT_DELIMITER);

        let delim = parse_delimiter(r#""\xFF\x00\"\\""#).unwrap();
        assert_eq!(delim.as_bytes(), &[0xFF, 0x00, b'"', b'\\']);

        assert_eq!(parse_delimiter(r#""""#), Err(ParseError::InvalidDelimiter));
        assert_eq!(parse_delimiter(r#""\q""#), Err(ParseError::InvalidDelimiter));
        assert_eq!(parse_delimiter(r#""\x4""#), Err(ParseError::InvalidDelimiter));
    }

    #[test]
    fn test_parse_delimiter_hex_needs_two_digits() {
        assert_eq!(parse_delimiter(r#""\x+F""#), Err(ParseError::InvalidDelimiter));
        assert_eq!(parse_delimiter(r#""\x-1""#), Err(ParseError::InvalidDelimiter));
        assert_eq!(parse_delimiter(r#""\xg0""#), Err(ParseError::InvalidDelimiter));
        let delim = parse_delimiter(r#""\xaB|""#).unwrap();
        assert_eq!(delim.as_bytes(), &[0xAB, b'|']);
    }

    #[test]
    fn test_delimiter_found_in_header_rejected() {
        for value in [r#""\r\n""#, r#"": ""#, r#""e""#, r#""\x30""#] {
            assert_eq!(parse_delimiter(value), Err(ParseError::InvalidDelimiter));
        }
        assert_eq!(
            parse_config("[stream]\ndelimiter = \"\\r\\n\"\n"),
            Err(ParseError::InvalidDelimiter)
        );
    }

    #[test]
    fn test_parse_empty_config_gives_defaults() {
        let config = parse_config("# nothing here\n").unwrap();
        assert_eq!(config, StreamConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
version = 1

[stream]
retry_delay_ms = 250
delimiter = "\r\n--frame--\r\n"

[camera]
board = "esp32s3_wroom_cam"
sensor = "ov5640"
frame_size = "svga"
jpeg_quality = 10
xclk_freq_hz = 10_000_000
fb_count = 2
grab_mode = "when_empty"

[uart]
baud_rate = 921600
parity = "even"
stop_bits = 2
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.retry_delay_ms, 250);
        assert_eq!(config.delimiter.as_bytes(), b"\r\n--frame--\r\n");
        assert_eq!(config.board, BoardVariant::Esp32S3WroomCam);
        assert_eq!(config.sensor, SensorModel::Ov5640);
        assert_eq!(config.camera.frame_size, FrameSize::Svga);
        assert_eq!(config.camera.jpeg_quality, 10);
        assert_eq!(config.camera.xclk_freq_hz, 10_000_000);
        assert_eq!(config.camera.fb_count, 2);
        assert_eq!(config.camera.grab_mode, GrabMode::WhenEmpty);
        // Not set in the file, so the board default applies
        assert_eq!(config.camera.fb_location, FbLocation::Psram);
        assert_eq!(config.uart.baudrate, 921600);
        assert_eq!(config.uart.parity, Parity::Even);
        assert_eq!(config.uart.stop_bits, StopBits::Two);
    }

    #[test]
    fn test_explicit_fb_location_wins() {
        let config = parse_config(
            "[camera]\nboard = \"esp32s3_wroom_cam\"\nfb_location = \"dram\"\n",
        )
        .unwrap();
        assert_eq!(config.camera.fb_location, FbLocation::Dram);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = parse_config("[camera]\nled_flash = true\n").unwrap();
        assert_eq!(config.camera, StreamConfig::default().camera);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            parse_config("[camera]\nboard = \"esp8266\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[camera]\njpeg_quality = 70\n"),
            Err(ParseError::Invalid(ConfigError::InvalidJpegQuality))
        );
        assert_eq!(parse_config("[camera\n"), Err(ParseError::InvalidLine));
        assert_eq!(parse_config("[wifi]\n"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("[uart]\ndata_bits = 6\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[stream]\nretry_delay_ms = 0\n"),
            Err(ParseError::Invalid(ConfigError::InvalidRetryDelay))
        );
    }
}
