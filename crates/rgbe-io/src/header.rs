//! Radiance header parsing.
//!
//! A Radiance file starts with ASCII lines:
//!
//! ```text
//! #?RADIANCE
//! FORMAT=32-bit_rle_rgbe
//! EXPOSURE=1.0
//!
//! -Y 512 +X 768
//! <pixel data>
//! ```
//!
//! The header ends at the first blank line followed by a non-blank line
//! (the resolution line) and its newline; pixel data starts right after.
//! Only `-Y <height> +X <width>` images (top-down, left-to-right) are
//! described; other orientation tokens are accepted with a warning and
//! read the same way.

use crate::{HdrError, HdrResult};
use tracing::{debug, warn};

/// Magic prefix of the optional program identifier line.
pub const HDR_MAGIC: &str = "#?";

/// The only pixel format accepted.
pub const FORMAT_RGBE: &str = "32-bit_rle_rgbe";

/// Parsed Radiance header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Pixels per scanline.
    pub width: usize,
    /// Number of scanlines.
    pub height: usize,
    /// Byte offset of the first scanline.
    pub data_offset: usize,
    /// Program identifier from a leading `#?NAME` line.
    pub program: Option<String>,
    /// `FORMAT=` value.
    pub format: String,
    /// Every other `KEY=VALUE` line, in file order.
    pub fields: Vec<(String, String)>,
    /// Resolution line as written.
    pub resolution: String,
}

impl Header {
    /// Values of all fields named `key`, in file order.
    pub fn field_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Last value of the field named `key`.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Combined `EXPOSURE`; repeated lines multiply.
    ///
    /// Unparsable values are ignored. `None` when no line parses.
    pub fn exposure(&self) -> Option<f32> {
        self.field_values("EXPOSURE")
            .filter_map(|v| v.trim().parse::<f32>().ok())
            .fold(None, |acc, v| Some(acc.unwrap_or(1.0) * v))
    }

    /// `GAMMA` field, if present and numeric.
    pub fn gamma(&self) -> Option<f32> {
        self.field("GAMMA").and_then(|v| v.trim().parse().ok())
    }
}

/// Parses the header at the start of `bytes`.
///
/// # Errors
///
/// - [`HdrError::MalformedHeader`] if the terminator is never found or the
///   resolution line does not hold two positive integers in tokens 1 and 3.
/// - [`HdrError::UnsupportedFormat`] if `FORMAT=` is missing or is not
///   `32-bit_rle_rgbe`.
pub fn parse_header(bytes: &[u8]) -> HdrResult<Header> {
    let mut lines = Vec::new();
    let mut pos = 0usize;
    let mut after_blank = false;

    let (resolution, data_offset) = loop {
        let rest = &bytes[pos..];
        let Some(nl) = rest.iter().position(|&b| b == b'\n') else {
            return Err(HdrError::MalformedHeader(
                "header terminator (blank line, resolution line) not found".into(),
            ));
        };
        let line = trim_cr(&rest[..nl]);
        pos += nl + 1;

        if line.is_empty() {
            after_blank = true;
        } else if after_blank {
            break (String::from_utf8_lossy(line).into_owned(), pos);
        } else {
            lines.push(line);
        }
    };

    let mut program = None;
    let mut format = None;
    let mut fields = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        let line = String::from_utf8_lossy(raw);
        if let Some(id) = line.strip_prefix(HDR_MAGIC) {
            if i == 0 {
                program = Some(id.to_string());
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        // Lines without '=' are command history; they carry no fields.
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key == "FORMAT" {
            if format.is_none() {
                format = Some(value.to_string());
            }
        } else {
            fields.push((key.to_string(), value.to_string()));
        }
    }

    let format = match format {
        Some(f) if f == FORMAT_RGBE => f,
        Some(f) => return Err(HdrError::UnsupportedFormat(format!("FORMAT={}", f))),
        None => return Err(HdrError::UnsupportedFormat("no FORMAT= field".into())),
    };

    let (width, height) = parse_resolution(&resolution)?;
    if width.checked_mul(height).and_then(|p| p.checked_mul(4)).is_none() {
        return Err(HdrError::MalformedHeader(format!(
            "resolution {}x{} overflows the address space",
            width, height
        )));
    }

    debug!(width, height, data_offset, program = ?program, fields = fields.len(), "parsed HDR header");

    Ok(Header {
        width,
        height,
        data_offset,
        program,
        format,
        fields,
        resolution,
    })
}

/// Parses `-Y <height> +X <width>` into `(width, height)`.
fn parse_resolution(line: &str) -> HdrResult<(usize, usize)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return Err(HdrError::MalformedHeader(format!(
            "resolution line '{}' does not have 4 tokens",
            line
        )));
    }

    if parts[0] != "-Y" || parts[2] != "+X" {
        warn!(resolution = line, "non-standard orientation, reading as -Y +X");
    }

    let dim = |token: &str, what: &str| -> HdrResult<usize> {
        match token.parse::<i64>() {
            Ok(v) if v > 0 => usize::try_from(v).map_err(|_| {
                HdrError::MalformedHeader(format!("{} {} out of range", what, v))
            }),
            Ok(v) => Err(HdrError::MalformedHeader(format!("{} must be positive, got {}", what, v))),
            Err(_) => Err(HdrError::MalformedHeader(format!(
                "{} '{}' is not an integer",
                what, token
            ))),
        }
    };

    let height = dim(parts[1], "height")?;
    let width = dim(parts[3], "width")?;
    Ok((width, height))
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeErrorKind;

    fn header(text: &str) -> HdrResult<Header> {
        parse_header(text.as_bytes())
    }

    #[test]
    fn test_minimal_header() {
        let text = "#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 3\n";
        let h = header(text).unwrap();
        assert_eq!((h.width, h.height), (3, 2));
        assert_eq!(h.data_offset, text.len());
        assert_eq!(h.program.as_deref(), Some("RADIANCE"));
        assert_eq!(h.format, FORMAT_RGBE);
        assert_eq!(h.resolution, "-Y 2 +X 3");
    }

    #[test]
    fn test_data_offset_excludes_body() {
        let mut bytes = b"FORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n".to_vec();
        let offset = bytes.len();
        bytes.extend_from_slice(&[10, 20, 30, 128, b'\n', b'\n']);
        assert_eq!(parse_header(&bytes).unwrap().data_offset, offset);
    }

    #[test]
    fn test_fields_and_comments() {
        let text = "#?RGBE\n# made by hand\nEXPOSURE=2.0\nSOFTWARE=test\n\
                    pfilt -x /2\nEXPOSURE= 0.5\nGAMMA=2.2\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n";
        let h = header(text).unwrap();
        assert_eq!(h.field("SOFTWARE"), Some("test"));
        assert_eq!(h.exposure(), Some(1.0));
        assert_eq!(h.gamma(), Some(2.2));
        assert_eq!(h.fields.len(), 4);
    }

    #[test]
    fn test_crlf_lines() {
        let h = header("#?RADIANCE\r\nFORMAT=32-bit_rle_rgbe\r\n\r\n-Y 4 +X 5\r\n").unwrap();
        assert_eq!((h.width, h.height), (5, 4));
    }

    #[test]
    fn test_missing_format() {
        let err = header("#?RADIANCE\nEXPOSURE=1\n\n-Y 1 +X 1\n").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_wrong_format() {
        let err = header("FORMAT=32-bit_rle_xyze\n\n-Y 1 +X 1\n").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedFormat);
        // key is case-sensitive
        let err = header("format=32-bit_rle_rgbe\n\n-Y 1 +X 1\n").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_first_format_line_counts() {
        let err = header("FORMAT=32-bit_rle_xyze\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedFormat);
        let h = header("FORMAT=32-bit_rle_rgbe\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 1\n").unwrap();
        assert_eq!(h.format, FORMAT_RGBE);
    }

    #[test]
    fn test_field_takes_last_value() {
        let h = header("SOFTWARE=a\nVIEW=-vf x\nSOFTWARE=b\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1\n").unwrap();
        let key = String::from("SOFTWARE");
        let value = h.field(&key);
        drop(key);
        assert_eq!(value, Some("b"));
        assert_eq!(h.field("VIEW"), Some("-vf x"));
        assert_eq!(h.field("MISSING"), None);
        assert_eq!(h.field_values("SOFTWARE").collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_bad_resolution() {
        for res in ["-Y two +X 3", "-Y 0 +X 3", "-Y 2 +X -3", "-Y 2", "-Y 2 +X 3 extra"] {
            let text = format!("FORMAT=32-bit_rle_rgbe\n\n{}\n", res);
            let err = header(&text).unwrap_err();
            assert_eq!(err.kind(), DecodeErrorKind::MalformedHeader, "{}", res);
        }
    }

    #[test]
    fn test_no_terminator() {
        let err = header("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::MalformedHeader);
        // resolution line without its newline
        let err = header("FORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 1").unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::MalformedHeader);
    }

    #[test]
    fn test_other_orientation_reads_tokens() {
        let h = header("FORMAT=32-bit_rle_rgbe\n\n+Y 6 -X 7\n").unwrap();
        assert_eq!((h.width, h.height), (7, 6));
    }
}
