//! Base64 VLQ codec for the `mappings` field

use super::{Mappings, OriginalPosition, Segment};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION: i64 = 0b10_0000;
const DIGIT_MASK: i64 = 0b1_1111;

/// Decoding failure, reported with the offending generated line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub line: usize,
    pub message: String,
}

fn digit(byte: u8) -> Option<i64> {
    ALPHABET.iter().position(|&b| b == byte).map(|p| p as i64)
}

fn decode_fields(segment: &str) -> Result<Vec<i64>, String> {
    let mut fields = Vec::with_capacity(5);
    let mut value = 0i64;
    let mut shift = 0u32;

    for byte in segment.bytes() {
        let d = digit(byte).ok_or_else(|| format!("invalid base64 digit '{}'", byte as char))?;
        if shift > 60 {
            return Err("VLQ value overflows 64 bits".to_string());
        }
        value += (d & DIGIT_MASK) << shift;
        if d & CONTINUATION != 0 {
            shift += 5;
            continue;
        }
        let negative = value & 1 == 1;
        value >>= 1;
        fields.push(if negative { -value } else { value });
        value = 0;
        shift = 0;
    }

    if shift != 0 {
        return Err("truncated VLQ value".to_string());
    }
    Ok(fields)
}

fn non_negative(value: i64, what: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{what} out of range: {value}"))
}

/// Decode a `mappings` string into per-line segments
///
/// Segments of each line come back sorted by generated column.
pub fn decode(mappings: &str) -> Result<Mappings, DecodeError> {
    let mut lines = Vec::new();
    let (mut source, mut line, mut column, mut name) = (0i64, 0i64, 0i64, 0i64);

    for (index, text) in mappings.split(';').enumerate() {
        let fail = |message: String| DecodeError {
            line: index,
            message,
        };
        let mut generated = 0i64;
        let mut segments = Vec::new();

        for raw in text.split(',').filter(|s| !s.is_empty()) {
            let fields = decode_fields(raw).map_err(fail)?;
            if !matches!(fields.len(), 1 | 4 | 5) {
                return Err(fail(format!(
                    "segment '{raw}' has {} fields",
                    fields.len()
                )));
            }

            generated += fields[0];
            let original = if fields.len() >= 4 {
                source += fields[1];
                line += fields[2];
                column += fields[3];
                let segment_name = if fields.len() == 5 {
                    name += fields[4];
                    Some(non_negative(name, "name index").map_err(fail)?)
                } else {
                    None
                };
                Some(OriginalPosition {
                    source: non_negative(source, "source index").map_err(fail)?,
                    line: non_negative(line, "original line").map_err(fail)?,
                    column: non_negative(column, "original column").map_err(fail)?,
                    name: segment_name,
                })
            } else {
                None
            };

            segments.push(Segment {
                generated_column: non_negative(generated, "generated column").map_err(fail)?,
                original,
            });
        }

        segments.sort_by_key(|s| s.generated_column);
        lines.push(segments);
    }

    Ok(lines)
}

fn encode_value(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut d = vlq & DIGIT_MASK;
        vlq >>= 5;
        if vlq > 0 {
            d |= CONTINUATION;
        }
        out.push(ALPHABET[d as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Encode per-line segments back into a `mappings` string
pub fn encode(mappings: &Mappings) -> String {
    let mut out = String::new();
    let (mut source, mut line, mut column, mut name) = (0i64, 0i64, 0i64, 0i64);

    for (index, segments) in mappings.iter().enumerate() {
        if index > 0 {
            out.push(';');
        }
        let mut generated = 0i64;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            encode_value(i64::from(segment.generated_column) - generated, &mut out);
            generated = i64::from(segment.generated_column);

            if let Some(pos) = &segment.original {
                encode_value(i64::from(pos.source) - source, &mut out);
                encode_value(i64::from(pos.line) - line, &mut out);
                encode_value(i64::from(pos.column) - column, &mut out);
                source = i64::from(pos.source);
                line = i64::from(pos.line);
                column = i64::from(pos.column);
                if let Some(n) = pos.name {
                    encode_value(i64::from(n) - name, &mut out);
                    name = i64::from(n);
                }
            }
        }
    }

    out
}
