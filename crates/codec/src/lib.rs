//! Series data decoding for the legacy chart protocol.
//!
//! The `chd` parameter packs numeric series into one of four sub-encodings,
//! selected by a tag prefix (`t:`, `s:`, `e:`, `a:`). Decoding is
//! deliberately forgiving: malformed tokens become nulls and an unknown
//! tag yields an empty matrix, matching the defensive behavior of the
//! protocol this decoder is compatible with.

use log::warn;

/// A decoded series matrix: one row per series, `None` for missing values.
pub type SeriesMatrix = Vec<Vec<Option<f64>>>;

const SIMPLE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const EXTENDED_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesEncoding {
    /// `t:` plain text values with range clamping.
    Text,
    /// `s:` one character per value over a 62-symbol alphabet.
    Simple,
    /// `e:` two characters per value over a 64-symbol alphabet.
    Extended,
    /// `a:` plain text values, no scaling.
    Awesome,
}

impl SeriesEncoding {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "t" => Some(SeriesEncoding::Text),
            "s" => Some(SeriesEncoding::Simple),
            "e" => Some(SeriesEncoding::Extended),
            "a" => Some(SeriesEncoding::Awesome),
            _ => None,
        }
    }
}

/// An inclusive value range for one text-encoded series.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

const DEFAULT_RANGE: Range = Range {
    min: 0.0,
    max: 100.0,
};

/// Decodes a full `chd` parameter (`<tag>:<payload>`) with its optional
/// `chds` range specification.
pub fn decode_series(chd: &str, chds: Option<&str>) -> SeriesMatrix {
    let (tag, payload) = match chd.split_once(':') {
        Some(parts) => parts,
        None => {
            warn!("series data without an encoding tag: {:?}", chd);
            return Vec::new();
        }
    };

    match SeriesEncoding::from_tag(tag) {
        Some(encoding) => decode(encoding, payload, chds),
        None => {
            warn!("unknown series encoding tag: {:?}", tag);
            Vec::new()
        }
    }
}

/// Decodes one payload with a known encoding.
pub fn decode(encoding: SeriesEncoding, payload: &str, range_spec: Option<&str>) -> SeriesMatrix {
    match encoding {
        SeriesEncoding::Text => decode_text(payload, range_spec),
        SeriesEncoding::Simple => decode_alphabet(payload, SIMPLE_ALPHABET, 1),
        SeriesEncoding::Extended => decode_alphabet(payload, EXTENDED_ALPHABET, 2),
        SeriesEncoding::Awesome => decode_awesome(payload),
    }
}

fn decode_text(payload: &str, range_spec: Option<&str>) -> SeriesMatrix {
    let series: Vec<&str> = payload.split('|').collect();

    if range_spec == Some("a") {
        // Auto-scale: values taken as-is, no clamping.
        return series
            .iter()
            .map(|values| values.split(',').map(parse_token).collect())
            .collect();
    }

    let ranges = parse_ranges(range_spec, series.len());
    series
        .iter()
        .zip(ranges)
        .map(|(values, range)| {
            values
                .split(',')
                .map(|token| match parse_token(token) {
                    Some(v) if v < range.min => None,
                    Some(v) if v > range.max => Some(range.max),
                    other => other,
                })
                .collect()
        })
        .collect()
}

/// Parses `chds` min/max pairs, repeating the last pair to cover every
/// series. No spec at all means `[0,100]` throughout.
fn parse_ranges(range_spec: Option<&str>, num_series: usize) -> Vec<Range> {
    let spec = match range_spec {
        Some(s) if !s.is_empty() => s,
        _ => return vec![DEFAULT_RANGE; num_series],
    };

    let numbers: Vec<Option<f64>> = spec.split(',').map(parse_token).collect();
    let mut ranges: Vec<Range> = numbers
        .chunks(2)
        .filter_map(|pair| match pair {
            [Some(min), Some(max)] => Some(Range {
                min: *min,
                max: *max,
            }),
            _ => None,
        })
        .collect();

    if ranges.is_empty() {
        return vec![DEFAULT_RANGE; num_series];
    }
    while ranges.len() < num_series {
        ranges.push(ranges[ranges.len() - 1]);
    }
    ranges
}

fn decode_alphabet(payload: &str, alphabet: &str, chunk_len: usize) -> SeriesMatrix {
    payload
        .split(',')
        .map(|encoded| {
            let chars: Vec<char> = encoded.chars().collect();
            chars
                .chunks(chunk_len)
                .map(|chunk| decode_symbol(chunk, alphabet))
                .collect()
        })
        .collect()
}

fn decode_symbol(chunk: &[char], alphabet: &str) -> Option<f64> {
    if chunk.iter().all(|&c| c == '_') {
        return None;
    }
    let base = alphabet.chars().count() as f64;
    let mut value = 0.0;
    for &c in chunk {
        let idx = alphabet.chars().position(|a| a == c)?;
        value = value * base + idx as f64;
    }
    Some(value)
}

fn decode_awesome(payload: &str) -> SeriesMatrix {
    payload
        .split('|')
        .map(|values| values.split(',').map(parse_token).collect())
        .collect()
}

fn parse_token(token: &str) -> Option<f64> {
    if token == "_" {
        return None;
    }
    token.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_clamps_to_default_range() {
        let decoded = decode_series("t:_,30,-30,50,80,200", None);
        assert_eq!(
            decoded,
            vec![vec![None, Some(30.0), None, Some(50.0), Some(80.0), Some(100.0)]]
        );
    }

    #[test]
    fn text_auto_scale_keeps_values() {
        let decoded = decode_series("t:_,30,-30,50,80,200", Some("a"));
        assert_eq!(
            decoded,
            vec![vec![
                None,
                Some(30.0),
                Some(-30.0),
                Some(50.0),
                Some(80.0),
                Some(200.0)
            ]]
        );
    }

    #[test]
    fn text_explicit_range_repeats_last_pair() {
        // One range pair covering two series.
        let decoded = decode_series("t:5,10|20,40", Some("0,30"));
        assert_eq!(
            decoded,
            vec![
                vec![Some(5.0), Some(10.0)],
                vec![Some(20.0), Some(30.0)],
            ]
        );
    }

    #[test]
    fn text_values_below_min_become_null() {
        let decoded = decode_series("t:5,15,25", Some("10,20"));
        assert_eq!(decoded, vec![vec![None, Some(15.0), Some(20.0)]]);
    }

    #[test]
    fn simple_encoding_maps_the_62_symbol_alphabet() {
        let decoded = decode_series("s:BTb19_,Mn5tzb", None);
        assert_eq!(decoded.len(), 2);
        assert_eq!(
            decoded[0],
            vec![Some(1.0), Some(19.0), Some(27.0), Some(53.0), Some(61.0), None]
        );
        assert_eq!(
            decoded[1],
            vec![Some(12.0), Some(39.0), Some(57.0), Some(45.0), Some(51.0), Some(27.0)]
        );
    }

    #[test]
    fn extended_encoding_decodes_two_char_chunks() {
        // "AA" -> 0, "AZ" -> 25, "." is the last symbol -> 64*64 - 1.
        let decoded = decode_series("e:AAAZ..__", None);
        assert_eq!(
            decoded,
            vec![vec![Some(0.0), Some(25.0), Some(4095.0), None]]
        );
    }

    #[test]
    fn awesome_encoding_takes_floats_verbatim() {
        let decoded = decode_series("a:1.5,2.5|-3,4", None);
        assert_eq!(
            decoded,
            vec![
                vec![Some(1.5), Some(2.5)],
                vec![Some(-3.0), Some(4.0)],
            ]
        );
    }

    #[test]
    fn malformed_tokens_become_null() {
        let decoded = decode_series("t:abc,50", Some("a"));
        assert_eq!(decoded, vec![vec![None, Some(50.0)]]);
    }

    #[test]
    fn unknown_tag_yields_empty_matrix() {
        assert!(decode_series("q:1,2,3", None).is_empty());
        assert!(decode_series("no-tag-at-all", None).is_empty());
    }
}
