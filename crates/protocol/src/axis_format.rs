//! The `chxs` axis style rule grammar.
//!
//! The first comma-separated field of a `chxs` rule packs the axis index
//! and an optional numeric format:
//!
//! ```text
//! <axis-digit> [ N <prefix> [ * <f|p|e flags> <cXXX currency> <decimals> <zsxy flags> * ] <suffix> ]
//! ```
//!
//! The prefix is the run of characters up to the first `*`; the suffix is
//! whatever follows the closing `*`. A percentage flag multiplies values
//! by 100 and appends `%` to the suffix.

use chartwright_types::TickFormat;
use nom::{
    IResult, Parser,
    bytes::complete::{is_not, take_while1, take_while_m_n},
    character::complete::{char, satisfy},
    combinator::{opt, rest},
};

/// One parsed `chxs` format field: which axis it targets and the numeric
/// format it carries, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisFormatRule {
    pub axis_index: usize,
    pub format: Option<TickFormat>,
}

/// How the axis line and tick marks are drawn, from the rule's fifth field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickVisibility {
    LineOnly,
    TicksOnly,
    Neither,
    Both,
}

impl TickVisibility {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("l") => TickVisibility::LineOnly,
            Some("t") => TickVisibility::TicksOnly,
            Some("_") => TickVisibility::Neither,
            _ => TickVisibility::Both,
        }
    }
}

/// Parses the first field of a `chxs` rule. Returns `None` when the field
/// does not match the grammar at all (no leading axis digit).
pub fn parse_axis_format(input: &str) -> Option<AxisFormatRule> {
    match axis_format(input) {
        Ok(("", rule)) => Some(rule),
        _ => None,
    }
}

fn axis_format(input: &str) -> IResult<&str, AxisFormatRule> {
    let (input, axis_digit) = satisfy(|c| c.is_ascii_digit()).parse(input)?;
    let (input, format) = opt(format_section).parse(input)?;

    Ok((
        input,
        AxisFormatRule {
            axis_index: axis_digit.to_digit(10).unwrap_or(0) as usize,
            format,
        },
    ))
}

fn format_section(input: &str) -> IResult<&str, TickFormat> {
    let (input, _) = char('N').parse(input)?;
    let (input, prefix) = opt(is_not("*")).parse(input)?;
    let (input, star_block) = opt(star_block).parse(input)?;
    let (input, suffix) = rest.parse(input)?;

    let mut format = TickFormat {
        prefix: prefix.unwrap_or("").to_string(),
        suffix: suffix.to_string(),
        ..TickFormat::default()
    };

    if let Some((flags, currency, decimals, other)) = star_block {
        if let Some(flags) = flags {
            format.percent = flags.contains('p');
            format.exponential = flags.contains('e');
        }
        if format.percent {
            format.suffix.push('%');
        }
        if let Some(code) = currency {
            format.prefix.push_str(TickFormat::currency_symbol(code));
        }
        if let Some(d) = decimals {
            format.decimal_places = d;
        }
        if let Some(other) = other {
            format.thousands_separator = other.contains('s');
        }
    }

    Ok((input, format))
}

type StarBlock<'a> = (
    Option<&'a str>,
    Option<&'a str>,
    Option<u32>,
    Option<&'a str>,
);

fn star_block(input: &str) -> IResult<&str, StarBlock<'_>> {
    let (input, _) = char('*').parse(input)?;
    let (input, flags) = opt(take_while1(|c| "fpe".contains(c))).parse(input)?;
    let (input, currency) = opt((
        char('c'),
        take_while_m_n(3, 3, |c: char| c.is_ascii_uppercase()),
    ))
    .parse(input)?;
    let (input, decimals) = opt(satisfy(|c| c.is_ascii_digit())).parse(input)?;
    let (input, other) = opt(take_while1(|c| "zsxy".contains(c))).parse(input)?;
    let (input, _) = char('*').parse(input)?;

    Ok((
        input,
        (
            flags,
            currency.map(|(_, code)| code),
            decimals.and_then(|c| c.to_digit(10)),
            other,
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_axis_index_has_no_format() {
        let rule = parse_axis_format("0").unwrap();
        assert_eq!(rule.axis_index, 0);
        assert!(rule.format.is_none());
    }

    #[test]
    fn prefix_and_suffix_without_star_block() {
        let rule = parse_axis_format("1Nabout ").unwrap();
        assert_eq!(rule.axis_index, 1);
        let format = rule.format.unwrap();
        assert_eq!(format.prefix, "about ");
        assert_eq!(format.decimal_places, 2);
    }

    #[test]
    fn percentage_flag_scales_and_suffixes() {
        let rule = parse_axis_format("0N*p0*").unwrap();
        let format = rule.format.unwrap();
        assert!(format.percent);
        assert_eq!(format.decimal_places, 0);
        assert_eq!(format.apply(0.42), "42%");
    }

    #[test]
    fn currency_code_becomes_a_prefix() {
        let rule = parse_axis_format("0N*cGBP2*").unwrap();
        let format = rule.format.unwrap();
        assert_eq!(format.prefix, "£");
        assert_eq!(format.apply(10.0), "£10.00");
    }

    #[test]
    fn thousands_separator_flag() {
        let rule = parse_axis_format("0N*0s*").unwrap();
        let format = rule.format.unwrap();
        assert!(format.thousands_separator);
        assert_eq!(format.apply(1234567.0), "1,234,567");
    }

    #[test]
    fn full_rule_combines_every_part() {
        let rule = parse_axis_format("0N$*f2s* total").unwrap();
        let format = rule.format.unwrap();
        assert_eq!(format.prefix, "$");
        assert_eq!(format.suffix, " total");
        assert_eq!(format.apply(1500.0), "$1,500.00 total");
    }

    #[test]
    fn malformed_field_is_rejected() {
        assert!(parse_axis_format("x0").is_none());
        assert!(parse_axis_format("").is_none());
    }

    #[test]
    fn tick_visibility_codes() {
        assert_eq!(TickVisibility::from_code(Some("l")), TickVisibility::LineOnly);
        assert_eq!(TickVisibility::from_code(Some("t")), TickVisibility::TicksOnly);
        assert_eq!(TickVisibility::from_code(Some("_")), TickVisibility::Neither);
        assert_eq!(TickVisibility::from_code(Some("lt")), TickVisibility::Both);
        assert_eq!(TickVisibility::from_code(None), TickVisibility::Both);
    }
}
