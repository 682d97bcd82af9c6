//! Tick label callbacks as data.
//!
//! The legacy protocol configures axis tick rendering through `chxs`
//! (numeric format rules) and `chxl` (explicit labels). Both become
//! structured rules here rather than closures, so the backend applies them
//! at draw time and the semantics stay testable.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum TickCallback {
    /// Numeric formatting rules derived from a `chxs` format string.
    Format(TickFormat),
    /// Explicit labels distributed evenly across the rendered ticks.
    Labels(TickLabels),
}

/// Numeric tick formatting: prefix/suffix text, percentage or scientific
/// rendering, decimal places, and an optional thousands separator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TickFormat {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suffix: String,

    #[serde(default)]
    pub percent: bool,

    #[serde(default)]
    pub exponential: bool,

    pub decimal_places: u32,

    #[serde(default)]
    pub thousands_separator: bool,
}

impl Default for TickFormat {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            percent: false,
            exponential: false,
            decimal_places: 2,
            thousands_separator: false,
        }
    }
}

impl TickFormat {
    /// The symbol prefixed for a `cXXX` currency code. Unknown codes fall
    /// back to `$`, matching the legacy protocol.
    pub fn currency_symbol(code: &str) -> &'static str {
        match code {
            "AUD" | "CAD" | "HKD" | "MXN" | "NZD" | "USD" => "$",
            "CHF" => "CHF",
            "CNY" => "元",
            "EUR" => "€",
            "GBP" => "£",
            "INR" => "₹",
            "JPY" => "¥",
            "KRW" => "₩",
            "NOK" | "SEK" => "kr",
            "RUB" => "₽",
            "TRY" => "₺",
            "ZAR" => "R",
            _ => "$",
        }
    }

    /// Formats one tick value.
    pub fn apply(&self, value: f64) -> String {
        let value = if self.percent { value * 100.0 } else { value };

        let body = if self.exponential {
            to_exponential(value)
        } else if self.thousands_separator {
            group_thousands(value, self.decimal_places)
        } else {
            format!("{:.*}", self.decimal_places as usize, value)
        };

        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

fn to_exponential(value: f64) -> String {
    let formatted = format!("{:e}", value);
    // Normalize to an explicit exponent sign.
    match formatted.find('e') {
        Some(pos) if !formatted[pos + 1..].starts_with('-') => {
            format!("{}e+{}", &formatted[..pos], &formatted[pos + 1..])
        }
        _ => formatted,
    }
}

fn group_thousands(value: f64, decimal_places: u32) -> String {
    let fixed = format!("{:.*}", decimal_places as usize, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::new();
    let digits = int_part.len();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (digits - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Explicit tick labels spread across however many ticks the renderer
/// produces, with even step placement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TickLabels {
    pub labels: Vec<String>,
}

impl TickLabels {
    /// The label shown at `tick_idx` out of `num_ticks`, or empty when the
    /// tick falls between label positions.
    ///
    /// Labels are placed at `floor(i * numTicks / (numLabels - 1))` with
    /// the final label pinned to the last tick.
    pub fn label_for_tick(&self, tick_idx: usize, num_ticks: usize) -> &str {
        let num_labels = self.labels.len();
        if num_labels == 0 || num_ticks == 0 {
            return "";
        }
        if num_labels == 1 {
            return if tick_idx == num_ticks - 1 {
                &self.labels[0]
            } else {
                ""
            };
        }

        if tick_idx == num_ticks - 1 {
            return &self.labels[num_labels - 1];
        }

        let step = num_ticks as f64 / (num_labels - 1) as f64;
        for (i, label) in self.labels[..num_labels - 1].iter().enumerate() {
            if (step * i as f64).floor() as usize == tick_idx {
                return label;
            }
        }
        ""
    }
}
