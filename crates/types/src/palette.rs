//! The fixed default color wheel.

pub const DEFAULT_COLOR_WHEEL: [&str; 6] = [
    "#4D89F9", "#00B88A", "red", "purple", "yellow", "brown",
];

/// The wheel color for a dataset or value index, wrapping around.
pub fn wheel_color(idx: usize) -> &'static str {
    DEFAULT_COLOR_WHEEL[idx % DEFAULT_COLOR_WHEEL.len()]
}
