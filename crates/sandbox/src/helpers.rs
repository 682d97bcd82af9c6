//! The whitelisted helper functions exposed to untrusted specs.
//!
//! Gradient helpers are computed against the target canvas dimensions and
//! produce structured fill descriptors; the rendering backend resolves
//! them into actual paint objects. The pattern helper mirrors the legacy
//! shape/color/size drawing API.

use crate::error::SandboxError;
use serde_json::{json, Map, Value};

const MAX_PATTERN_SIZE: f64 = 200.0;
const DEFAULT_PATTERN_SIZE: f64 = 20.0;

/// `getGradientFillHelper(direction, colors, dimensions?)`.
///
/// Color stops are spread evenly; the gradient line follows the canvas
/// (or explicit) dimensions along the requested direction.
pub fn gradient_fill_helper(
    args: &[Value],
    canvas_width: f64,
    canvas_height: f64,
) -> Result<Value, SandboxError> {
    let direction = args.first().and_then(Value::as_str).unwrap_or("horizontal");
    let colors = args
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| bad_args("getGradientFillHelper", "expected a list of colors"))?;

    let dimensions = args.get(2).and_then(Value::as_object);
    let width = dimension(dimensions, "width").unwrap_or(canvas_width);
    let height = dimension(dimensions, "height").unwrap_or(canvas_height);

    let divisor = (colors.len().saturating_sub(1)).max(1) as f64;
    let stops: Vec<Value> = colors
        .iter()
        .enumerate()
        .map(|(idx, color)| {
            json!({
                "offset": idx as f64 / divisor,
                "color": color,
            })
        })
        .collect();

    let line = match direction {
        "vertical" => [0.0, 0.0, 0.0, height],
        "both" => [0.0, 0.0, width, height],
        _ => [0.0, 0.0, width, 0.0],
    };

    Ok(gradient_descriptor(&line, stops))
}

/// `getGradientFill(colorOptions, linearGradient?)` with explicit stops.
pub fn gradient_fill(args: &[Value], canvas_width: f64) -> Result<Value, SandboxError> {
    let color_options = args
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| bad_args("getGradientFill", "expected a list of color stops"))?;

    let stops: Vec<Value> = color_options
        .iter()
        .map(|entry| {
            json!({
                "offset": entry.get("offset").cloned().unwrap_or(json!(0.0)),
                "color": entry.get("color").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    let mut line = [0.0, 0.0, canvas_width, 0.0];
    if let Some(coords) = args.get(1).and_then(Value::as_array) {
        for (slot, value) in line.iter_mut().zip(coords) {
            if let Some(v) = value.as_f64() {
                *slot = v;
            }
        }
    }

    Ok(gradient_descriptor(&line, stops))
}

/// `pattern.draw(shapeType, backgroundColor, patternColor?, size?)`.
pub fn pattern_draw(args: &[Value]) -> Result<Value, SandboxError> {
    let shape = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| bad_args("pattern.draw", "expected a shape type"))?;
    let background = args
        .get(1)
        .cloned()
        .ok_or_else(|| bad_args("pattern.draw", "expected a background color"))?;
    let pattern_color = args.get(2).cloned().unwrap_or(Value::Null);

    let size = args
        .get(3)
        .and_then(Value::as_f64)
        .filter(|s| *s > 0.0)
        .map(|s| s.min(MAX_PATTERN_SIZE))
        .unwrap_or(DEFAULT_PATTERN_SIZE);

    Ok(json!({
        "type": "pattern",
        "shape": shape,
        "backgroundColor": background,
        "patternColor": pattern_color,
        "size": size,
    }))
}

fn gradient_descriptor(line: &[f64; 4], stops: Vec<Value>) -> Value {
    json!({
        "type": "linearGradient",
        "x0": line[0],
        "y0": line[1],
        "x1": line[2],
        "y1": line[3],
        "colorStops": stops,
    })
}

fn dimension(dimensions: Option<&Map<String, Value>>, key: &str) -> Option<f64> {
    dimensions.and_then(|d| d.get(key)).and_then(Value::as_f64)
}

fn bad_args(function: &str, message: &str) -> SandboxError {
    SandboxError::BadArgument {
        function: function.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_spreads_stops_evenly() {
        let result = gradient_fill_helper(
            &[json!("horizontal"), json!(["red", "white", "blue"])],
            500.0,
            300.0,
        )
        .unwrap();
        assert_eq!(result["x1"], json!(500.0));
        assert_eq!(result["y1"], json!(0.0));
        assert_eq!(result["colorStops"][1]["offset"], json!(0.5));
    }

    #[test]
    fn vertical_direction_follows_canvas_height() {
        let result =
            gradient_fill_helper(&[json!("vertical"), json!(["red", "blue"])], 500.0, 300.0)
                .unwrap();
        assert_eq!(result["x1"], json!(0.0));
        assert_eq!(result["y1"], json!(300.0));
    }

    #[test]
    fn single_color_avoids_division_by_zero() {
        let result =
            gradient_fill_helper(&[json!("horizontal"), json!(["red"])], 100.0, 100.0).unwrap();
        assert_eq!(result["colorStops"][0]["offset"], json!(0.0));
    }

    #[test]
    fn explicit_stops_pass_through() {
        let result = gradient_fill(
            &[json!([{ "offset": 0.25, "color": "green" }]), json!([0, 0, 10, 10])],
            500.0,
        )
        .unwrap();
        assert_eq!(result["colorStops"][0]["offset"], json!(0.25));
        assert_eq!(result["x1"], json!(10.0));
        assert_eq!(result["y1"], json!(10.0));
    }

    #[test]
    fn pattern_size_is_clamped() {
        let result = pattern_draw(&[
            json!("dot"),
            json!("#fff"),
            json!("#000"),
            json!(9999.0),
        ])
        .unwrap();
        assert_eq!(result["size"], json!(200.0));

        let result = pattern_draw(&[json!("dot"), json!("#fff")]).unwrap();
        assert_eq!(result["size"], json!(20.0));
    }
}
