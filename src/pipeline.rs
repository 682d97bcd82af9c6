//! The request pipeline: decode, normalize, render.

use crate::error::PipelineError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chartwright_defaults::NormalizeContext;
use chartwright_protocol::decoder::{self, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use chartwright_render_core::{BackendPool, NormalizedChart, render_with_pool};
use chartwright_sandbox::{Sandbox, SandboxResult};
use chartwright_types::ChartSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_BACKGROUND: &str = "white";

/// How a textual spec body is wrapped in transit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TextEncoding {
    #[default]
    Plain,
    Url,
    Base64,
}

/// One chart request, in any of the three supported shapes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartRequest {
    /// A legacy query-parameter map (`cht`, `chd`, `chs`, ...).
    Legacy { params: BTreeMap<String, String> },

    /// Free-form spec text, evaluated in the sandbox.
    #[serde(rename_all = "camelCase")]
    Text {
        body: String,
        #[serde(default)]
        encoding: TextEncoding,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
        #[serde(default)]
        background_color: Option<String>,
    },

    /// A structured JSON spec from a trusted caller; no sandbox.
    #[serde(rename_all = "camelCase")]
    Structured {
        spec: Value,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
        #[serde(default)]
        background_color: Option<String>,
    },
}

/// Decodes and normalizes a request into a renderer-ready chart.
pub fn prepare(request: &ChartRequest) -> Result<NormalizedChart, PipelineError> {
    let (spec, width, height, background) = match request {
        ChartRequest::Legacy { params } => {
            let decoded = decoder::decode(params)?;
            (
                decoded.spec,
                decoded.width,
                decoded.height,
                decoded.background_color,
            )
        }
        ChartRequest::Text {
            body,
            encoding,
            width,
            height,
            background_color,
        } => {
            let width = width.unwrap_or(DEFAULT_WIDTH);
            let height = height.unwrap_or(DEFAULT_HEIGHT);
            let text = decode_body(body, *encoding)?;
            let spec = evaluate_untrusted(&text, width, height)?;
            (
                spec,
                width,
                height,
                background_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            )
        }
        ChartRequest::Structured {
            spec,
            width,
            height,
            background_color,
        } => {
            let spec: ChartSpec = serde_json::from_value(spec.clone())
                .map_err(|e| PipelineError::BadSpec(e.to_string()))?;
            (
                spec,
                width.unwrap_or(DEFAULT_WIDTH),
                height.unwrap_or(DEFAULT_HEIGHT),
                background_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            )
        }
    };

    let ctx = NormalizeContext::with_background(background);
    let spec = chartwright_defaults::normalize(spec, &ctx)?;
    Ok(NormalizedChart::new(spec, width, height))
}

/// The full pipeline: [`prepare`], then render through the pool.
pub fn render_chart(
    request: &ChartRequest,
    pool: &BackendPool,
    engine_version: &str,
) -> Result<Vec<u8>, PipelineError> {
    let chart = prepare(request)?;
    log::debug!(
        "rendering {} chart at {}x{} (dpr {})",
        chart.spec.type_str(),
        chart.width,
        chart.height,
        chart.device_pixel_ratio
    );
    Ok(render_with_pool(pool, &chart, engine_version)?)
}

fn evaluate_untrusted(text: &str, width: u32, height: u32) -> Result<ChartSpec, PipelineError> {
    let sandbox = Sandbox::new(width as f64, height as f64);
    match sandbox.evaluate(text) {
        SandboxResult::Ok(spec) => Ok(spec),
        SandboxResult::Rejected(reason) => Err(PipelineError::SandboxRejected(reason)),
        SandboxResult::RuntimeError(message) => Err(PipelineError::SandboxRuntime(message)),
    }
}

fn decode_body(body: &str, encoding: TextEncoding) -> Result<String, PipelineError> {
    match encoding {
        TextEncoding::Plain => Ok(body.to_string()),
        TextEncoding::Url => percent_decode(body),
        TextEncoding::Base64 => {
            let bytes = BASE64
                .decode(body.trim())
                .map_err(|e| bad_encoding("base64", e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| bad_encoding("base64", e.to_string()))
        }
    }
}

/// Percent-decoding per the query-string convention: `%XX` escapes plus
/// `+` for space.
fn percent_decode(input: &str) -> Result<String, PipelineError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'%' => {
                let hex = bytes
                    .get(idx + 1..idx + 3)
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .ok_or_else(|| bad_encoding("url", format!("truncated escape at byte {idx}")))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| bad_encoding("url", format!("bad escape '%{hex}'")))?;
                out.push(byte);
                idx += 3;
            }
            b'+' => {
                out.push(b' ');
                idx += 1;
            }
            byte => {
                out.push(byte);
                idx += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|e| bad_encoding("url", e.to_string()))
}

fn bad_encoding(encoding: &'static str, message: String) -> PipelineError {
    PipelineError::BadEncoding { encoding, message }
}
