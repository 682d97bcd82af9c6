//! Command-line front end: decodes a chart request and prints the
//! normalized spec as JSON. Useful for inspecting what a renderer
//! would be handed without running one.
//!
//! With `key=value` arguments the input is treated as a legacy
//! parameter map; otherwise spec text is read from stdin and evaluated
//! in the sandbox.

use chartwright::{ChartRequest, TextEncoding, prepare};
use std::collections::BTreeMap;
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = if args.is_empty() {
        let mut body = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut body) {
            eprintln!("error: failed to read stdin: {e}");
            return ExitCode::FAILURE;
        }
        ChartRequest::Text {
            body,
            encoding: TextEncoding::Plain,
            width: None,
            height: None,
            background_color: None,
        }
    } else {
        let mut params = BTreeMap::new();
        for arg in &args {
            match arg.split_once('=') {
                Some((key, value)) => {
                    params.insert(key.to_string(), value.to_string());
                }
                None => {
                    eprintln!("error: expected key=value arguments, got '{arg}'");
                    return ExitCode::FAILURE;
                }
            }
        }
        ChartRequest::Legacy { params }
    };

    match prepare(&request) {
        Ok(chart) => match serde_json::to_string_pretty(&chart.spec) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
