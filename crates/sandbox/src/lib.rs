//! Bounded evaluation of untrusted chart specifications.
//!
//! User-supplied specs arrive as text in a relaxed JSON dialect that may
//! contain arithmetic and calls to a small set of whitelisted helper
//! functions. Evaluation is a three-stage funnel: a lexical denylist scan
//! rejects program-shaped input outright, a `nom` grammar parses the rest
//! into a small expression AST, and a step-budgeted interpreter reduces
//! the AST to a JSON value that must deserialize into a [`ChartSpec`].
//!
//! There is no host escape to defend against because there is no host
//! access to begin with: the expression language has no loops, no
//! bindings, and no I/O, and every AST node evaluated spends budget.

mod ast;
mod engine;
mod error;
mod guard;
mod helpers;
mod parser;

pub use error::SandboxError;

use chartwright_types::ChartSpec;
use engine::EvaluationContext;

/// Default per-evaluation step budget. Generous for real chart specs,
/// which rarely exceed a few thousand nodes.
pub const DEFAULT_FUEL: u64 = 200_000;

/// The outcome of evaluating one untrusted spec.
#[derive(Debug)]
pub enum SandboxResult {
    /// The spec evaluated to a well-formed chart.
    Ok(ChartSpec),
    /// The input was refused before evaluation started.
    Rejected(String),
    /// Evaluation began but failed; the message is safe to echo back.
    RuntimeError(String),
}

impl SandboxResult {
    pub fn ok(self) -> Option<ChartSpec> {
        match self {
            SandboxResult::Ok(spec) => Some(spec),
            _ => None,
        }
    }
}

/// Evaluator for untrusted chart-spec text, configured with the canvas
/// geometry the gradient helpers resolve against.
pub struct Sandbox {
    canvas_width: f64,
    canvas_height: f64,
    fuel: u64,
}

impl Sandbox {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            fuel: DEFAULT_FUEL,
        }
    }

    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self
    }

    /// Evaluates one spec. Never panics and never blocks beyond the step
    /// budget, regardless of input.
    pub fn evaluate(&self, input: &str) -> SandboxResult {
        if let Some(reason) = guard::scan(input) {
            log::debug!("spec rejected by lexical guard: {}", reason);
            return SandboxResult::Rejected(reason.to_string());
        }

        let expr = match parser::parse_expression(input) {
            Ok(expr) => expr,
            Err(e) => return SandboxResult::RuntimeError(e.to_string()),
        };

        let mut ctx = EvaluationContext::new(self.canvas_width, self.canvas_height, self.fuel);
        let value = match engine::evaluate(&expr, &mut ctx) {
            Ok(value) => value,
            Err(e) => return SandboxResult::RuntimeError(e.to_string()),
        };

        match serde_json::from_value::<ChartSpec>(value) {
            Ok(spec) => SandboxResult::Ok(spec),
            Err(e) => SandboxResult::RuntimeError(SandboxError::NotAChart(e.to_string()).to_string()),
        }
    }
}
