//! Expression evaluation under a step budget.

use crate::ast::{BinOp, Expr};
use crate::error::SandboxError;
use crate::helpers;
use serde_json::{json, Map, Value};

/// The evaluation context: the target canvas geometry the gradient
/// helpers compute against, and the remaining step budget.
pub struct EvaluationContext {
    pub canvas_width: f64,
    pub canvas_height: f64,
    fuel: u64,
}

impl EvaluationContext {
    pub fn new(canvas_width: f64, canvas_height: f64, fuel: u64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            fuel,
        }
    }

    fn spend(&mut self) -> Result<(), SandboxError> {
        if self.fuel == 0 {
            return Err(SandboxError::BudgetExceeded);
        }
        self.fuel -= 1;
        Ok(())
    }
}

pub fn evaluate(expr: &Expr, ctx: &mut EvaluationContext) -> Result<Value, SandboxError> {
    ctx.spend()?;

    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(evaluate(item, ctx)?);
            }
            Ok(Value::Array(out))
        }
        Expr::Object(entries) => {
            let mut out = Map::new();
            for (key, value) in entries {
                out.insert(key.clone(), evaluate(value, ctx)?);
            }
            Ok(Value::Object(out))
        }
        Expr::Neg(inner) => {
            let value = evaluate(inner, ctx)?;
            match value.as_f64() {
                Some(n) => Ok(json!(-n)),
                None => Err(SandboxError::Type(format!(
                    "cannot negate {}",
                    type_name(&value)
                ))),
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, ctx)?;
            let rhs = evaluate(rhs, ctx)?;
            apply_binary(*op, &lhs, &rhs)
        }
        Expr::Call { path, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, ctx)?);
            }
            dispatch(path, &values, ctx)
        }
        Expr::Path(path) => {
            // The chart-rendering namespace is exposed as an inert value so
            // references to it do not fail; nothing else resolves.
            if path.first().map(String::as_str) == Some("Chart") {
                Ok(Value::Null)
            } else {
                Err(SandboxError::UnknownIdentifier(path.join(".")))
            }
        }
    }
}

fn apply_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, SandboxError> {
    if op == BinOp::Add {
        // String concatenation on either side, as spec authors expect.
        if let (Some(l), Some(r)) = (lhs.as_str(), rhs.as_str()) {
            return Ok(json!(format!("{}{}", l, r)));
        }
        if let Some(l) = lhs.as_str() {
            return Ok(json!(format!("{}{}", l, coerce_string(rhs))));
        }
        if let Some(r) = rhs.as_str() {
            return Ok(json!(format!("{}{}", coerce_string(lhs), r)));
        }
    }

    let (Some(l), Some(r)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(SandboxError::Type(format!(
            "cannot apply arithmetic to {} and {}",
            type_name(lhs),
            type_name(rhs)
        )));
    };

    let result = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
    };
    Ok(json!(result))
}

fn dispatch(
    path: &[String],
    args: &[Value],
    ctx: &EvaluationContext,
) -> Result<Value, SandboxError> {
    let name = path.join(".");
    match name.as_str() {
        "getGradientFillHelper" => {
            helpers::gradient_fill_helper(args, ctx.canvas_width, ctx.canvas_height)
        }
        "getGradientFill" => helpers::gradient_fill(args, ctx.canvas_width),
        "pattern.draw" => helpers::pattern_draw(args),
        _ => Err(SandboxError::UnknownFunction(name)),
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn eval(input: &str) -> Result<Value, SandboxError> {
        let expr = parse_expression(input)?;
        let mut ctx = EvaluationContext::new(500.0, 300.0, 10_000);
        evaluate(&expr, &mut ctx)
    }

    #[test]
    fn arithmetic_evaluates() {
        assert_eq!(eval("2 + 3 * 4").unwrap(), json!(14.0));
        assert_eq!(eval("(2 + 3) * 4").unwrap(), json!(20.0));
        assert_eq!(eval("-5 + 1").unwrap(), json!(-4.0));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("'a' + 'b'").unwrap(), json!("ab"));
        assert_eq!(eval("'v' + 2").unwrap(), json!("v2"));
    }

    #[test]
    fn objects_and_arrays_build_values() {
        let value = eval("{labels: [1, 2 + 1], title: 'hi'}").unwrap();
        assert_eq!(value["labels"], json!([1.0, 3.0]));
        assert_eq!(value["title"], json!("hi"));
    }

    #[test]
    fn chart_namespace_is_inert() {
        assert_eq!(eval("Chart.defaults").unwrap(), Value::Null);
    }

    #[test]
    fn unknown_identifiers_fail() {
        assert!(matches!(
            eval("process.env"),
            Err(SandboxError::UnknownIdentifier(_))
        ));
        assert!(matches!(
            eval("require('fs')"),
            Err(SandboxError::UnknownFunction(_))
        ));
    }

    #[test]
    fn fuel_runs_out() {
        let expr = parse_expression("[1,2,3,4,5]").unwrap();
        let mut ctx = EvaluationContext::new(500.0, 300.0, 3);
        assert_eq!(
            evaluate(&expr, &mut ctx),
            Err(SandboxError::BudgetExceeded)
        );
    }

    #[test]
    fn gradient_helper_is_reachable() {
        let value = eval("getGradientFillHelper('vertical', ['red', 'blue'])").unwrap();
        assert_eq!(value["type"], json!("linearGradient"));
        assert_eq!(value["y1"], json!(300.0));
    }
}
