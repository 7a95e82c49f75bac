//! Integer arithmetic tools: `add`, `subtract`, `multiply`.
//!
//! Each takes `{ "a": integer, "b": integer }` and returns the result as decimal text.
//! Overflow is reported as an execution failure instead of wrapping.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSourceError, ToolSpec};
use crate::tools::{Tool, ToolRegistry};

pub const TOOL_ADD: &str = "add";
pub const TOOL_SUBTRACT: &str = "subtract";
pub const TOOL_MULTIPLY: &str = "multiply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Subtract,
    Multiply,
}

/// One binary integer operation exposed as a tool.
pub struct ArithmeticTool {
    op: Op,
}

impl ArithmeticTool {
    pub fn add() -> Self {
        Self { op: Op::Add }
    }

    pub fn subtract() -> Self {
        Self { op: Op::Subtract }
    }

    pub fn multiply() -> Self {
        Self { op: Op::Multiply }
    }

    fn description(&self) -> &'static str {
        match self.op {
            Op::Add => "Addition function that adds 2 integers together.",
            Op::Subtract => "Subtraction function for integers: returns a - b.",
            Op::Multiply => "Multiplication function for integers: returns a * b.",
        }
    }

    fn apply(&self, a: i64, b: i64) -> Option<i64> {
        match self.op {
            Op::Add => a.checked_add(b),
            Op::Subtract => a.checked_sub(b),
            Op::Multiply => a.checked_mul(b),
        }
    }
}

const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F64: f64 = 9_223_372_036_854_775_808.0;

fn integer_arg(args: &Value, key: &str) -> Result<i64, ToolSourceError> {
    let v = args
        .get(key)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing {}", key)))?;
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    let invalid = || {
        ToolSourceError::InvalidInput(format!("{} must be a 64-bit integer, got {}", key, v))
    };
    if v.as_u64().is_some() {
        return Err(invalid());
    }
    // Models sometimes send whole numbers as 14.0. The upper bound is 2^63, exclusive.
    match v.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= I64_MIN_F64 && f < I64_END_F64 => Ok(f as i64),
        _ => Err(invalid()),
    }
}

#[async_trait]
impl Tool for ArithmeticTool {
    fn name(&self) -> &str {
        match self.op {
            Op::Add => TOOL_ADD,
            Op::Subtract => TOOL_SUBTRACT,
            Op::Multiply => TOOL_MULTIPLY,
        }
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer", "description": "First operand." },
                    "b": { "type": "integer", "description": "Second operand." }
                },
                "required": ["a", "b"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let a = integer_arg(&args, "a")?;
        let b = integer_arg(&args, "b")?;
        let result = self.apply(a, b).ok_or_else(|| {
            ToolSourceError::Execution(format!("integer overflow in {}({}, {})", self.name(), a, b))
        })?;
        Ok(ToolCallContent::text(result.to_string()))
    }
}

/// Registry holding `add`, `subtract` and `multiply`.
pub fn arithmetic_registry() -> ToolRegistry {
    ToolRegistry::new()
        .with(Box::new(ArithmeticTool::add()))
        .with(Box::new(ArithmeticTool::subtract()))
        .with(Box::new(ArithmeticTool::multiply()))
}
