//! Value extraction contract for raw sales points.

use serde_json::Value;

/// Extracts the numeric observation from one raw data point.
///
/// The validator receives an accessor instead of guessing at the shape of
/// caller data; a point the accessor cannot read is reported as `None` and
/// coerced downstream.
pub trait ValueAccessor<P> {
    /// The numeric value of `point`, or `None` when absent or unparseable.
    fn value(&self, point: &P) -> Option<f64>;
}

impl<P, F> ValueAccessor<P> for F
where
    F: Fn(&P) -> Option<f64>,
{
    fn value(&self, point: &P) -> Option<f64> {
        self(point)
    }
}

/// Accessor over JSON objects that tries field names in priority order.
///
/// Numeric fields are read directly; string fields are trimmed and parsed.
#[derive(Debug, Clone)]
pub struct FieldPriorityAccessor {
    fields: Vec<String>,
}

impl FieldPriorityAccessor {
    pub fn new<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The standard sales-point priority.
    pub fn sales_default() -> Self {
        Self::new(["sales", "quantity", "value", "amount"])
    }
}

impl Default for FieldPriorityAccessor {
    fn default() -> Self {
        Self::sales_default()
    }
}

impl ValueAccessor<Value> for FieldPriorityAccessor {
    fn value(&self, point: &Value) -> Option<f64> {
        let object = point.as_object()?;
        for field in &self.fields {
            match object.get(field) {
                Some(Value::Number(n)) => return n.as_f64(),
                Some(Value::String(s)) => {
                    if let Ok(parsed) = s.trim().parse::<f64>() {
                        return Some(parsed);
                    }
                }
                _ => continue,
            }
        }
        None
    }
}
