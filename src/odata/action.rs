use serde_json::Value;

/// Outcome of a bound action invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// No response body.
    Empty,
    /// A primitive value, unwrapped from the OData `{"value": ...}` envelope.
    Scalar(Value),
    /// An object or collection, with `@odata.*` annotations removed.
    Structured(Value),
}

impl ActionResult {
    pub(crate) fn from_body(body: Option<Value>) -> Self {
        let Some(body) = body else {
            return ActionResult::Empty;
        };

        let mut object = match body {
            Value::Object(object) => object,
            Value::Null => return ActionResult::Empty,
            scalar => return ActionResult::Scalar(scalar),
        };
        object.retain(|key, _| !key.starts_with("@odata."));

        if object.len() == 1 {
            if let Some(value) = object.get("value") {
                return match value {
                    Value::Object(_) | Value::Array(_) => ActionResult::Structured(value.clone()),
                    Value::Null => ActionResult::Empty,
                    scalar => ActionResult::Scalar(scalar.clone()),
                };
            }
        }

        if object.is_empty() {
            return ActionResult::Empty;
        }
        ActionResult::Structured(Value::Object(object))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ActionResult::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ActionResult::Scalar(value) => value.as_str(),
            _ => None,
        }
    }
}
