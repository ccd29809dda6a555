//! PrintInterceptor - human readable transition dump

use super::Interceptor;
use crate::action::Action;
use crate::error::StoreError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Receives one string per printed line
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Serializes each action and the resulting state to JSON and hands the text
/// to a sink (stdout unless told otherwise).
///
/// For every transition two lines are written:
///
/// ```text
/// Action: Increment 42
/// State: {"counter":1379}
/// ```
///
/// The payload is left out when it serializes to nothing (`null`, `{}`, `[]`),
/// which covers unit enum variants.
pub struct PrintInterceptor {
    sink: Sink,
    pretty: bool,
}

impl PrintInterceptor {
    /// Print to standard output
    pub fn new() -> Self {
        Self::with_sink(|line: &str| println!("{}", line))
    }

    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
            pretty: false,
        }
    }

    /// Pretty-print the state (multi-line)
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Render the two lines for one transition
    pub fn format<S, A>(&self, action: &A, new_state: &S) -> Result<(String, String), StoreError>
    where
        S: Serialize,
        A: Action + Serialize,
    {
        let action_line = match payload_of(action)? {
            Some(payload) => format!("Action: {} {}", action.id(), payload),
            None => format!("Action: {}", action.id()),
        };

        let state = if self.pretty {
            serde_json::to_string_pretty(new_state)?
        } else {
            serde_json::to_string(new_state)?
        };

        Ok((action_line, format!("State: {}", state)))
    }
}

impl Default for PrintInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

/// The action's payload, unwrapped from serde's externally tagged enum form
fn payload_of<A: Action + Serialize>(action: &A) -> Result<Option<Value>, StoreError> {
    let payload = match serde_json::to_value(action)? {
        // unit variant
        Value::String(name) if name == action.id() => Value::Null,
        Value::Object(mut map) if map.len() == 1 && map.contains_key(action.id()) => {
            map.remove(action.id()).unwrap_or(Value::Null)
        }
        other => other,
    };

    let empty = match &payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };

    Ok((!empty).then_some(payload))
}

impl<S, A> Interceptor<S, A> for PrintInterceptor
where
    S: Serialize,
    A: Action + Serialize,
{
    fn on_transition(&self, action: &A, _old_state: &S, new_state: &S) {
        match self.format(action, new_state) {
            Ok((action_line, state_line)) => {
                (self.sink)(&action_line);
                (self.sink)(&state_line);
            }
            Err(e) => log::error!("PrintInterceptor: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    enum TestAction {
        Reset,
        Add(i64),
        Rename { name: String },
        Empty {},
        Batch(Vec<i64>),
    }

    impl Action for TestAction {
        fn id(&self) -> &str {
            match self {
                TestAction::Reset => "Reset",
                TestAction::Add(_) => "Add",
                TestAction::Rename { .. } => "Rename",
                TestAction::Empty {} => "Empty",
                TestAction::Batch(_) => "Batch",
            }
        }
    }

    #[derive(Serialize)]
    struct State {
        counter: i64,
    }

    fn capture() -> (PrintInterceptor, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let interceptor = PrintInterceptor::with_sink(move |line: &str| {
            sink.lock().push(line.to_string());
        });
        (interceptor, lines)
    }

    #[test]
    fn test_prints_action_and_state() {
        let (interceptor, lines) = capture();

        interceptor.on_transition(&TestAction::Add(42), &State { counter: 1 }, &State { counter: 43 });

        assert_eq!(
            *lines.lock(),
            vec![
                "Action: Add 42".to_string(),
                r#"State: {"counter":43}"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_struct_payload() {
        let (interceptor, _) = capture();
        let (action, _) = interceptor
            .format(
                &TestAction::Rename {
                    name: "x".to_string(),
                },
                &State { counter: 0 },
            )
            .unwrap();

        assert_eq!(action, r#"Action: Rename {"name":"x"}"#);
    }

    #[test]
    fn test_skips_empty_payloads() {
        let (interceptor, _) = capture();
        let state = State { counter: 0 };

        for action in [TestAction::Reset, TestAction::Empty {}, TestAction::Batch(vec![])] {
            let (line, _) = interceptor.format(&action, &state).unwrap();
            assert_eq!(line, format!("Action: {}", action.id()));
        }
    }

    #[test]
    fn test_pretty_state() {
        let (interceptor, _) = capture();
        let interceptor = interceptor.pretty(true);

        let (_, state) = interceptor
            .format(&TestAction::Reset, &State { counter: 5 })
            .unwrap();

        assert_eq!(state, "State: {\n  \"counter\": 5\n}");
    }
}
