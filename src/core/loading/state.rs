// ─── Result-State Container ───
// Tri-state wrapper for a value that arrives asynchronously.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{AppResult, ApplicationError};

/// A value that is still loading, is ready, or failed.
///
/// Transitions replace the container; nothing mutates a state in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ResultState<T> {
    Loading,
    Ready { value: T },
    Failed { error: ApplicationError },
}

impl<T> Default for ResultState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> ResultState<T> {
    pub fn ready(value: T) -> Self {
        Self::Ready { value }
    }

    pub fn failed(error: ApplicationError) -> Self {
        Self::Failed { error }
    }

    /// Classify a settled value. See [`IntoResultState`] for the accepted shapes.
    pub fn normalize(raw: impl IntoResultState<T>) -> Self {
        raw.into_result_state()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready { value } => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApplicationError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value } => Some(value),
            _ => None,
        }
    }

    /// `Ok(None)` while loading.
    pub fn result(&self) -> Result<Option<&T>, &ApplicationError> {
        match self {
            Self::Loading => Ok(None),
            Self::Ready { value } => Ok(Some(value)),
            Self::Failed { error } => Err(error),
        }
    }

    pub fn as_ref(&self) -> ResultState<&T> {
        match self {
            Self::Loading => ResultState::Loading,
            Self::Ready { value } => ResultState::Ready { value },
            Self::Failed { error } => ResultState::Failed {
                error: error.clone(),
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultState<U> {
        match self {
            Self::Loading => ResultState::Loading,
            Self::Ready { value } => ResultState::Ready { value: f(value) },
            Self::Failed { error } => ResultState::Failed { error },
        }
    }

    /// Chain a fallible step onto a ready value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> AppResult<U>) -> ResultState<U> {
        match self {
            Self::Loading => ResultState::Loading,
            Self::Ready { value } => f(value).into_result_state(),
            Self::Failed { error } => ResultState::Failed { error },
        }
    }

    /// Collapse to a plain value; loading and failed both give `None`.
    pub fn resolve(self) -> Option<T> {
        self.into_value()
    }

    /// Collapse to a plain value, substituting fallbacks for the other two states.
    pub fn resolve_with(self, if_loading: T, if_error: impl FnOnce(ApplicationError) -> T) -> T {
        match self {
            Self::Loading => if_loading,
            Self::Ready { value } => value,
            Self::Failed { error } => if_error(error),
        }
    }

    /// Projection used to decide whether a change is worth announcing.
    pub fn triple(&self) -> (Option<&T>, Option<&ApplicationError>, bool) {
        (self.value(), self.error(), self.is_loading())
    }
}

impl ResultState<Value> {
    /// Classify an untyped value arriving over IPC.
    ///
    /// `null` is loading, an object already tagged with `state` passes through,
    /// an object with a string `kind` is an error, and everything else
    /// (including `false`, `0` and `""`) is ready.
    pub fn classify_json(raw: Value) -> Self {
        match raw {
            Value::Null => Self::Loading,
            Value::Object(ref map) if is_state_tagged(map) => {
                match serde_json::from_value::<ResultState<Value>>(raw.clone()) {
                    Ok(state) => state,
                    Err(e) => Self::failed(ApplicationError::unexpected(format!(
                        "malformed result state: {e}"
                    ))),
                }
            }
            Value::Object(ref map) if matches!(map.get("kind"), Some(Value::String(_))) => {
                let error = serde_json::from_value::<ApplicationError>(raw.clone())
                    .unwrap_or_else(|_| ApplicationError::unexpected(raw.to_string()));
                Self::failed(error)
            }
            other => Self::ready(other),
        }
    }
}

fn is_state_tagged(map: &serde_json::Map<String, Value>) -> bool {
    matches!(
        map.get("state").and_then(Value::as_str),
        Some("loading" | "ready" | "failed")
    )
}

impl<T> From<ResultState<T>> for Result<Option<T>, ApplicationError> {
    fn from(state: ResultState<T>) -> Self {
        match state {
            ResultState::Loading => Ok(None),
            ResultState::Ready { value } => Ok(Some(value)),
            ResultState::Failed { error } => Err(error),
        }
    }
}

/// Shapes a producer may settle with.
///
/// - `None` → loading
/// - a [`ResultState`] → unchanged
/// - an [`ApplicationError`] → failed
/// - `Ok(v)` / `Err(e)` → ready / failed, unwrapped
pub trait IntoResultState<T> {
    fn into_result_state(self) -> ResultState<T>;
}

impl<T> IntoResultState<T> for ResultState<T> {
    fn into_result_state(self) -> ResultState<T> {
        self
    }
}

impl<T> IntoResultState<T> for ApplicationError {
    fn into_result_state(self) -> ResultState<T> {
        ResultState::Failed { error: self }
    }
}

impl<T> IntoResultState<T> for Option<T> {
    fn into_result_state(self) -> ResultState<T> {
        match self {
            Some(value) => ResultState::Ready { value },
            None => ResultState::Loading,
        }
    }
}

impl<T> IntoResultState<T> for AppResult<T> {
    fn into_result_state(self) -> ResultState<T> {
        match self {
            Ok(value) => ResultState::Ready { value },
            Err(error) => ResultState::Failed { error },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn none_is_loading() {
        let state: ResultState<u32> = ResultState::normalize(None);
        assert!(state.is_loading());
        assert_eq!(state.value(), None);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn falsy_values_are_ready() {
        assert_eq!(ResultState::normalize(Some(0)), ResultState::ready(0));
        assert_eq!(ResultState::normalize(Some(false)), ResultState::ready(false));
        assert_eq!(
            ResultState::normalize(Some(String::new())),
            ResultState::ready(String::new())
        );
    }

    #[test]
    fn errors_become_failed() {
        let state: ResultState<u32> = ResultState::normalize(ApplicationError::unset_version());
        assert!(state.is_failed());
        assert_eq!(state.error(), Some(&ApplicationError::unset_version()));

        let state: ResultState<u32> =
            ResultState::normalize(Err::<u32, _>(ApplicationError::unexpected("x")));
        assert!(state.is_failed());
    }

    #[test]
    fn tagged_states_pass_through() {
        let inner = ResultState::failed(ApplicationError::unset_version());
        assert_eq!(ResultState::<u8>::normalize(inner.clone()), inner);
        assert_eq!(
            ResultState::<u8>::normalize(ResultState::Loading),
            ResultState::Loading
        );
    }

    #[test]
    fn resolve_collapses_states() {
        assert_eq!(ResultState::ready(5).resolve(), Some(5));
        assert_eq!(ResultState::<u8>::Loading.resolve(), None);

        let loading: ResultState<&str> = ResultState::Loading;
        assert_eq!(loading.resolve_with("spinner", |_| "broken"), "spinner");
        let failed: ResultState<&str> = ResultState::failed(ApplicationError::unset_version());
        assert_eq!(failed.resolve_with("spinner", |_| "broken"), "broken");
    }

    #[test]
    fn and_then_propagates_failure() {
        let state = ResultState::ready("12").and_then(|raw| {
            raw.parse::<u32>()
                .map_err(|e| ApplicationError::unexpected(e.to_string()))
        });
        assert_eq!(state, ResultState::ready(12));

        let state = ResultState::ready("x").and_then(|raw| {
            raw.parse::<u32>()
                .map_err(|e| ApplicationError::unexpected(e.to_string()))
        });
        assert!(state.is_failed());
    }

    #[test]
    fn classify_json_follows_shape_rules() {
        assert!(ResultState::classify_json(Value::Null).is_loading());
        assert_eq!(
            ResultState::classify_json(json!(0)),
            ResultState::ready(json!(0))
        );
        assert_eq!(
            ResultState::classify_json(json!({"kind": "unknown_version", "version": "9.9-stable"})),
            ResultState::failed(ApplicationError::unknown_version("9.9-stable"))
        );
        assert_eq!(
            ResultState::classify_json(json!({"state": "ready", "value": [1, 2]})),
            ResultState::ready(json!([1, 2]))
        );
        // `kind` that is not a string is ordinary data
        assert_eq!(
            ResultState::classify_json(json!({"kind": 4})),
            ResultState::ready(json!({"kind": 4}))
        );
    }

    #[test]
    fn classify_json_maps_unknown_kinds_to_unexpected() {
        let state = ResultState::classify_json(json!({"kind": "martian"}));
        assert!(matches!(
            state.error(),
            Some(ApplicationError::Unexpected { reason: Some(_) })
        ));
    }

    #[test]
    fn serializes_with_state_tag() {
        let value = serde_json::to_value(ResultState::ready(1)).unwrap();
        assert_eq!(value, json!({"state": "ready", "value": 1}));
        let value = serde_json::to_value(ResultState::<u8>::Loading).unwrap();
        assert_eq!(value, json!({"state": "loading"}));
    }
}
