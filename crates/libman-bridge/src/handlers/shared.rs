//! Shared handler utilities used across RPC domains.

use serde_json::Value;

/// Extract an optional string parameter, supporting both snake_case and camelCase.
pub(crate) fn get_str_param<'a>(params: &'a Value, snake: &str, camel: &str) -> Option<&'a str> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_str())
}

/// Extract a required string parameter or return an error.
pub(crate) fn require_str_param(
    params: &Value,
    snake: &str,
    camel: &str,
) -> libman_core::Result<String> {
    get_str_param(params, snake, camel)
        .map(String::from)
        .ok_or_else(|| libman_core::LibmanError::InvalidParams {
            message: format!("Missing required parameter: {}", snake),
        })
}

/// Extract an optional bool parameter, supporting both snake_case and camelCase.
pub(crate) fn get_bool_param(params: &Value, snake: &str, camel: &str) -> Option<bool> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .and_then(|v| v.as_bool())
}

/// Extract a required parameter of any JSON type.
pub(crate) fn require_param<'a>(
    params: &'a Value,
    snake: &str,
    camel: &str,
) -> libman_core::Result<&'a Value> {
    params
        .get(snake)
        .or_else(|| params.get(camel))
        .ok_or_else(|| libman_core::LibmanError::InvalidParams {
            message: format!("Missing required parameter: {}", snake),
        })
}
