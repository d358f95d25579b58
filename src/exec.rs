//! Common execution utilities for async and blocking clients.

use chrono::Utc;

use crate::config::ClientConfig;
use crate::credential::Credential;
use crate::error::{AsinError, MAX_ERROR_BODY_CHARS, Result, truncate_str};
use crate::params::Params;
use crate::request::signed_url;
use crate::response::ResponseView;
use crate::xml::{self, Value};

/// Signs `params` as of now and returns the request URL.
pub(crate) fn prepare(params: &Params, credential: &Credential, config: &ClientConfig) -> Result<String> {
    if config.logging {
        log::debug!("calling with params={:?}", params);
    }
    let url = signed_url(params, credential, config, Utc::now())?;
    if config.logging {
        log::info!("performing rest call to url='{}'", url);
    }
    Ok(url)
}

/// Handles response parsing for both success and error cases.
pub(crate) fn handle_response(
    status: reqwest::StatusCode,
    text: String,
    config: &ClientConfig,
) -> Result<Value> {
    if status == reqwest::StatusCode::OK {
        if config.logging {
            log::debug!("got response='{}'", text);
        }
        xml::parse(&text)
    } else {
        if config.logging {
            log::error!("got response='{}'", text);
        }
        Err(parse_error_response(status, &text))
    }
}

/// Maps a non-200 response to an [`AsinError`].
///
/// Bodies carrying an `<Error>` element with a `<Code>` become
/// [`AsinError::Api`]; everything else becomes [`AsinError::Http`].
pub(crate) fn parse_error_response(status: reqwest::StatusCode, text: &str) -> AsinError {
    let api_error = xml::parse(text).ok().and_then(|value| {
        find_error(&value).map(|(code, message)| AsinError::Api {
            status: status.as_u16(),
            code: code.to_string(),
            message: message.to_string(),
        })
    });
    api_error.unwrap_or_else(|| AsinError::Http {
        status: status.as_u16(),
        body: truncate_str(text, MAX_ERROR_BODY_CHARS).to_string(),
    })
}

/// First `Error` element with a `Code`, searched depth first.
fn find_error(value: &Value) -> Option<(&str, &str)> {
    match value {
        Value::Map(map) => {
            if let Some(error) = map.get("Error").and_then(|e| e.to_list().into_iter().next())
                && let Some(code) = error.path_str(&["Code"])
            {
                return Some((code, error.path_str(&["Message"]).unwrap_or_default()));
            }
            map.values().find_map(find_error)
        }
        Value::List(values) => values.iter().find_map(find_error),
        _ => None,
    }
}

/// Extracts the list at `{operation}Response.{container}.{element}` and maps
/// every entry to `T`. A missing list is empty.
pub(crate) fn collect<T: ResponseView>(
    value: Value,
    operation: &str,
    container: &str,
    element: &str,
) -> Result<Vec<T>> {
    let root = format!("{operation}Response");
    value
        .into_path(&[root.as_str(), container, element])
        .map(Value::into_list)
        .unwrap_or_default()
        .into_iter()
        .map(T::from_value)
        .collect()
}

/// Items of an item operation (`ItemLookup`, `ItemSearch`, `SimilarityLookup`).
pub(crate) fn items<T: ResponseView>(value: Value, operation: &str) -> Result<Vec<T>> {
    collect(value, operation, "Items", "Item")
}

/// Nodes of a `BrowseNodeLookup` response.
pub(crate) fn nodes<T: ResponseView>(value: Value) -> Result<Vec<T>> {
    collect(value, "BrowseNodeLookup", "BrowseNodes", "BrowseNode")
}

/// The `Cart` element of a cart operation response.
pub(crate) fn cart<T: ResponseView>(value: Value, response_element: &str) -> Result<T> {
    let cart = value
        .into_path(&[response_element, "Cart"])
        .filter(|cart| !cart.is_null())
        .ok_or_else(|| {
            AsinError::UnexpectedResponse(format!("{response_element} carries no Cart"))
        })?;
    T::from_value(cart)
}
