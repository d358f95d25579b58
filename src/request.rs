//! Request building and signing logic for the product API.

use chrono::{DateTime, Utc};

use crate::config::{ClientConfig, PATH};
use crate::credential::Credential;
use crate::error::Result;
use crate::params::{CartItem, Params, item_params};
use crate::sign::sign_query;

/// Value of the `Service` parameter sent with every request.
pub const SERVICE: &str = "AWSECommerceService";

/// Formats a timestamp the way the service expects it (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Builds the signed query string for `params` as of `at`.
///
/// Starts from the configured default params, lets `params` override them,
/// then injects `Service`, `AWSAccessKeyId` and `Timestamp`, plus `Version`
/// and `AssociateTag` when they are configured. Injected keys overwrite
/// caller values.
///
/// # Errors
///
/// Returns [`crate::AsinError::Config`] if the access key or secret is empty
/// or the configuration is invalid.
pub fn signed_query(
    params: &Params,
    credential: &Credential,
    config: &ClientConfig,
    at: DateTime<Utc>,
) -> Result<String> {
    credential.validate()?;
    config.validate()?;

    let mut all_params = config.default_params.clone();
    all_params.merge(params.clone());
    all_params.insert("Service", SERVICE);
    all_params.insert("AWSAccessKeyId", credential.access_key_id.as_str());
    if let Some(version) = config.version() {
        all_params.insert("Version", version);
    }
    if let Some(tag) = credential.associate_tag() {
        all_params.insert("AssociateTag", tag);
    }
    all_params.insert("Timestamp", format_timestamp(at));

    sign_query(&config.host, PATH, &all_params, &credential.secret_access_key)
}

/// Builds the full signed request URL, `{scheme}://{host}/onca/xml?{query}`.
pub fn signed_url(
    params: &Params,
    credential: &Credential,
    config: &ClientConfig,
    at: DateTime<Utc>,
) -> Result<String> {
    let query = signed_query(params, credential, config, at)?;
    Ok(format!("{}?{}", config.endpoint(), query))
}

/// Uses `params` if the caller passed any, otherwise the operation defaults.
fn or_defaults(params: Params, defaults: &[(&str, &str)]) -> Params {
    if params.is_empty() {
        defaults.iter().copied().collect()
    } else {
        params
    }
}

pub(crate) fn lookup_params(asins: &[&str], params: Params) -> Params {
    or_defaults(params, &[("ResponseGroup", "Medium")])
        .with("Operation", "ItemLookup")
        .with("ItemId", asins.join(","))
}

pub(crate) fn search_keywords_params(keywords: &[&str], params: Params) -> Params {
    or_defaults(params, &[("SearchIndex", "Books"), ("ResponseGroup", "Medium")])
        .with("Operation", "ItemSearch")
        .with("Keywords", keywords.join(" "))
}

pub(crate) fn search_params(params: Params) -> Params {
    or_defaults(params, &[("SearchIndex", "Books"), ("ResponseGroup", "Medium")])
        .with("Operation", "ItemSearch")
}

pub(crate) fn similar_params(asins: &[&str], params: Params) -> Params {
    or_defaults(params, &[("ResponseGroup", "Medium")])
        .with("Operation", "SimilarityLookup")
        .with("ItemId", asins.join(","))
}

pub(crate) fn browse_node_params(node_id: &str, params: Params) -> Params {
    or_defaults(params, &[("ResponseGroup", "BrowseNodeInfo")])
        .with("Operation", "BrowseNodeLookup")
        .with("BrowseNodeId", node_id)
}

/// Cart operations understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CartOperation {
    Create,
    Get,
    Add,
    Modify,
    Clear,
}

impl CartOperation {
    pub(crate) fn name(self) -> &'static str {
        match self {
            CartOperation::Create => "CartCreate",
            CartOperation::Get => "CartGet",
            CartOperation::Add => "CartAdd",
            CartOperation::Modify => "CartModify",
            CartOperation::Clear => "CartClear",
        }
    }

    /// Top-level element of the response document.
    pub(crate) fn response_element(self) -> String {
        format!("{}Response", self.name())
    }
}

/// Parameters of a cart operation. `cart` is the `(CartId, HMAC)` pair of an
/// existing cart and is absent only for `CartCreate`.
pub(crate) fn cart_params(
    operation: CartOperation,
    cart: Option<(&str, &str)>,
    items: &[CartItem],
) -> Params {
    let mut params = item_params(items);
    if let Some((cart_id, hmac)) = cart {
        params.insert("CartId", cart_id);
        params.insert("HMAC", hmac);
    }
    params.with("Operation", operation.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AsinError;
    use crate::params::ParamValue;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn test_credential() -> Credential {
        Credential::new("AKIA_TEST", "s3cr3t")
    }

    #[test]
    fn timestamp_format() {
        let at = Utc.with_ymd_and_hms(2011, 8, 1, 9, 5, 7).unwrap();
        assert_eq!(format_timestamp(at), "2011-08-01T09:05:07Z");
    }

    #[test]
    fn golden_lookup_request() {
        let config = ClientConfig::default().with_host("webservices.example.com");
        let params = Params::new()
            .with("Operation", "ItemLookup")
            .with("ItemId", "1430218150");

        let query = signed_query(&params, &test_credential(), &config, fixed_time()).unwrap();
        assert_eq!(
            query,
            "AWSAccessKeyId=AKIA_TEST&ItemId=1430218150&Operation=ItemLookup\
             &Service=AWSECommerceService&Timestamp=2020-01-01T00%3A00%3A00Z\
             &Signature=NW0pcPE8xjFEMo%2FciRbaMmSQbo%2FlDNRAaX4%2FbwCtpbs%3D"
        );
    }

    #[test]
    fn golden_search_request_with_version_and_tag() {
        let config = ClientConfig::default().with_version("2011-08-01");
        let credential = test_credential().with_associate_tag("tag-20");
        let params = Params::new()
            .with("Operation", "ItemSearch")
            .with("Keywords", "nirvana never mind")
            .with("SearchIndex", "Music")
            .with("ResponseGroup", vec!["Small", " AlternateVersions "]);

        let query = signed_query(&params, &credential, &config, fixed_time()).unwrap();
        assert_eq!(
            query,
            "AWSAccessKeyId=AKIA_TEST&AssociateTag=tag-20&Keywords=nirvana%20never%20mind\
             &Operation=ItemSearch&ResponseGroup=Small%2CAlternateVersions&SearchIndex=Music\
             &Service=AWSECommerceService&Timestamp=2020-01-01T00%3A00%3A00Z&Version=2011-08-01\
             &Signature=joHnOS2qYYUwqDDvjCnE6%2BWXDySC%2Ft5AsjCBAiV7G2s%3D"
        );
    }

    #[test]
    fn injected_fields_overwrite_caller_values() {
        let params = Params::new()
            .with("Service", "Other")
            .with("AWSAccessKeyId", "spoofed")
            .with("Timestamp", "yesterday");
        let query = signed_query(
            &params,
            &test_credential(),
            &ClientConfig::default(),
            fixed_time(),
        )
        .unwrap();
        assert!(query.contains("Service=AWSECommerceService"));
        assert!(query.contains("AWSAccessKeyId=AKIA_TEST"));
        assert!(query.contains("Timestamp=2020-01-01T00%3A00%3A00Z"));
        assert!(!query.contains("spoofed"));
        assert!(!query.contains("yesterday"));
    }

    #[test]
    fn call_params_override_configured_defaults() {
        let config = ClientConfig::default()
            .with_default_param("Condition", "New")
            .with_default_param("MerchantId", "Amazon");
        let params = Params::new().with("Condition", "Used");
        let query = signed_query(&params, &test_credential(), &config, fixed_time()).unwrap();
        assert!(query.contains("Condition=Used"));
        assert!(query.contains("MerchantId=Amazon"));
        assert!(!query.contains("Condition=New"));
    }

    #[test]
    fn missing_credentials_fail_before_signing() {
        let config = ClientConfig::default();
        let err = signed_query(
            &Params::new(),
            &Credential::new("", "secret"),
            &config,
            fixed_time(),
        )
        .unwrap_err();
        assert!(matches!(err, AsinError::Config(_)));

        let err = signed_query(
            &Params::new(),
            &Credential::new("key", ""),
            &config,
            fixed_time(),
        )
        .unwrap_err();
        assert!(matches!(err, AsinError::Config(_)));
    }

    #[test]
    fn signed_url_layout() {
        let url = signed_url(
            &Params::new().with("Operation", "ItemLookup"),
            &test_credential(),
            &ClientConfig::default(),
            fixed_time(),
        )
        .unwrap();
        assert!(url.starts_with("http://webservices.amazon.com/onca/xml?AWSAccessKeyId=AKIA_TEST&"));
        assert!(url.contains("&Signature="));
    }

    #[test]
    fn lookup_uses_defaults_only_without_params() {
        let params = lookup_params(&["1430218150", "0439023521"], Params::new());
        assert_eq!(params.get("Operation"), Some(&ParamValue::from("ItemLookup")));
        assert_eq!(
            params.get("ItemId"),
            Some(&ParamValue::from("1430218150,0439023521"))
        );
        assert_eq!(params.get("ResponseGroup"), Some(&ParamValue::from("Medium")));

        let params = lookup_params(&["1430218150"], Params::new().with("Condition", "All"));
        assert!(params.get("ResponseGroup").is_none());
        assert_eq!(params.get("Condition"), Some(&ParamValue::from("All")));
    }

    #[test]
    fn search_keywords_joins_with_space() {
        let params = search_keywords_params(&["Learn", "Objective-C"], Params::new());
        assert_eq!(params.get("Keywords"), Some(&ParamValue::from("Learn Objective-C")));
        assert_eq!(params.get("SearchIndex"), Some(&ParamValue::from("Books")));

        let params =
            search_keywords_params(&["nirvana", "never mind"], Params::new().with("SearchIndex", "Music"));
        assert_eq!(params.get("SearchIndex"), Some(&ParamValue::from("Music")));
        assert!(params.get("ResponseGroup").is_none());
    }

    #[test]
    fn search_without_params_uses_defaults() {
        let params = search_params(Params::new());
        assert_eq!(params.get("Operation"), Some(&ParamValue::from("ItemSearch")));
        assert_eq!(params.get("SearchIndex"), Some(&ParamValue::from("Books")));
        assert_eq!(params.get("ResponseGroup"), Some(&ParamValue::from("Medium")));
    }

    #[test]
    fn similar_and_browse_node_params() {
        let params = similar_params(
            &["1430218150", "1430216263"],
            Params::new().with("SimilarityType", "Intersection"),
        );
        assert_eq!(params.get("Operation"), Some(&ParamValue::from("SimilarityLookup")));
        assert_eq!(params.get("ItemId"), Some(&ParamValue::from("1430218150,1430216263")));

        let params = browse_node_params("599826", Params::new());
        assert_eq!(params.get("BrowseNodeId"), Some(&ParamValue::from("599826")));
        assert_eq!(params.get("ResponseGroup"), Some(&ParamValue::from("BrowseNodeInfo")));
    }

    #[test]
    fn cart_params_include_cart_identity() {
        let params = cart_params(
            CartOperation::Add,
            Some(("186-8702292-9782208", "Ck5MXUE+OQiC/Jh8u6NhBf5FbV8=")),
            &[CartItem::asin("1430216263", 2)],
        );
        assert_eq!(params.get("Operation"), Some(&ParamValue::from("CartAdd")));
        assert_eq!(params.get("CartId"), Some(&ParamValue::from("186-8702292-9782208")));
        assert_eq!(
            params.get("HMAC"),
            Some(&ParamValue::from("Ck5MXUE+OQiC/Jh8u6NhBf5FbV8="))
        );
        assert_eq!(params.get("Item.0.ASIN"), Some(&ParamValue::from("1430216263")));
        assert_eq!(params.get("Item.0.Quantity"), Some(&ParamValue::from("2")));
        assert_eq!(CartOperation::Add.response_element(), "CartAddResponse");
    }

    #[test]
    fn cart_create_has_no_cart_identity() {
        let params = cart_params(CartOperation::Create, None, &[CartItem::asin("X", 1)]);
        assert!(!params.contains_key("CartId"));
        assert!(!params.contains_key("HMAC"));
        assert_eq!(params.get("Operation"), Some(&ParamValue::from("CartCreate")));
    }
}
