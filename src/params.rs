//! Request parameters and cart item shaping.

use std::collections::BTreeMap;

/// A single request parameter value.
///
/// List values are sent as their trimmed elements joined with `,`, which is
/// how multiple response groups (`Small,AlternateVersions`) are expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// The string that gets percent-encoded into the query.
    pub fn to_query_value(&self) -> String {
        match self {
            ParamValue::Single(value) => value.clone(),
            ParamValue::List(values) => values
                .iter()
                .map(|v| v.trim())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Single(value.clone())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ParamValue {
    fn from(values: &[&str]) -> Self {
        ParamValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(values: [&str; N]) -> Self {
        ParamValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Request parameters keyed by their API name (`ResponseGroup`, `ItemId`, ...).
///
/// Setting a key twice keeps the last value. Iteration order is by key and
/// carries no meaning for the request; signing imposes its own order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or overwrites a parameter, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Copies every entry of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: Params) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// One entry of a cart operation (`CartCreate`, `CartAdd`, `CartModify`).
///
/// Items are addressed either by `asin`/`offer_listing_id` (adding) or by
/// `cart_item_id` (modifying). `action` is e.g. `SaveForLater` or `MoveToCart`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartItem {
    pub asin: Option<String>,
    pub quantity: Option<String>,
    pub cart_item_id: Option<String>,
    pub offer_listing_id: Option<String>,
    pub action: Option<String>,
}

impl CartItem {
    /// An item identified by its ASIN.
    pub fn asin(asin: impl Into<String>, quantity: u32) -> Self {
        Self {
            asin: Some(asin.into()),
            quantity: Some(quantity.to_string()),
            ..Self::default()
        }
    }

    /// An item identified by a specific offer listing.
    pub fn offer_listing(offer_listing_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            offer_listing_id: Some(offer_listing_id.into()),
            quantity: Some(quantity.to_string()),
            ..Self::default()
        }
    }

    /// An item already in a cart, identified by its `CartItemId`.
    pub fn cart_item(cart_item_id: impl Into<String>) -> Self {
        Self {
            cart_item_id: Some(cart_item_id.into()),
            ..Self::default()
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity.to_string());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Builds an item from loosely typed `key => value` pairs.
    ///
    /// Recognised keys are `asin`, `quantity`, `cart_item_id`,
    /// `offer_listing_id` and `action`; anything else is ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        let mut item = CartItem::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match key.as_ref() {
                "asin" => item.asin = value,
                "quantity" => item.quantity = value,
                "cart_item_id" => item.cart_item_id = value,
                "offer_listing_id" => item.offer_listing_id = value,
                "action" => item.action = value,
                _ => {}
            }
        }
        item
    }

    fn fields(&self) -> [(&'static str, Option<&String>); 5] {
        [
            ("ASIN", self.asin.as_ref()),
            ("Quantity", self.quantity.as_ref()),
            ("CartItemId", self.cart_item_id.as_ref()),
            ("OfferListingId", self.offer_listing_id.as_ref()),
            ("Action", self.action.as_ref()),
        ]
    }
}

/// Expands cart items into `Item.{index}.{Field}` parameters.
///
/// The index is the zero-based position of the item in `items`.
pub fn item_params(items: &[CartItem]) -> Params {
    let mut params = Params::new();
    for (i, item) in items.iter().enumerate() {
        for (field, value) in item.fields() {
            if let Some(value) = value {
                params.insert(format!("Item.{i}.{field}"), value.as_str());
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_values_are_trimmed_and_joined() {
        let value = ParamValue::from(vec!["a", " b ", "c"]);
        assert_eq!(value.to_query_value(), "a,b,c");
    }

    #[test]
    fn single_values_are_kept_verbatim() {
        let value = ParamValue::from(" spaced ");
        assert_eq!(value.to_query_value(), " spaced ");
    }

    #[test]
    fn later_insert_overwrites() {
        let params = Params::new()
            .with("ResponseGroup", "Small")
            .with("ResponseGroup", ["Medium", "Images"]);
        assert_eq!(params.len(), 1);
        assert_eq!(
            params.get("ResponseGroup"),
            Some(&ParamValue::List(vec!["Medium".into(), "Images".into()]))
        );
    }

    #[test]
    fn merge_prefers_other() {
        let mut params = Params::new().with("SearchIndex", "Books").with("Keywords", "rust");
        params.merge(Params::new().with("SearchIndex", "Music"));
        assert_eq!(params.get("SearchIndex"), Some(&ParamValue::from("Music")));
        assert_eq!(params.get("Keywords"), Some(&ParamValue::from("rust")));
    }

    #[test]
    fn item_params_are_positional() {
        let params = item_params(&[
            CartItem::asin("X", 1),
            CartItem::cart_item("Y").with_quantity(2),
        ]);
        let expected: Params = [
            ("Item.0.ASIN", "X"),
            ("Item.0.Quantity", "1"),
            ("Item.1.CartItemId", "Y"),
            ("Item.1.Quantity", "2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn item_params_cover_every_field() {
        let params = item_params(&[
            CartItem::asin("any_asin", 1),
            CartItem::cart_item("any_cart_item_id").with_quantity(2),
            CartItem::offer_listing("any_offer_listing_id", 3),
            CartItem::cart_item("any_cart_item_id").with_action("SaveForLater"),
        ]);
        let expected: Params = [
            ("Item.0.ASIN", "any_asin"),
            ("Item.0.Quantity", "1"),
            ("Item.1.CartItemId", "any_cart_item_id"),
            ("Item.1.Quantity", "2"),
            ("Item.2.OfferListingId", "any_offer_listing_id"),
            ("Item.2.Quantity", "3"),
            ("Item.3.CartItemId", "any_cart_item_id"),
            ("Item.3.Action", "SaveForLater"),
        ]
        .into_iter()
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn from_pairs_drops_unknown_keys() {
        let item = CartItem::from_pairs([("asin", "X"), ("colour", "red"), ("quantity", "4")]);
        assert_eq!(item, CartItem::asin("X", 4));

        let params = item_params(&[item]);
        assert_eq!(params.len(), 2);
        assert!(!params.iter().any(|(k, _)| k.contains("colour")));
    }
}
