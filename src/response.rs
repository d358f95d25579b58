//! Typed, read-only views over parsed response documents.

use serde::Serialize;

use crate::error::{AsinError, Result};
use crate::xml::{CONTENT_KEY, Value};

/// A representation an operation result can be turned into.
///
/// Implemented for [`Value`] (the plain parsed mapping) and for the typed
/// views [`Item`], [`Cart`] and [`Node`].
pub trait ResponseView: Sized {
    /// Builds the view from the result subtree of a response.
    fn from_value(value: Value) -> Result<Self>;

    /// The underlying parsed data.
    fn raw(&self) -> &Value;
}

impl ResponseView for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }

    fn raw(&self) -> &Value {
        self
    }
}

/// Text of a node; elements carrying attributes keep it under `__content__`.
fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::Text(text) => Some(text),
        Value::Map(_) => value.get(CONTENT_KEY).and_then(Value::as_str),
        _ => None,
    }
}

fn text_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    value.path(keys).and_then(text_of)
}

fn list_at<'a>(value: &'a Value, keys: &[&str]) -> Vec<&'a Value> {
    value.path(keys).map(Value::to_list).unwrap_or_default()
}

fn expect_map(value: Value, what: &str) -> Result<Value> {
    match value {
        Value::Map(_) => Ok(value),
        other => Err(AsinError::UnexpectedResponse(format!(
            "expected {what} element, got {other:?}"
        ))),
    }
}

/// A catalog item (`<Item>` element).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Item {
    raw: Value,
}

impl ResponseView for Item {
    fn from_value(value: Value) -> Result<Self> {
        Ok(Self {
            raw: expect_map(value, "Item")?,
        })
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Item {
    pub fn into_raw(self) -> Value {
        self.raw
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", key])
    }

    pub fn asin(&self) -> Option<&str> {
        text_at(&self.raw, &["ASIN"])
    }

    pub fn title(&self) -> Option<&str> {
        self.attribute("Title")
    }

    /// List price in the smallest currency unit.
    pub fn amount(&self) -> Option<i64> {
        text_at(&self.raw, &["ItemAttributes", "ListPrice", "Amount"])?
            .parse()
            .ok()
    }

    /// List price in cents, falling back to the lowest used price.
    pub fn cents(&self) -> Option<i64> {
        self.amount().or_else(|| {
            text_at(&self.raw, &["OfferSummary", "LowestUsedPrice", "Amount"])?
                .parse()
                .ok()
        })
    }

    pub fn details_url(&self) -> Option<&str> {
        text_at(&self.raw, &["DetailPageURL"])
    }

    pub fn sales_rank(&self) -> Option<&str> {
        text_at(&self.raw, &["SalesRank"])
    }

    /// Content of the first editorial review.
    pub fn review(&self) -> Option<&str> {
        list_at(&self.raw, &["EditorialReviews", "EditorialReview"])
            .into_iter()
            .find_map(|review| text_at(review, &["Content"]))
    }

    /// Editorial reviews joined by `.`, or the feature bullets if there are none.
    pub fn description(&self) -> Option<String> {
        let reviews: Vec<&str> = list_at(&self.raw, &["EditorialReviews", "EditorialReview"])
            .into_iter()
            .filter_map(|review| text_at(review, &["Content"]))
            .collect();
        if !reviews.is_empty() {
            return Some(reviews.join("."));
        }
        let features: Vec<&str> = list_at(&self.raw, &["ItemAttributes", "Feature"])
            .into_iter()
            .filter_map(text_of)
            .collect();
        if features.is_empty() {
            None
        } else {
            Some(features.join("."))
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        text_at(&self.raw, &["LargeImage", "URL"])
    }

    /// All authors; a single `<Author>` yields a one-element list.
    pub fn author(&self) -> Vec<&str> {
        list_at(&self.raw, &["ItemAttributes", "Author"])
            .into_iter()
            .filter_map(text_of)
            .collect()
    }

    pub fn binding(&self) -> Option<&str> {
        self.attribute("Binding")
    }

    pub fn brand(&self) -> Option<&str> {
        self.attribute("Brand")
    }

    pub fn ean(&self) -> Option<&str> {
        self.attribute("EAN")
    }

    pub fn edition(&self) -> Option<&str> {
        self.attribute("Edition")
    }

    pub fn isbn(&self) -> Option<&str> {
        self.attribute("ISBN")
    }

    pub fn item_dimensions(&self) -> Option<&Value> {
        self.raw.path(&["ItemAttributes", "ItemDimensions"])
    }

    /// Hundredths of an inch.
    pub fn item_height(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "ItemDimensions", "Height"])
    }

    /// Hundredths of an inch.
    pub fn item_length(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "ItemDimensions", "Length"])
    }

    /// Hundredths of an inch.
    pub fn item_width(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "ItemDimensions", "Width"])
    }

    /// Hundredths of a pound.
    pub fn item_weight(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "ItemDimensions", "Weight"])
    }

    pub fn package_dimensions(&self) -> Option<&Value> {
        self.raw.path(&["ItemAttributes", "PackageDimensions"])
    }

    /// Hundredths of an inch.
    pub fn package_height(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "PackageDimensions", "Height"])
    }

    /// Hundredths of an inch.
    pub fn package_length(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "PackageDimensions", "Length"])
    }

    /// Hundredths of an inch.
    pub fn package_width(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "PackageDimensions", "Width"])
    }

    /// Hundredths of a pound.
    pub fn package_weight(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "PackageDimensions", "Weight"])
    }

    pub fn label(&self) -> Option<&str> {
        self.attribute("Label")
    }

    /// Name of the first listed language.
    pub fn language(&self) -> Option<&str> {
        list_at(&self.raw, &["ItemAttributes", "Languages", "Language"])
            .into_iter()
            .find_map(|language| text_at(language, &["Name"]))
    }

    pub fn formatted_price(&self) -> Option<&str> {
        text_at(&self.raw, &["ItemAttributes", "ListPrice", "FormattedPrice"])
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.attribute("Manufacturer")
    }

    pub fn mpn(&self) -> Option<&str> {
        self.attribute("MPN")
    }

    pub fn page_count(&self) -> Option<&str> {
        self.attribute("NumberOfPages")
    }

    pub fn part_number(&self) -> Option<&str> {
        self.attribute("PartNumber")
    }

    pub fn product_group(&self) -> Option<&str> {
        self.attribute("ProductGroup")
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.attribute("PublicationDate")
    }

    pub fn publisher(&self) -> Option<&str> {
        self.attribute("Publisher")
    }

    pub fn sku(&self) -> Option<&str> {
        self.attribute("SKU")
    }

    pub fn studio(&self) -> Option<&str> {
        self.attribute("Studio")
    }

    pub fn total_new(&self) -> Option<&str> {
        text_at(&self.raw, &["OfferSummary", "TotalNew"])
    }

    pub fn total_used(&self) -> Option<&str> {
        text_at(&self.raw, &["OfferSummary", "TotalUsed"])
    }
}

/// A remote shopping cart (`<Cart>` element).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    raw: Value,
}

impl ResponseView for Cart {
    fn from_value(value: Value) -> Result<Self> {
        Ok(Self {
            raw: expect_map(value, "Cart")?,
        })
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Cart {
    pub fn into_raw(self) -> Value {
        self.raw
    }

    pub fn cart_id(&self) -> Option<&str> {
        text_at(&self.raw, &["CartId"])
    }

    pub fn hmac(&self) -> Option<&str> {
        text_at(&self.raw, &["HMAC"])
    }

    pub fn url_encoded_hmac(&self) -> Option<&str> {
        text_at(&self.raw, &["URLEncodedHMAC"])
    }

    /// Purchase URL that merges the remote cart into a customer's cart.
    pub fn url(&self) -> Option<&str> {
        text_at(&self.raw, &["PurchaseURL"])
    }

    pub fn price(&self) -> Option<&str> {
        text_at(&self.raw, &["SubTotal", "FormattedPrice"])
    }

    pub fn items(&self) -> Vec<CartEntry<'_>> {
        list_at(&self.raw, &["CartItems", "CartItem"])
            .into_iter()
            .map(CartEntry::new)
            .collect()
    }

    pub fn saved_items(&self) -> Vec<CartEntry<'_>> {
        list_at(&self.raw, &["SavedForLaterItems", "SavedForLaterItem"])
            .into_iter()
            .map(CartEntry::new)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        text_at(&self.raw, &["Request", "IsValid"]) == Some("True")
    }

    pub fn is_empty(&self) -> bool {
        self.raw.path(&["CartItems"]).is_none()
    }

    /// `(CartId, HMAC)` identifying this cart in follow-up operations.
    pub(crate) fn identity(&self) -> Result<(&str, &str)> {
        match (self.cart_id(), self.hmac()) {
            (Some(cart_id), Some(hmac)) => Ok((cart_id, hmac)),
            _ => Err(AsinError::Config(
                "cart is missing CartId or HMAC".to_string(),
            )),
        }
    }
}

/// One line of a cart (`<CartItem>` or `<SavedForLaterItem>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry<'a> {
    raw: &'a Value,
}

impl<'a> CartEntry<'a> {
    fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn cart_item_id(&self) -> Option<&'a str> {
        text_at(self.raw, &["CartItemId"])
    }

    pub fn asin(&self) -> Option<&'a str> {
        text_at(self.raw, &["ASIN"])
    }

    pub fn quantity(&self) -> Option<u32> {
        text_at(self.raw, &["Quantity"])?.parse().ok()
    }

    pub fn title(&self) -> Option<&'a str> {
        text_at(self.raw, &["Title"])
    }

    pub fn price(&self) -> Option<&'a str> {
        text_at(self.raw, &["Price", "FormattedPrice"])
    }

    pub fn item_total(&self) -> Option<&'a str> {
        text_at(self.raw, &["ItemTotal", "FormattedPrice"])
    }
}

/// A browse node of the catalog taxonomy (`<BrowseNode>` element).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Node {
    raw: Value,
}

impl ResponseView for Node {
    fn from_value(value: Value) -> Result<Self> {
        Ok(Self {
            raw: expect_map(value, "BrowseNode")?,
        })
    }

    fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Node {
    pub fn into_raw(self) -> Value {
        self.raw
    }

    pub fn name(&self) -> Option<&str> {
        text_at(&self.raw, &["Name"])
    }

    pub fn node_id(&self) -> Option<&str> {
        text_at(&self.raw, &["BrowseNodeId"])
    }

    pub fn is_category_root(&self) -> bool {
        text_at(&self.raw, &["IsCategoryRoot"]) == Some("1")
    }

    pub fn children(&self) -> Vec<Node> {
        self.related(&["Children", "BrowseNode"])
    }

    pub fn ancestors(&self) -> Vec<Node> {
        self.related(&["Ancestors", "BrowseNode"])
    }

    /// Top items of every `<TopItemSet>` the node carries.
    pub fn top_item_set(&self) -> Vec<&Value> {
        list_at(&self.raw, &["TopItemSet"])
            .into_iter()
            .flat_map(|set| list_at(set, &["TopItem"]))
            .collect()
    }

    fn related(&self, keys: &[&str]) -> Vec<Node> {
        list_at(&self.raw, keys)
            .into_iter()
            .filter(|value| value.as_map().is_some())
            .map(|value| Node { raw: value.clone() })
            .collect()
    }
}
