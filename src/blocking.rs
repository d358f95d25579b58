//! Synchronous (blocking) client for the product API.
//!
//! This module is only available when the `blocking` feature is enabled.
//! It mirrors the async [`crate::client::Client`] API using `reqwest::blocking`.
//!
//! # Example
//!
//! ```no_run
//! use asin::blocking::Client;
//! use asin::{CartItem, Credential, Params};
//!
//! fn main() -> asin::Result<()> {
//!     let client = Client::new(Credential::new("key", "secret"))?;
//!
//!     let items = client.lookup(&["1430218150"], Params::new())?;
//!     println!("{:?}", items.first().and_then(|item| item.title()));
//!
//!     let cart = client.create_cart(&[CartItem::asin("1430218150", 1)])?;
//!     println!("checkout at {:?}", cart.url());
//!     Ok(())
//! }
//! ```

use crate::config::ClientConfig;
use crate::credential::{ChainProvider, Credential, CredentialProvider};
use crate::error::{AsinError, Result};
use crate::exec::{self, handle_response, prepare};
use crate::params::{CartItem, Params};
use crate::request::{
    CartOperation, browse_node_params, cart_params, lookup_params, search_keywords_params,
    search_params, similar_params,
};
use crate::response::{Cart, Item, Node, ResponseView};
use crate::xml::Value;

/// Synchronous client for the product API.
pub struct Client {
    http: reqwest::blocking::Client,
    config: ClientConfig,
    credential: Credential,
}

impl Client {
    /// Creates a new blocking client with an explicit credential.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Creates a new blocking client with custom configuration.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AsinError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            credential,
        })
    }

    /// Creates a new blocking client using the default credential chain.
    pub fn from_env() -> Result<Self> {
        let credential = ChainProvider::default_chain().resolve()?;
        Self::new(credential)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Looks up items by ASIN (`ItemLookup`).
    pub fn lookup(&self, asins: &[&str], params: Params) -> Result<Vec<Item>> {
        self.lookup_as(asins, params)
    }

    pub fn lookup_as<T: ResponseView>(&self, asins: &[&str], params: Params) -> Result<Vec<T>> {
        exec::items(self.call(lookup_params(asins, params))?, "ItemLookup")
    }

    /// Searches by keywords (`ItemSearch`).
    pub fn search_keywords(&self, keywords: &[&str], params: Params) -> Result<Vec<Item>> {
        self.search_keywords_as(keywords, params)
    }

    pub fn search_keywords_as<T: ResponseView>(
        &self,
        keywords: &[&str],
        params: Params,
    ) -> Result<Vec<T>> {
        exec::items(self.call(search_keywords_params(keywords, params))?, "ItemSearch")
    }

    /// Free-form `ItemSearch`.
    pub fn search(&self, params: Params) -> Result<Vec<Item>> {
        self.search_as(params)
    }

    pub fn search_as<T: ResponseView>(&self, params: Params) -> Result<Vec<T>> {
        exec::items(self.call(search_params(params))?, "ItemSearch")
    }

    /// Items similar to the given ASINs (`SimilarityLookup`).
    pub fn similar(&self, asins: &[&str], params: Params) -> Result<Vec<Item>> {
        self.similar_as(asins, params)
    }

    pub fn similar_as<T: ResponseView>(&self, asins: &[&str], params: Params) -> Result<Vec<T>> {
        exec::items(self.call(similar_params(asins, params))?, "SimilarityLookup")
    }

    /// Browse node details (`BrowseNodeLookup`).
    pub fn browse_node(&self, node_id: &str, params: Params) -> Result<Vec<Node>> {
        self.browse_node_as(node_id, params)
    }

    pub fn browse_node_as<T: ResponseView>(&self, node_id: &str, params: Params) -> Result<Vec<T>> {
        exec::nodes(self.call(browse_node_params(node_id, params))?)
    }

    /// Creates a remote cart holding `items` (`CartCreate`).
    pub fn create_cart(&self, items: &[CartItem]) -> Result<Cart> {
        self.create_cart_as(items)
    }

    pub fn create_cart_as<T: ResponseView>(&self, items: &[CartItem]) -> Result<T> {
        self.cart(CartOperation::Create, None, items)
    }

    /// Fetches an existing cart (`CartGet`).
    pub fn get_cart(&self, cart_id: &str, hmac: &str) -> Result<Cart> {
        self.get_cart_as(cart_id, hmac)
    }

    pub fn get_cart_as<T: ResponseView>(&self, cart_id: &str, hmac: &str) -> Result<T> {
        self.cart(CartOperation::Get, Some((cart_id, hmac)), &[])
    }

    /// Adds `items` to `cart` (`CartAdd`).
    pub fn add_items(&self, cart: &Cart, items: &[CartItem]) -> Result<Cart> {
        self.add_items_as(cart, items)
    }

    pub fn add_items_as<T: ResponseView>(&self, cart: &Cart, items: &[CartItem]) -> Result<T> {
        self.cart(CartOperation::Add, Some(cart.identity()?), items)
    }

    /// Changes quantities or moves lines of `cart` (`CartModify`).
    pub fn update_items(&self, cart: &Cart, items: &[CartItem]) -> Result<Cart> {
        self.update_items_as(cart, items)
    }

    pub fn update_items_as<T: ResponseView>(&self, cart: &Cart, items: &[CartItem]) -> Result<T> {
        self.cart(CartOperation::Modify, Some(cart.identity()?), items)
    }

    /// Removes every line from `cart` (`CartClear`).
    pub fn clear_cart(&self, cart: &Cart) -> Result<Cart> {
        self.clear_cart_as(cart)
    }

    pub fn clear_cart_as<T: ResponseView>(&self, cart: &Cart) -> Result<T> {
        self.cart(CartOperation::Clear, Some(cart.identity()?), &[])
    }

    /// Sends an arbitrary operation and returns the whole parsed response.
    pub fn call(&self, params: Params) -> Result<Value> {
        let url = prepare(&params, &self.credential, &self.config)?;

        let response = self.http.get(&url).send()?;

        let status = response.status();
        let text = response.text()?;

        handle_response(status, text, &self.config)
    }

    fn cart<T: ResponseView>(
        &self,
        operation: CartOperation,
        cart: Option<(&str, &str)>,
        items: &[CartItem],
    ) -> Result<T> {
        let value = self.call(cart_params(operation, cart, items))?;
        exec::cart(value, &operation.response_element())
    }
}
