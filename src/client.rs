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

/// Async client for the product API.
///
/// Every call is signed with the client's credential at the moment it is
/// sent. The client holds no per-request state and can be shared freely.
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    credential: Credential,
}

impl Client {
    /// Creates a new client with an explicit credential.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_config(credential, ClientConfig::default())
    }

    /// Creates a new client with an explicit credential and custom configuration.
    pub fn with_config(credential: Credential, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AsinError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config,
            credential,
        })
    }

    /// Creates a new client using the default credential chain (env vars, then profile file).
    pub fn from_env() -> Result<Self> {
        let credential = ChainProvider::default_chain().resolve()?;
        Self::new(credential)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Looks up items by ASIN (`ItemLookup`).
    ///
    /// Without `params` the `Medium` response group is requested.
    pub async fn lookup(&self, asins: &[&str], params: Params) -> Result<Vec<Item>> {
        self.lookup_as(asins, params).await
    }

    pub async fn lookup_as<T: ResponseView>(&self, asins: &[&str], params: Params) -> Result<Vec<T>> {
        let value = self.call(lookup_params(asins, params)).await?;
        exec::items(value, "ItemLookup")
    }

    /// Searches by keywords (`ItemSearch`).
    ///
    /// Without `params` the search runs in the `Books` index with the
    /// `Medium` response group.
    pub async fn search_keywords(&self, keywords: &[&str], params: Params) -> Result<Vec<Item>> {
        self.search_keywords_as(keywords, params).await
    }

    pub async fn search_keywords_as<T: ResponseView>(
        &self,
        keywords: &[&str],
        params: Params,
    ) -> Result<Vec<T>> {
        let value = self.call(search_keywords_params(keywords, params)).await?;
        exec::items(value, "ItemSearch")
    }

    /// Free-form `ItemSearch`, e.g. by `Title` or `Power`.
    pub async fn search(&self, params: Params) -> Result<Vec<Item>> {
        self.search_as(params).await
    }

    pub async fn search_as<T: ResponseView>(&self, params: Params) -> Result<Vec<T>> {
        let value = self.call(search_params(params)).await?;
        exec::items(value, "ItemSearch")
    }

    /// Items similar to the given ASINs (`SimilarityLookup`).
    pub async fn similar(&self, asins: &[&str], params: Params) -> Result<Vec<Item>> {
        self.similar_as(asins, params).await
    }

    pub async fn similar_as<T: ResponseView>(&self, asins: &[&str], params: Params) -> Result<Vec<T>> {
        let value = self.call(similar_params(asins, params)).await?;
        exec::items(value, "SimilarityLookup")
    }

    /// Browse node details (`BrowseNodeLookup`).
    pub async fn browse_node(&self, node_id: &str, params: Params) -> Result<Vec<Node>> {
        self.browse_node_as(node_id, params).await
    }

    pub async fn browse_node_as<T: ResponseView>(
        &self,
        node_id: &str,
        params: Params,
    ) -> Result<Vec<T>> {
        let value = self.call(browse_node_params(node_id, params)).await?;
        exec::nodes(value)
    }

    /// Creates a remote cart holding `items` (`CartCreate`).
    pub async fn create_cart(&self, items: &[CartItem]) -> Result<Cart> {
        self.create_cart_as(items).await
    }

    pub async fn create_cart_as<T: ResponseView>(&self, items: &[CartItem]) -> Result<T> {
        self.cart(CartOperation::Create, None, items).await
    }

    /// Fetches an existing cart (`CartGet`).
    pub async fn get_cart(&self, cart_id: &str, hmac: &str) -> Result<Cart> {
        self.get_cart_as(cart_id, hmac).await
    }

    pub async fn get_cart_as<T: ResponseView>(&self, cart_id: &str, hmac: &str) -> Result<T> {
        self.cart(CartOperation::Get, Some((cart_id, hmac)), &[]).await
    }

    /// Adds `items` to `cart` (`CartAdd`).
    pub async fn add_items(&self, cart: &Cart, items: &[CartItem]) -> Result<Cart> {
        self.add_items_as(cart, items).await
    }

    pub async fn add_items_as<T: ResponseView>(&self, cart: &Cart, items: &[CartItem]) -> Result<T> {
        self.cart(CartOperation::Add, Some(cart.identity()?), items)
            .await
    }

    /// Changes quantities or moves lines of `cart` (`CartModify`).
    ///
    /// Items are addressed by `cart_item_id`.
    pub async fn update_items(&self, cart: &Cart, items: &[CartItem]) -> Result<Cart> {
        self.update_items_as(cart, items).await
    }

    pub async fn update_items_as<T: ResponseView>(
        &self,
        cart: &Cart,
        items: &[CartItem],
    ) -> Result<T> {
        self.cart(CartOperation::Modify, Some(cart.identity()?), items)
            .await
    }

    /// Removes every line from `cart` (`CartClear`).
    pub async fn clear_cart(&self, cart: &Cart) -> Result<Cart> {
        self.clear_cart_as(cart).await
    }

    pub async fn clear_cart_as<T: ResponseView>(&self, cart: &Cart) -> Result<T> {
        self.cart(CartOperation::Clear, Some(cart.identity()?), &[])
            .await
    }

    /// Sends an arbitrary operation and returns the whole parsed response.
    ///
    /// `params` must include `Operation`.
    pub async fn call(&self, params: Params) -> Result<Value> {
        let url = prepare(&params, &self.credential, &self.config)?;

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        let text = response.text().await?;

        handle_response(status, text, &self.config)
    }

    async fn cart<T: ResponseView>(
        &self,
        operation: CartOperation,
        cart: Option<(&str, &str)>,
        items: &[CartItem],
    ) -> Result<T> {
        let value = self.call(cart_params(operation, cart, items)).await?;
        exec::cart(value, &operation.response_element())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_rejected() {
        let result = Client::with_config(
            Credential::new("key", "secret"),
            ClientConfig::default().with_host(""),
        );
        assert!(matches!(result, Err(AsinError::Config(_))));
    }

    #[test]
    fn default_config_is_kept() {
        let client = Client::new(Credential::new("key", "secret")).unwrap();
        assert_eq!(client.config().host, "webservices.amazon.com");
        assert!(client.config().logging);
    }
}
