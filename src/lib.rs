//! Client for the Product Advertising (ECS) REST API.
//!
//! Every request is a `GET` to `/onca/xml` whose query string is signed with
//! HMAC-SHA256. The crate provides both async and sync (blocking) clients
//! covering catalog and cart operations:
//!
//! - [`Client::lookup`], [`Client::search_keywords`], [`Client::search`] and
//!   [`Client::similar`] return catalog [`Item`]s
//! - [`Client::browse_node`] returns taxonomy [`Node`]s
//! - [`Client::create_cart`], [`Client::get_cart`], [`Client::add_items`],
//!   [`Client::update_items`] and [`Client::clear_cart`] manage a remote [`Cart`]
//! - [`Client::call`] sends any other operation and returns the parsed [`Value`]
//!
//! # Quick Start (async)
//!
//! ```no_run
//! use asin::{Client, Credential, Params};
//!
//! # async fn example() -> asin::Result<()> {
//! let client = Client::new(Credential::new("your-key", "your-secret").with_associate_tag("tag-20"))?;
//!
//! let items = client
//!     .search_keywords(&["nirvana", "never mind"], Params::new().with("SearchIndex", "Music"))
//!     .await?;
//!
//! for item in &items {
//!     println!("{:?} {:?}", item.asin(), item.title());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Request signing is also available without a client through
//! [`request::signed_url`].

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod xml;

#[cfg(feature = "blocking")]
pub mod blocking;

mod exec;
mod sign;

pub use client::Client;
pub use config::ClientConfig;
pub use credential::Credential;
pub use error::{AsinError, Result};
pub use params::{CartItem, ParamValue, Params};
pub use response::{Cart, CartEntry, Item, Node, ResponseView};
pub use xml::Value;

// Compile-time assertions: key types must be Send + Sync for use across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Client>;
    let _ = assert_send_sync::<AsinError>;
    let _ = assert_send_sync::<Credential>;
    let _ = assert_send_sync::<Value>;
};
