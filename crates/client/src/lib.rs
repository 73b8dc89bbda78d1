//! Client-side pieces: an authenticated fetch wrapper over the public API,
//! the affiliate redirect gate, and product metadata generation.

pub mod api;
pub mod config;
pub mod metadata;
pub mod redirect;
pub mod session;

pub use api::{ApiClient, ClientError, FetchOptions};
pub use config::ClientConfig;
pub use metadata::generate_product_metadata;
pub use redirect::{
    Destination, HttpTokenService, Navigator, NoopObserver, RedirectError, RedirectGate, RedirectObserver,
    RedirectOutcome, TokenService,
};
pub use session::{MockSessionStore, SessionStore};
