//! URL handling module
//!
//! This module provides URL normalization, base-URL upgrading, domain scope
//! checks, and unwrapping of search-provider redirect links.

mod domain;
mod normalize;
mod redirect;

// Re-export main functions
pub use domain::{authority, DomainScope};
pub use normalize::{is_http_family, normalize, normalize_base_url, NormalizedUrl};
pub use redirect::unwrap_redirect;
