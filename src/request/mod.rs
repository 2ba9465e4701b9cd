//! Request Module
//!
//! Request identity: target url, payload, cache key, and query encoding.

mod key;
mod query;


pub use key::{cache_key, canonical_json, derive, RequestDescriptor};
pub use query::{append_query, encode_query, query_pairs};
