// Cache module for upstream feeds.
// Holds one TTL-bounded slot per feed so rate-limited APIs are called sparingly.

pub mod feed;

pub use feed::FeedCache;
