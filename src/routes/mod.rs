//! Router Module Index
//!
//! Splits routes by how they treat credentials. The filter gate is the same for all
//! of them; what differs is whether a caller identity can exist at all.

/// Routes with no listing semantics (health checks).
pub mod public;

/// Video listing routes. Credentials are optional and resolved per request by the
/// `CallerIdentity` extractor; a presented but unusable credential is rejected.
pub mod listing;

/// Syndication feed routes. The transport carries no credentials, callers are
/// always anonymous.
pub mod feeds;
