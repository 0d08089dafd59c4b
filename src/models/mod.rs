//! Core data models for policy-sync
//!
//! - `collection`: policy collection type tags and the endpoint type table
//! - `document`: raw policy documents and their hyperlinks
//! - `href`: normalization of hrefs handed out by the Policy Service

pub mod collection;
pub mod document;
pub mod href;

pub use collection::CollectionType;
pub use document::{Discriminator, Link, LinkValue, PolicyDocument};
