//! Build-time content pipeline for the docs site.
//!
//! Promotes the first local image of every markdown/MDX document to an OG
//! image with a predictable name and records it in the document frontmatter.

pub mod promoter;

pub use promoter::{ImagePromoter, PromoteError, PromoteOutcome, PromoteSummary, PromoterConfig};
