//! Code keyword context and org auth token creator for docs code samples.
//!
//! Code samples on the docs site substitute keywords such as the project DSN
//! or an auth token. This crate holds the keyword context shared between
//! samples and the headless core of the widget that generates an org auth
//! token in place.

pub mod context;
pub mod creator;
pub mod issuer;
pub mod popover;

pub use context::{
    org_slugs, CodeContext, CodeKeywords, ContextError, KeywordChoice, KeywordSelection,
    SharedKeywordSelection, User, PROJECT,
};
pub use creator::{DropdownView, Key, OrgAuthTokenCreator, Rendered, TokenState, TriggerView};
pub use issuer::{HttpTokenIssuer, IssuerError, TokenIssuer, TokenRequest};
pub use popover::{compute_position, Point, Popover, PopperOptions, Position, Rect, Side, Size};
