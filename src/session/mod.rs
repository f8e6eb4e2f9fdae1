//! Page-scoped session guard.
//!
//! One [`SessionGuard`] is built per page load by the page's bootstrap code and
//! handed by reference to whatever needs it. It wraps the identity provider's
//! client, keeps the header's login/logout links in step with the session, and
//! carries the visitor's intended destination (`?next=`) across the login round
//! trip through a durable key-value store.
//!
//! Everything the guard touches in its host (provider library, links, location,
//! storage) arrives through [`PageEnvironment`]; optional pieces are `Option`s
//! and the guard branches on them explicitly.
//!
//! Affordance state only changes through the provider's change notifications
//! plus the initial probe; nothing else writes it. Access control itself must
//! still live on the API: hiding a link is a UX concern.

mod affordance;
mod config;
mod guard;
mod page;
mod provider;
mod redirect;

pub use affordance::{Affordance, ClickEvent, ClickHandler, HeaderAffordanceState, LinkDisplay};
pub use config::{DEFAULT_DESTINATION, GuardConfig, LOGIN_PAGE, NEXT_STORAGE_KEY, ProviderConfig};
pub use guard::{GuardState, SessionGuard, SyncSnapshot};
pub use page::{KeyValueStore, MemoryStore, Navigator, PageEnvironment};
pub use provider::{AuthEvent, IdentityProvider, ProviderError, ProviderFactory, Session};
