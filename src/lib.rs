//! # Gatekeeper
//!
//! The authentication boundary of a small web property, in two independent parts:
//!
//! - **Verification gateway** ([`api`]): an HTTP endpoint that forwards a
//!   Cloudflare Turnstile token to the `siteverify` authority ([`turnstile`]) and
//!   answers with a stable `{ success, error, codes }` contract, whatever step
//!   failed.
//! - **Session guard** ([`session`]): a page-scoped helper that tracks whether the
//!   visitor holds an identity-provider session, keeps the login/logout links in
//!   sync with it, and remembers where the visitor was headed across a login
//!   redirect.
//!
//! The two parts share no state; they only share the shape "ask an external trust
//! authority, normalize the answer, react".

pub mod api;
pub mod cli;
pub mod session;
pub mod turnstile;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
