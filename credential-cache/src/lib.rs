//! Bearer token cache for the user-management API test harness.
//!
//! Test scenarios ask the cache for a token per role; the cache returns the
//! cached token while it has more than a safety margin (five minutes by
//! default) of validity left and logs in again otherwise.
//!
//! ```no_run
//! # async fn demo(auth: &dyn credential_cache::Authenticator) -> harness_common::HarnessResult<()> {
//! use credential_cache::{Role, TokenCache};
//!
//! let token = TokenCache::shared().get_token(&Role::Admin, auth).await?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authenticator;
pub mod cache;
pub mod clock;
pub mod role;

pub use authenticator::{Authenticator, LoginGrant};
pub use cache::{CacheConfig, CachedToken, DEFAULT_SAFETY_MARGIN, TokenCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use role::Role;
