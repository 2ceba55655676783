//! Property-based tests for the token cache.
//!
//! Time is driven by a `ManualClock`, so every expiry scenario is exact.

use async_trait::async_trait;
use credential_cache::{
    Authenticator, CacheConfig, DEFAULT_SAFETY_MARGIN, LoginGrant, ManualClock, Role, TokenCache,
};
use harness_common::HarnessResult;
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct SequenceAuthenticator {
    calls: AtomicUsize,
    lifetime_secs: u64,
}

impl SequenceAuthenticator {
    fn new(lifetime_secs: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            lifetime_secs,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for SequenceAuthenticator {
    async fn authenticate(&self, role: &Role) -> HarnessResult<LoginGrant> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LoginGrant::new(format!("{role}:{n}"), self.lifetime_secs))
    }
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::User),
        "[a-z]{3,10}".prop_map(|name| Role::from(name.as_str())),
    ]
}

// Property: Token Freshness
// *For any* sequence of calls whose total elapsed time stays below
// (lifetime - margin), only the first call SHALL authenticate and every call
// SHALL return the same token.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_token_reused_within_window(
        role in role_strategy(),
        lifetime_secs in 301u64..200_000,
        steps in proptest::collection::vec(0u64..1_000, 1..20),
    ) {
        let window_millis = (lifetime_secs - 300) * 1000;
        let total: u64 = steps.iter().sum();
        prop_assume!(total < window_millis);

        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = TokenCache::new(CacheConfig::default(), clock.clone());
            let auth = SequenceAuthenticator::new(lifetime_secs);

            let first = cache.get_token(&role, &auth).await.unwrap();
            for step in &steps {
                clock.advance(Duration::from_millis(*step));
                let token = cache.get_token(&role, &auth).await.unwrap();
                prop_assert_eq!(&token, &first);
            }
            prop_assert_eq!(auth.calls(), 1);
            Ok(())
        })?;
    }
}

// Property: Token Refresh
// *For any* lifetime, once the clock passes (lifetime - margin) since the last
// login, the next call SHALL authenticate exactly once more and record a later
// expiry.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_token_refreshed_after_window(
        role in role_strategy(),
        lifetime_secs in 301u64..200_000,
        overshoot_millis in 0u64..100_000,
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = TokenCache::new(CacheConfig::default(), clock.clone());
            let auth = SequenceAuthenticator::new(lifetime_secs);

            let first = cache.get_token(&role, &auth).await.unwrap();
            let first_expiry = cache.entry(&role).await.unwrap().expires_at;

            clock.advance(Duration::from_secs(lifetime_secs) - DEFAULT_SAFETY_MARGIN);
            clock.advance(Duration::from_millis(overshoot_millis));

            let second = cache.get_token(&role, &auth).await.unwrap();
            let second_expiry = cache.entry(&role).await.unwrap().expires_at;

            prop_assert_ne!(first, second);
            prop_assert_eq!(auth.calls(), 2);
            prop_assert!(second_expiry > first_expiry);
            Ok(())
        })?;
    }

    #[test]
    fn prop_returned_token_respects_margin(
        lifetime_secs in 301u64..200_000,
        elapsed_secs in 0u64..400_000,
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = TokenCache::new(CacheConfig::default(), clock.clone());
            let auth = SequenceAuthenticator::new(lifetime_secs);

            cache.get_token(&Role::Admin, &auth).await.unwrap();
            clock.advance(Duration::from_secs(elapsed_secs));
            cache.get_token(&Role::Admin, &auth).await.unwrap();

            let entry = cache.entry(&Role::Admin).await.unwrap();
            let margin = i64::try_from(DEFAULT_SAFETY_MARGIN.as_millis()).unwrap();
            prop_assert!(entry.expires_at > clock_now(&clock) + margin);
            Ok(())
        })?;
    }
}

fn clock_now(clock: &ManualClock) -> i64 {
    use credential_cache::Clock;
    clock.now_millis()
}

// Property: Cache Isolation and Clear
// *For any* two distinct roles, their entries SHALL never overwrite each other;
// after clear_cache every role SHALL authenticate again.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_roles_isolated_and_clear_refetches(
        a in role_strategy(),
        b in role_strategy(),
    ) {
        prop_assume!(a != b);

        tokio_test::block_on(async {
            let cache = TokenCache::new(CacheConfig::default(), Arc::new(ManualClock::new(0)));
            let auth = SequenceAuthenticator::new(86_400);

            let token_a = cache.get_token(&a, &auth).await.unwrap();
            let token_b = cache.get_token(&b, &auth).await.unwrap();
            prop_assert_ne!(&token_a, &token_b);
            prop_assert_eq!(cache.peek(&a).await, Some(token_a.clone()));
            prop_assert_eq!(cache.peek(&b).await, Some(token_b.clone()));

            cache.clear_cache().await;
            cache.get_token(&a, &auth).await.unwrap();
            cache.get_token(&b, &auth).await.unwrap();
            prop_assert_eq!(auth.calls(), 4);
            Ok(())
        })?;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_flight_across_threads() {
    let cache = Arc::new(TokenCache::new(
        CacheConfig::default(),
        Arc::new(ManualClock::new(0)),
    ));
    let auth = Arc::new(SequenceAuthenticator::new(86_400));

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let cache = cache.clone();
            let auth = auth.clone();
            let role = if i % 2 == 0 { Role::Admin } else { Role::User };
            tokio::spawn(async move { cache.get_token(&role, auth.as_ref()).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(auth.calls(), 2);
}

// Property: Role Aliases
// *For any* role, a custom role spelled with the same name SHALL share its
// cache entry and login.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_custom_spelling_shares_entry(role in role_strategy()) {
        let alias = Role::Custom(role.as_str().to_string());

        tokio_test::block_on(async {
            let cache = TokenCache::new(CacheConfig::default(), Arc::new(ManualClock::new(0)));
            let auth = SequenceAuthenticator::new(86_400);

            let first = cache.get_token(&role, &auth).await.unwrap();
            let second = cache.get_token(&alias, &auth).await.unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(auth.calls(), 1);
            prop_assert_eq!(cache.len().await, 1);
            Ok(())
        })?;
    }
}
