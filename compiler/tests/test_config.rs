//! Loading `AstConfig` from the process environment.
//!
//! Kept in its own test binary: it is the only test that touches
//! `GM_MAX_DEPTH`.

use gm::config::{AstConfig, MAX_DEPTH_ENV};
use gm::error::AstError;

#[test]
fn test_from_env() {
    std::env::remove_var(MAX_DEPTH_ENV);
    assert_eq!(AstConfig::from_env().unwrap(), AstConfig::default());

    std::env::set_var(MAX_DEPTH_ENV, "128");
    assert_eq!(AstConfig::from_env().unwrap(), AstConfig::with_max_depth(128));

    std::env::set_var(MAX_DEPTH_ENV, "-1");
    assert!(matches!(
        AstConfig::from_env(),
        Err(AstError::InvalidConfig(_))
    ));

    std::env::remove_var(MAX_DEPTH_ENV);
}
