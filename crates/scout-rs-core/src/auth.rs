//! Permission checks for API callers.
//!
//! Permissions are colon-separated (`api:food:read`). Granted patterns may use
//! `*` wildcards, and a pattern also grants everything beneath it, so
//! `api:food` covers `api:food:read` and `api:food:delete`.

use crate::error::ScoutCoreError;
use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use scout_rs_config::AuthConfig;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// Credentials presented with a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `api-secret` header or `secret` query parameter, plain or SHA-1 hex.
    pub api_secret: Option<String>,
    /// `token` query parameter.
    pub token: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            api_secret: Some(secret.into()),
            token: None,
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_secret: None,
            token: Some(token.into()),
        }
    }
}

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AuthDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether credentials carry a permission.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn check(&self, credentials: &Credentials, permission: &str) -> AuthDecision;
}

/// Fail with [`ScoutCoreError::Unauthorized`] unless `permission` is granted.
pub async fn require(
    authorizer: &dyn Authorizer,
    credentials: &Credentials,
    permission: &str,
) -> Result<(), ScoutCoreError> {
    let decision = authorizer.check(credentials, permission).await;
    if decision.allowed {
        return Ok(());
    }
    warn!(
        "permission denied (permission={}, reason={})",
        permission,
        decision.reason.as_deref().unwrap_or("none")
    );
    Err(ScoutCoreError::Unauthorized {
        permission: permission.to_string(),
    })
}

/// Compiled set of permission patterns.
#[derive(Debug, Clone)]
struct PermissionSet {
    patterns: Vec<String>,
    globs: GlobSet,
}

impl PermissionSet {
    fn compile(patterns: &[String]) -> Result<Self, ScoutCoreError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            for candidate in [pattern.clone(), format!("{pattern}:*")] {
                let glob = Glob::new(&candidate).map_err(|err| ScoutCoreError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: err.to_string(),
                })?;
                builder.add(glob);
            }
        }
        let globs = builder
            .build()
            .map_err(|err| ScoutCoreError::InvalidPattern {
                pattern: patterns.join(","),
                message: err.to_string(),
            })?;
        Ok(Self {
            patterns: patterns.to_vec(),
            globs,
        })
    }

    fn grants(&self, permission: &str) -> bool {
        self.globs.is_match(permission)
    }
}

/// Config-driven authorizer: shared API secret, access tokens, default roles.
#[derive(Debug, Clone)]
pub struct AccessControl {
    secret: Option<String>,
    secret_sha1: Option<String>,
    default_roles: PermissionSet,
    tokens: BTreeMap<String, PermissionSet>,
}

impl AccessControl {
    pub fn from_config(config: &AuthConfig) -> Result<Self, ScoutCoreError> {
        let tokens = config
            .tokens
            .iter()
            .map(|(token, patterns)| Ok((token.clone(), PermissionSet::compile(patterns)?)))
            .collect::<Result<BTreeMap<_, _>, ScoutCoreError>>()?;
        debug!(
            "access control configured (secret={}, default_roles={:?}, tokens={})",
            config.api_secret.is_some(),
            config.default_roles,
            tokens.len()
        );
        Ok(Self {
            secret: config.api_secret.clone(),
            secret_sha1: config.api_secret.as_deref().map(sha1_hex),
            default_roles: PermissionSet::compile(&config.default_roles)?,
            tokens,
        })
    }

    fn secret_matches(&self, presented: &str) -> bool {
        if self.secret.as_deref() == Some(presented) {
            return true;
        }
        self.secret_sha1
            .as_deref()
            .is_some_and(|hash| hash.eq_ignore_ascii_case(presented))
    }
}

#[async_trait]
impl Authorizer for AccessControl {
    async fn check(&self, credentials: &Credentials, permission: &str) -> AuthDecision {
        if let Some(secret) = credentials.api_secret.as_deref()
            && self.secret_matches(secret)
        {
            return AuthDecision::allow();
        }
        if let Some(token) = credentials.token.as_deref()
            && let Some(granted) = self.tokens.get(token)
            && granted.grants(permission)
        {
            debug!(
                "permission granted by token (permission={}, patterns={:?})",
                permission, granted.patterns
            );
            return AuthDecision::allow();
        }
        if self.default_roles.grants(permission) {
            return AuthDecision::allow();
        }
        AuthDecision::deny(format!("Missing permission {permission}"))
    }
}

fn sha1_hex(secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
