//! Authentication context
//!
//! Credentials are probed once, before any command runs, by looking up the
//! profile's own user. Commands that need to know who they run as (the
//! tenancy for compartment listing, for instance) take the resulting
//! [`AuthContext`] instead of re-reading the profile.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::OciProfile;
use crate::error::{CoreError, Result};
use crate::provider::IdentityApi;

/// Verified identity of the active credential profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthContext {
    pub profile: String,
    pub user_id: String,
    pub user_name: String,
    pub tenancy_id: String,
    pub region: String,
}

impl AuthContext {
    /// Probe the credentials of `profile` against the identity service
    ///
    /// Any failure of the probe is reported as
    /// [`CoreError::Authentication`].
    pub async fn establish(identity: &dyn IdentityApi, profile: &OciProfile) -> Result<Self> {
        debug!(profile = %profile.name, user = %profile.user, "Verifying credentials");

        let user = identity
            .get_user(&profile.user)
            .await
            .map_err(|e| CoreError::Authentication {
                message: format!("profile '{}': {}", profile.name, e),
            })?;

        info!(profile = %profile.name, user = %user.name, "Authenticated");

        Ok(AuthContext {
            profile: profile.name.clone(),
            user_id: user.id,
            user_name: user.name,
            tenancy_id: profile.tenancy.clone(),
            region: profile.region.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeIdentity;
    use std::path::PathBuf;

    fn profile() -> OciProfile {
        OciProfile {
            name: "DEFAULT".to_string(),
            user: "ocid1.user.oc1..alice".to_string(),
            fingerprint: "aa:bb".to_string(),
            key_file: PathBuf::from("/keys/alice.pem"),
            tenancy: "ocid1.tenancy.oc1..root".to_string(),
            region: "us-phoenix-1".to_string(),
            config_file: PathBuf::from("/home/alice/.oci/config"),
        }
    }

    #[tokio::test]
    async fn test_establish_success() {
        let identity = FakeIdentity::new().with_user("ocid1.user.oc1..alice", "alice");
        let ctx = AuthContext::establish(&identity, &profile()).await.unwrap();

        assert_eq!(ctx.user_name, "alice");
        assert_eq!(ctx.tenancy_id, "ocid1.tenancy.oc1..root");
        assert_eq!(ctx.region, "us-phoenix-1");
        assert_eq!(identity.user_calls(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_is_authentication_error() {
        let identity = FakeIdentity::new();
        let err = AuthContext::establish(&identity, &profile())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Authentication { .. }));
        assert!(err.is_unauthorized());
    }
}
