//! Single-owner resource checks

use snapfeed_db::{Post, UserId};
use tracing::warn;

use crate::error::AuthError;
use crate::middleware::AuthUser;

/// A resource bound to the user that created it
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

impl Owned for Post {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Check that `identity` may mutate a fetched resource
///
/// Takes the fetch result directly so a missing resource is reported as
/// `ResourceNotFound` instead of reaching the owner comparison.
pub fn authorize<'a, R: Owned>(
    resource: Option<&'a R>,
    identity: &AuthUser,
) -> Result<&'a R, AuthError> {
    let resource = resource.ok_or(AuthError::ResourceNotFound)?;

    if resource.owner_id() != identity.id {
        metrics::counter!("snapfeed_authz_denied_total").increment(1);
        warn!(
            "User {} denied access to resource owned by {}",
            identity.id,
            resource.owner_id()
        );
        return Err(AuthError::Forbidden);
    }

    Ok(resource)
}
