//! Structural checks on mutation inputs.
//!
//! These run before the ownership oracle is consulted, so malformed
//! requests never reach external collaborators.

use crate::error::ValidationError;
use crate::types::{AssetRef, Identity};

/// Check that an asset reference names a real slot in a collection.
pub fn validate_asset_ref(asset: &AssetRef) -> Result<(), ValidationError> {
    if asset.collection.is_zero() {
        return Err(ValidationError::ZeroCollection);
    }
    if asset.token_id == 0 {
        return Err(ValidationError::ZeroTokenId);
    }
    Ok(())
}

/// Grants can never target the null identity.
pub fn validate_grantee(grantee: &Identity) -> Result<(), ValidationError> {
    if grantee.is_zero() {
        return Err(ValidationError::ZeroGrantee);
    }
    Ok(())
}
