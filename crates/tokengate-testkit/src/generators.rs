//! Proptest generators for property-based testing.

use proptest::prelude::*;

use tokengate_core::{
    AssetRef, CollectionId, Generation, GrantRecord, Identity, PermissionMask, Timestamp,
    MAX_SLOTS,
};

/// Generate any 256-bit mask.
pub fn mask() -> impl Strategy<Value = PermissionMask> {
    any::<[u64; 4]>().prop_map(PermissionMask::from_limbs)
}

/// Generate a mask whose slot pairs are all `00` or `11`.
pub fn well_formed_mask() -> impl Strategy<Value = PermissionMask> {
    prop::collection::vec(slot(), 0..=16).prop_map(|slots| PermissionMask::from_slots(slots))
}

/// Generate a slot index within the full vocabulary.
pub fn slot() -> impl Strategy<Value = u16> {
    0u16..MAX_SLOTS
}

/// Generate a non-null identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>()
        .prop_filter("non-null", |b| b.iter().any(|&x| x != 0))
        .prop_map(Identity::from_bytes)
}

/// Generate a well-formed asset reference.
pub fn asset() -> impl Strategy<Value = AssetRef> {
    (
        any::<[u8; 32]>().prop_filter("non-zero", |b| b.iter().any(|&x| x != 0)),
        1u64..=u64::MAX,
    )
        .prop_map(|(collection, token_id)| {
            AssetRef::new(CollectionId::from_bytes(collection), token_id)
        })
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    0i64..=i64::MAX / 2
}

/// Generate a provenance tag.
pub fn source() -> impl Strategy<Value = String> {
    "[a-z]{0,8}(://[a-z0-9/]{0,24})?".prop_map(String::from)
}

/// Parameters for generating a grant record.
#[derive(Debug, Clone)]
pub struct GrantParams {
    pub grantee: Identity,
    pub mask: PermissionMask,
    pub expiration: Timestamp,
    pub source: String,
    pub generation: u64,
}

impl Arbitrary for GrantParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (identity(), mask(), timestamp(), source(), 1u64..=1_000u64)
            .prop_map(|(grantee, mask, expiration, source, generation)| GrantParams {
                grantee,
                mask,
                expiration,
                source,
                generation,
            })
            .boxed()
    }
}

/// Build a record from parameters.
pub fn record_from_params(params: &GrantParams) -> GrantRecord {
    GrantRecord {
        grantee: params.grantee,
        mask: params.mask,
        expiration: params.expiration,
        source: params.source.clone(),
        generation_at_grant: Generation(params.generation),
    }
}
