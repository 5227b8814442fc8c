//! Audit notifications.
//!
//! Every state change the components make is announced on an [`EventBus`].
//! Delivery is best-effort: with no subscribers the notification is dropped,
//! and a lagging subscriber loses the oldest entries.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use tokengate_core::{AssetRef, Generation, Identity, PermissionMask, RegistryHandle, Timestamp};

use crate::error::{PermsError, Result};

/// Default number of buffered notifications per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// A state change observable by audit consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// A registry was provisioned for an asset.
    RegistryCreated {
        asset: AssetRef,
        handle: RegistryHandle,
    },

    /// A grant record was written.
    PermissionsSet {
        asset: AssetRef,
        mask: PermissionMask,
        grantee: Identity,
        expiration: Timestamp,
        source: String,
    },

    /// An asset changed hands; older grants are now dead.
    VersionBumped {
        asset: AssetRef,
        generation: Generation,
    },
}

impl Notification {
    /// The asset this notification concerns.
    pub fn asset(&self) -> &AssetRef {
        match self {
            Notification::RegistryCreated { asset, .. } => asset,
            Notification::PermissionsSet { asset, .. } => asset,
            Notification::VersionBumped { asset, .. } => asset,
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| PermsError::SerializationError(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| PermsError::SerializationError(e.to_string()))
    }
}

/// Fan-out channel for [`Notification`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` notifications per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to notifications emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publish a notification.
    pub fn emit(&self, notification: Notification) {
        tracing::trace!(?notification, "emit");
        // No receivers is not an error.
        let _ = self.sender.send(notification);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokengate_core::CollectionId;

    fn asset() -> AssetRef {
        AssetRef::new(CollectionId::from_bytes([5; 32]), 1)
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(0);
        bus.emit(Notification::VersionBumped {
            asset: asset(),
            generation: Generation(2),
        });
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(Notification::RegistryCreated {
            asset: asset(),
            handle: RegistryHandle(1),
        });
        bus.emit(Notification::VersionBumped {
            asset: asset(),
            generation: Generation(2),
        });

        assert!(matches!(
            rx.try_recv().unwrap(),
            Notification::RegistryCreated { .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            Notification::VersionBumped { generation: Generation(2), .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cbor_roundtrip() {
        let notification = Notification::PermissionsSet {
            asset: asset(),
            mask: PermissionMask::from(816u64),
            grantee: Identity::from_bytes([2; 32]),
            expiration: 42,
            source: "ipfs://x".to_string(),
        };

        let bytes = notification.to_bytes().unwrap();
        let back = Notification::from_bytes(&bytes).unwrap();
        assert_eq!(back, notification);
        assert_eq!(back.asset(), &asset());
    }
}
