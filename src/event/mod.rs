//! Notifications, event subscriptions, and per-message metadata.

mod metadata;
mod notification;
mod subscribe;

pub use self::metadata::MessageMetadata;
pub use self::notification::{
	AdaptationEvent, AssocChangeState, AssociationChange, Decoder, ErrorCause, Notification,
	NotificationKind, PartialDeliveryEvent, PartialDeliveryIndication, PeerAddressChange,
	PeerAddressState, RemoteError, SendFailed, SendFailedFlag, ShutdownEvent, decode,
};
pub use self::subscribe::EventSubscription;
