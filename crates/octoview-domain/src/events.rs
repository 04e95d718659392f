//! Session lifecycle notifications.

/// Broadcast by [`SessionService`](crate::SessionService) on every session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new token was issued and stored.
    LoggedIn,
    /// The token was discarded, explicitly or after expiry.
    LoggedOut,
    /// A data request found the token past its expiry. Always followed by
    /// [`SessionEvent::LoggedOut`].
    Expired,
}
