//! The slice of a client connection the handler needs to see.

/// Identifier the server assigns to a connection, also used by `kill <id>`.
pub type SessionId = u32;

/// A client session as seen by a [`crate::QueryHandler`].
///
/// The handler never reads or writes the wire itself. It needs the session
/// identity for the kill protocol, the user name for the authentication
/// check, and a way to close the connection of a killed session.
pub trait Session: Send + Sync {
    /// Connection identifier.
    fn id(&self) -> SessionId;

    /// Authenticated user name.
    fn user(&self) -> String;

    /// Closes the underlying connection. Must be idempotent.
    fn close(&self);
}
