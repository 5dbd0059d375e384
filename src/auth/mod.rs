//! Guest access: token claims, session storage and the access flow

pub mod authenticator;
pub mod claims;
pub mod session;

pub use authenticator::{
    AccessCredentials, AccessGrant, AccessSource, AuthState, BookingAccessAuthenticator,
};
pub use claims::{AccessClaims, GuestSummary};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
