//! Minimal Chrome DevTools Protocol client: HTTP discovery, one websocket per
//! tab, and the [`RemoteSession`] that implements [`crate::page::AuditPage`].

pub mod connection;
pub mod protocol;
pub mod session;

pub use connection::CdpConnection;
pub use session::{
    is_local, BrowserOptions, RemoteBrowser, RemoteSession, DEFAULT_CDP_HOST, DEFAULT_CDP_PORT,
    DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_RELOAD_WAIT, DEFAULT_SCREENSHOT_TIMEOUT,
};
