//! Collaborator boundary contracts
//!
//! The idle monitor drives its collaborators only through these traits, so it
//! can run against the real service wiring or against test doubles.

pub mod nav;
pub mod notify;
pub mod session;

// Re-export main types
pub use nav::{Navigator, RedirectSink};
pub use notify::{Notice, NoticeBoard, NoticeId, Notifier, PostedNotice, Severity};
pub use session::{LocalSessionAuthority, SessionAuthority};
