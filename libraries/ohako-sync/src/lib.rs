//! OHAKO Sync
//!
//! Client-side state for OHAKO: who is signed in, which tracks are in the
//! user's playlist and which users they follow, kept consistent across every
//! view that shows them.
//!
//! - [`SessionStore`]: the signed-in user, mirrored to durable storage
//! - [`MembershipCache`]: versioned boolean relations with optimistic writes
//! - [`SyncCoordinator`]: fetch-then-reconcile for views, optimistic protocol
//!   for mutations
//! - [`RouteGuard`]: sends unauthenticated navigation home and opens login
//!
//! # Example
//!
//! ```ignore
//! use ohako_client::{ClientConfig, OhakoClient};
//! use ohako_sync::{MemorySessionStorage, SessionStore, SyncCoordinator};
//! use std::sync::Arc;
//!
//! let client = Arc::new(OhakoClient::new(ClientConfig::new("http://localhost:8000/api"))?);
//! let session = Arc::new(SessionStore::open(MemorySessionStorage::new()));
//! let (sync, mut notifications) = SyncCoordinator::new(client, session);
//!
//! sync.login("alice", "password").await?;
//! sync.load_home_playlist().await?;
//! ```

pub mod coordinator;
pub mod error;
pub mod events;
pub mod guard;
pub mod membership;
pub mod session;
pub mod storage;

pub use coordinator::{SearchMode, SearchResults, SyncCoordinator};
pub use error::{Result, SyncError};
pub use events::{Notification, NotificationLevel, NotificationReceiver};
pub use guard::{GuardDecision, LoginPrompt, LoginSurface, Route, RouteGuard};
pub use membership::{MembershipCache, OptimisticWrite};
pub use session::SessionStore;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};
