//! OHAKO Core
//!
//! Domain types and error handling shared by the OHAKO client crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `UserIdentity`, `Session`, `UserPlaylist`
//! - **Identifiers**: `TrackId`, `UserId`, and the relation keys used by the
//!   membership cache (`RelationKind`, `SubjectId`)
//! - **Error Handling**: `OhakoError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use ohako_core::{Session, Track, UserIdentity};
//!
//! let user = UserIdentity::new(7, "alice");
//! let session = Session::authenticated("token-123", user.clone());
//! assert!(session.is_authenticated());
//! assert_eq!(session.user(), Some(&user));
//!
//! let track = Track::new("4uLU6hMCjMI75M1A2tKUQC", "Never Gonna Give You Up")
//!     .with_artists(["Rick Astley"])
//!     .with_album("Whenever You Need Somebody");
//! assert_eq!(track.artists_display(), "Rick Astley");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{OhakoError, Result};

pub use types::{
    FollowData, FollowList, IdentityPatch, ProfileImage, Recommendation, RelationKind, Session,
    SubjectId, Track, TrackId, UserId, UserIdentity, UserPlaylist,
};
