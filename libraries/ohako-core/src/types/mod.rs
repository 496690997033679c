//! Domain types for OHAKO

mod ids;
mod relation;
mod session;
mod track;
mod user;

pub use ids::{TrackId, UserId};
pub use relation::{RelationKind, SubjectId};
pub use session::Session;
pub use track::{Recommendation, Track, UserPlaylist};
pub use user::{FollowData, FollowList, IdentityPatch, ProfileImage, UserIdentity};
