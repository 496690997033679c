/// User domain types
use super::ids::UserId;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Identity of a user as the client sees it
///
/// Two identities are equal when their ids match; username and image may
/// differ between snapshots of the same user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Server-assigned user id
    pub id: UserId,

    /// Display name
    pub username: String,

    /// Path or URL of the profile image, if one was uploaded
    #[serde(default, rename = "profile_image")]
    pub profile_image: Option<String>,
}

impl UserIdentity {
    /// Create an identity without a profile image
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            profile_image: None,
        }
    }

    /// Set the profile image reference
    #[must_use]
    pub fn with_profile_image(mut self, image: impl Into<String>) -> Self {
        self.profile_image = Some(image.into());
        self
    }

    /// Merge a partial update into this identity
    pub fn apply(&mut self, patch: &IdentityPatch) {
        if let Some(username) = &patch.username {
            self.username.clone_from(username);
        }
        if let Some(image) = &patch.profile_image {
            self.profile_image = Some(image.clone());
        }
    }
}

impl PartialEq for UserIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserIdentity {}

impl Hash for UserIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Partial profile update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPatch {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// New profile image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl IdentityPatch {
    /// Patch that only renames the user
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            profile_image: None,
        }
    }

    /// Patch that only replaces the profile image
    pub fn profile_image(image: impl Into<String>) -> Self {
        Self {
            username: None,
            profile_image: Some(image.into()),
        }
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.profile_image.is_none()
    }
}

/// Image file to upload as the profile picture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    /// File name sent with the upload
    pub file_name: String,

    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl ProfileImage {
    /// Create an upload from a file name and its contents
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// MIME type guessed from the file extension
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// One side of the follow graph with its total count
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowList {
    /// Users on this side of the graph
    pub users: Vec<UserIdentity>,

    /// Total count reported by the server
    pub count: u64,
}

/// Both sides of the current user's follow graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowData {
    /// Users the current user follows
    pub following: FollowList,

    /// Users following the current user
    pub followers: FollowList,
}
