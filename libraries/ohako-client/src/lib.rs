//! OHAKO Client
//!
//! The network operations the OHAKO client core depends on, expressed as the
//! [`RemoteGateway`] trait, plus [`OhakoClient`], its HTTP implementation.
//!
//! # Features
//!
//! - **Authentication**: login and registration returning a bearer token
//! - **Playlist**: fetch the current user's playlist, add/remove tracks,
//!   read another user's playlist
//! - **Social**: follow status, follow/unfollow, follow lists, track listeners,
//!   profile updates
//! - **Discovery**: track search and key/tempo recommendations
//!
//! # Example
//!
//! ```ignore
//! use ohako_client::{ClientConfig, OhakoClient, RemoteGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OhakoClient::new(ClientConfig::new("https://ohako.example.com/api"))?;
//!
//!     let auth = client.authenticate("alice", "password").await?;
//!     println!("Logged in as {}", auth.user.username);
//!
//!     let playlist = client.fetch_playlist(&auth.token).await?;
//!     println!("{} tracks in playlist", playlist.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod discovery;
mod error;
mod gateway;
mod playlist;
mod response;
mod social;
mod types;

pub use client::OhakoClient;
pub use error::{ClientError, Result};
pub use gateway::RemoteGateway;
pub use types::{Authenticated, ClientConfig};

// Re-export sub-clients for direct use if needed
pub use auth::AuthClient;
pub use discovery::DiscoveryClient;
pub use playlist::PlaylistClient;
pub use social::SocialClient;
