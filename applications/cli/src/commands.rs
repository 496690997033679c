/// Subcommands and their execution
use crate::error::CliError;
use crate::terminal::{self, TerminalLogin};
use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use ohako_client::RemoteGateway;
use ohako_core::{IdentityPatch, ProfileImage, TrackId, UserId};
use ohako_sync::events::drain;
use ohako_sync::{
    NotificationReceiver, Route, RouteGuard, SearchMode, SessionStore, SyncCoordinator,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(short, long, env = "OHAKO_PASSWORD")]
        password: String,
    },
    /// Create an account and log in to it
    Register {
        username: String,
        #[arg(short, long, env = "OHAKO_PASSWORD")]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show your playlist
    Playlist,
    /// Suggest tracks while typing a name
    Suggest { query: String },
    /// Search tracks, or get recommendations from a track name
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = SearchBy::Name)]
        by: SearchBy,
    },
    /// Add a track to your playlist
    Add { track_id: String },
    /// Remove a track from your playlist
    Remove { track_id: String },
    /// Show another user's playlist
    User { user_id: UserId },
    /// Show users who have a track in their playlist
    Listeners { track_id: String },
    /// Follow a user
    Follow { user_id: UserId },
    /// Stop following a user
    Unfollow { user_id: UserId },
    /// Show the users you follow
    Following,
    /// Show or edit your profile
    Profile {
        #[arg(long)]
        username: Option<String>,
        /// Image file to upload as the profile picture
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchBy {
    /// Track name
    Name,
    /// Compatible key
    Key,
    /// Similar tempo
    Tempo,
}

impl From<SearchBy> for SearchMode {
    fn from(by: SearchBy) -> Self {
        match by {
            SearchBy::Name => SearchMode::Plain,
            SearchBy::Key => SearchMode::Key,
            SearchBy::Tempo => SearchMode::Tempo,
        }
    }
}

pub struct App<G: RemoteGateway> {
    sync: SyncCoordinator<G>,
    guard: RouteGuard<TerminalLogin>,
    notifications: NotificationReceiver,
}

impl<G: RemoteGateway> App<G> {
    pub fn new(gateway: Arc<G>, session: Arc<SessionStore>) -> Self {
        let guard = RouteGuard::new(session.clone(), Arc::new(TerminalLogin));
        let (sync, notifications) = SyncCoordinator::new(gateway, session);
        Self {
            sync,
            guard,
            notifications,
        }
    }

    /// Print and discard queued notifications
    pub fn flush_notifications(&mut self) {
        terminal::print_notifications(&drain(&mut self.notifications));
    }

    fn enter(&self, route: Route) -> Result<()> {
        let decision = self.guard.evaluate(&route);
        debug!(route = %route, allowed = decision.is_allowed(), "Route evaluated");
        if decision.is_allowed() {
            Ok(())
        } else {
            Err(CliError::LoginRequired(route).into())
        }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login { username, password } => {
                let session = self.sync.login(&username, &password).await?;
                if let Some(user) = session.user() {
                    println!("Logged in as {}", user.username);
                }
            }
            Command::Register { username, password } => {
                let session = self.sync.register(&username, &password).await?;
                if let Some(user) = session.user() {
                    println!("Registered and logged in as {}", user.username);
                }
            }
            Command::Logout => {
                self.sync.logout();
                println!("Logged out");
            }
            Command::Whoami => match self.sync.session().user() {
                Some(user) => println!("{} (id {})", user.username, user.id),
                None => println!("Not logged in"),
            },
            Command::Playlist => {
                self.enter(Route::Home)?;
                let tracks = self.sync.load_home_playlist().await?;
                terminal::print_tracks(&tracks, |t| self.sync.is_in_playlist(&t.id));
            }
            Command::Suggest { query } => {
                self.enter(Route::Home)?;
                let tracks = self.sync.suggest(&query).await?;
                for track in tracks {
                    println!("{} - {}", track.name, track.artists_display());
                }
            }
            Command::Search { query, by } => {
                self.enter(Route::Search {
                    query: query.clone(),
                })?;
                let results = self.sync.search(&query, by.into()).await?;
                if let Some(reference) = &results.reference {
                    println!(
                        "Based on {} - {}",
                        reference.name,
                        reference.artists_display()
                    );
                }
                terminal::print_tracks(&results.tracks, |t| self.sync.is_in_playlist(&t.id));
            }
            Command::Add { track_id } => {
                self.enter(Route::Home)?;
                self.sync.add_track(&TrackId::new(track_id)).await?;
            }
            Command::Remove { track_id } => {
                self.enter(Route::Home)?;
                self.sync.remove_track(&TrackId::new(track_id)).await?;
            }
            Command::User { user_id: user } => {
                self.enter(Route::UserPlaylist { user })?;
                let playlist = self.sync.open_user_playlist(user).await?;
                println!("{}", playlist.name);
                terminal::print_tracks(&playlist.tracks, |t| self.sync.is_in_playlist(&t.id));
            }
            Command::Listeners { track_id } => {
                let track = TrackId::new(track_id);
                self.enter(Route::TrackListeners {
                    track: track.clone(),
                })?;
                let users = self.sync.open_track_listeners(&track).await?;
                terminal::print_users(&users, |u| self.sync.is_followed(u.id));
            }
            Command::Follow { user_id } => {
                self.enter(Route::FollowedUsers)?;
                self.sync.follow(user_id).await?;
                println!("Following user {}", user_id);
            }
            Command::Unfollow { user_id } => {
                self.enter(Route::FollowedUsers)?;
                self.sync.unfollow(user_id).await?;
                println!("Unfollowed user {}", user_id);
            }
            Command::Following => {
                self.enter(Route::FollowedUsers)?;
                let list = self.sync.followed_users().await?;
                println!("Following {} users", list.count);
                terminal::print_users(&list.users, |u| self.sync.is_followed(u.id));
            }
            Command::Profile { username, image } => {
                self.enter(Route::Profile)?;
                if username.is_none() && image.is_none() {
                    return self.show_profile().await;
                }

                if let Some(username) = username {
                    let session = self
                        .sync
                        .update_profile(&IdentityPatch::username(username))
                        .await?;
                    if let Some(user) = session.user() {
                        println!("Profile: {}", user.username);
                    }
                }
                if let Some(path) = image {
                    let image = read_image(&path).await?;
                    let session = self.sync.update_profile_image(&image).await?;
                    if let Some(image) = session.user().and_then(|u| u.profile_image.as_deref()) {
                        println!("Image: {}", image);
                    }
                }
            }
        }
        Ok(())
    }

    async fn show_profile(&self) -> Result<()> {
        let Some(user) = self.sync.session().user() else {
            return Err(CliError::LoginRequired(Route::Profile).into());
        };

        let data = self.sync.open_follow_lists().await?;
        println!("{} (id {})", user.username, user.id);
        if let Some(image) = &user.profile_image {
            println!("Image: {}", image);
        }
        println!("Following: {}", data.following.count);
        terminal::print_users(&data.following.users, |u| self.sync.is_followed(u.id));
        println!("Followers: {}", data.followers.count);
        terminal::print_users(&data.followers.users, |u| self.sync.is_followed(u.id));
        Ok(())
    }
}

async fn read_image(path: &Path) -> Result<ProfileImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("profile_image");
    debug!(file = %path.display(), size = bytes.len(), "Image read");
    Ok(ProfileImage::new(file_name, bytes))
}
