//! Sync coordinator
//!
//! Runs the fetch-then-reconcile sequences behind every view and the
//! optimistic protocol behind every mutation:
//!
//! 1. read the cached value (unknown counts as `false`),
//! 2. write the new value optimistically and keep the receipt,
//! 3. call the gateway; on failure roll back with the receipt and notify.
//!
//! Methods take `&self` so several can be in flight at once on one task.
//! Completions apply in whatever order they arrive; the cache's version
//! check keeps an older rollback from undoing a newer write, and a confirmed
//! write is re-applied over snapshots fetched while it was in flight.
//!
//! Every login and logout advances a session epoch. A call remembers the
//! epoch it started under and drops its result if the epoch has moved on by
//! the time the response arrives.

use crate::error::{Result, SyncError};
use crate::events::{self, Notification, NotificationReceiver, NotificationSender};
use crate::membership::MembershipCache;
use crate::session::SessionStore;
use ohako_client::{ClientError, RemoteGateway};
use ohako_core::{
    FollowData, FollowList, IdentityPatch, ProfileImage, RelationKind, Session, SubjectId, Track,
    TrackId, UserId, UserIdentity, UserPlaylist,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// How a search query is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Tracks whose name matches the query
    #[default]
    Plain,
    /// Tracks in a key compatible with the named track
    Key,
    /// Tracks with a tempo close to the named track
    Tempo,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Plain => write!(f, "plain"),
            SearchMode::Key => write!(f, "key"),
            SearchMode::Tempo => write!(f, "tempo"),
        }
    }
}

/// Tracks returned by a search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    /// Track the recommendation was computed from (key/tempo modes)
    pub reference: Option<Track>,
    pub tracks: Vec<Track>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Mutation {
    AddTrack(TrackId),
    RemoveTrack(TrackId),
    Follow(UserId),
    Unfollow(UserId),
}

impl Mutation {
    fn kind(&self) -> RelationKind {
        match self {
            Mutation::AddTrack(_) | Mutation::RemoveTrack(_) => RelationKind::TrackInPlaylist,
            Mutation::Follow(_) | Mutation::Unfollow(_) => RelationKind::UserIsFollowed,
        }
    }

    fn subject(&self) -> SubjectId {
        match self {
            Mutation::AddTrack(id) | Mutation::RemoveTrack(id) => SubjectId::from(id),
            Mutation::Follow(id) | Mutation::Unfollow(id) => SubjectId::from(*id),
        }
    }

    fn value(&self) -> bool {
        matches!(self, Mutation::AddTrack(_) | Mutation::Follow(_))
    }

    fn success_message(&self) -> Option<&'static str> {
        match self {
            Mutation::AddTrack(_) => Some("Added to playlist"),
            Mutation::RemoveTrack(_) => Some("Removed from playlist"),
            Mutation::Follow(_) | Mutation::Unfollow(_) => None,
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Mutation::AddTrack(_) => "Failed to add track to playlist",
            Mutation::RemoveTrack(_) => "Failed to remove track from playlist",
            Mutation::Follow(_) => "Failed to follow user",
            Mutation::Unfollow(_) => "Failed to unfollow user",
        }
    }

    async fn send<G: RemoteGateway + ?Sized>(
        &self,
        gateway: &G,
        token: &str,
    ) -> std::result::Result<(), ClientError> {
        match self {
            Mutation::AddTrack(id) => gateway.add_track(token, id).await,
            Mutation::RemoveTrack(id) => gateway.remove_track(token, id).await,
            Mutation::Follow(id) => gateway.follow_user(token, *id).await,
            Mutation::Unfollow(id) => gateway.unfollow_user(token, *id).await,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::AddTrack(id) => write!(f, "add track {}", id),
            Mutation::RemoveTrack(id) => write!(f, "remove track {}", id),
            Mutation::Follow(id) => write!(f, "follow user {}", id),
            Mutation::Unfollow(id) => write!(f, "unfollow user {}", id),
        }
    }
}

/// View state owned by one session
#[derive(Debug, Default)]
struct Views {
    epoch: u64,
    /// Last fetched home playlist; `Some` once the home view has loaded
    home: Option<Vec<Track>>,
}

/// Token and the session epoch it was read under
struct Ticket {
    token: String,
    epoch: u64,
}

/// Orchestrates session, cache and gateway for every view
pub struct SyncCoordinator<G: RemoteGateway> {
    gateway: Arc<G>,
    session: Arc<SessionStore>,
    cache: Arc<MembershipCache>,
    notifications: NotificationSender,
    views: Mutex<Views>,
}

impl<G: RemoteGateway> SyncCoordinator<G> {
    /// Create a coordinator and the receiver for its notifications
    pub fn new(gateway: Arc<G>, session: Arc<SessionStore>) -> (Self, NotificationReceiver) {
        let (tx, rx) = events::channel();
        let coordinator = Self {
            gateway,
            session,
            cache: Arc::new(MembershipCache::new()),
            notifications: tx,
            views: Mutex::new(Views::default()),
        };
        (coordinator, rx)
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn cache(&self) -> &Arc<MembershipCache> {
        &self.cache
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn views(&self) -> MutexGuard<'_, Views> {
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last loaded home playlist, if the home view has been opened
    pub fn home_playlist(&self) -> Option<Vec<Track>> {
        self.views().home.clone()
    }

    fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            debug!("Notification receiver dropped");
        }
    }

    fn ticket(&self) -> Result<Ticket> {
        let views = self.views();
        let token = self.session.token().ok_or(SyncError::NotAuthenticated)?;
        Ok(Ticket {
            token,
            epoch: views.epoch,
        })
    }

    /// Run `apply` only while the session is still the one `epoch` belongs to
    fn commit<T>(&self, epoch: u64, apply: impl FnOnce(&mut Views) -> T) -> Result<T> {
        let mut views = self.views();
        if views.epoch != epoch {
            debug!(issued = epoch, current = views.epoch, "Result from an ended session dropped");
            return Err(SyncError::SessionChanged);
        }
        Ok(apply(&mut views))
    }

    /// Reset per-session state and swap the session in one step
    fn switch_session(&self, change: impl FnOnce() -> Session) -> Session {
        let mut views = self.views();
        views.epoch += 1;
        views.home = None;
        self.cache.clear();
        change()
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let auth = self.gateway.authenticate(username, password).await?;
        Ok(self.switch_session(|| self.session.login(auth.token, auth.user)))
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Session> {
        let auth = self.gateway.register(username, password).await?;
        Ok(self.switch_session(|| self.session.login(auth.token, auth.user)))
    }

    pub fn logout(&self) -> Session {
        self.switch_session(|| self.session.logout())
    }

    /// Push a profile edit and adopt the server's copy of the user
    pub async fn update_profile(&self, patch: &IdentityPatch) -> Result<Session> {
        let ticket = self.ticket()?;
        let result = self.gateway.update_profile(&ticket.token, patch).await;
        self.adopt_profile(ticket.epoch, result)
    }

    /// Upload a new profile picture and adopt the server's copy of the user
    pub async fn update_profile_image(&self, image: &ProfileImage) -> Result<Session> {
        let ticket = self.ticket()?;
        let result = self
            .gateway
            .upload_profile_image(&ticket.token, image)
            .await;
        self.adopt_profile(ticket.epoch, result)
    }

    fn adopt_profile(
        &self,
        epoch: u64,
        result: std::result::Result<UserIdentity, ClientError>,
    ) -> Result<Session> {
        match result {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "Profile updated");
                let session = self.commit(epoch, |_| self.session.replace_identity(user))??;
                self.notify(Notification::success("Profile updated"));
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Profile update failed");
                self.commit(epoch, |_| {
                    self.notify(Notification::failure("Failed to update profile"));
                })?;
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Fetch the user's playlist and reconcile every cached track against it
    pub async fn load_home_playlist(&self) -> Result<Vec<Track>> {
        let ticket = self.ticket()?;
        self.refresh_home(&ticket).await
    }

    async fn refresh_home(&self, ticket: &Ticket) -> Result<Vec<Track>> {
        let tracks = self.gateway.fetch_playlist(&ticket.token).await?;

        let members: HashSet<SubjectId> = tracks.iter().map(|t| SubjectId::from(&t.id)).collect();
        self.commit(ticket.epoch, |views| {
            self.cache
                .set_complete(RelationKind::TrackInPlaylist, &members);
            views.home = Some(tracks.clone());
        })?;

        debug!(tracks = tracks.len(), "Home playlist reconciled");
        Ok(tracks)
    }

    /// As-you-type suggestions; a blank query yields nothing
    pub async fn suggest(&self, query: &str) -> Result<Vec<Track>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let ticket = self.ticket()?;
        Ok(self.gateway.search_tracks(&ticket.token, query).await?)
    }

    /// Run a search and hydrate playlist membership for the results
    pub async fn search(&self, query: &str, mode: SearchMode) -> Result<SearchResults> {
        if query.trim().is_empty() {
            return Ok(SearchResults::default());
        }
        let token = self.ticket()?.token;
        debug!(query = %query, mode = %mode, "Searching");

        let results = match mode {
            SearchMode::Plain => SearchResults {
                reference: None,
                tracks: self.gateway.search_tracks(&token, query).await?,
            },
            SearchMode::Key => {
                let rec = self.gateway.recommend_by_key(&token, query).await?;
                SearchResults {
                    reference: Some(rec.reference),
                    tracks: rec.tracks,
                }
            }
            SearchMode::Tempo => {
                let rec = self.gateway.recommend_by_tempo(&token, query).await?;
                SearchResults {
                    reference: Some(rec.reference),
                    tracks: rec.tracks,
                }
            }
        };

        self.hydrate_tracks_soft(&results.tracks).await;
        Ok(results)
    }

    /// Another user's playlist; membership is hydrated when signed in
    pub async fn open_user_playlist(&self, user: UserId) -> Result<UserPlaylist> {
        let playlist = self.gateway.fetch_user_playlist(user).await?;

        if self.session.is_authenticated() {
            self.hydrate_tracks_soft(&playlist.tracks).await;
        }
        Ok(playlist)
    }

    /// Users who have `track` in their playlist, minus the current user
    pub async fn open_track_listeners(&self, track: &TrackId) -> Result<Vec<UserIdentity>> {
        let ticket = self.ticket()?;
        let me = self.session.user().map(|u| u.id);

        let mut listeners = self
            .gateway
            .fetch_track_listeners(&ticket.token, track)
            .await?;
        self.commit(ticket.epoch, |_| listeners.retain(|u| Some(u.id) != me))?;

        let ids: Vec<UserId> = listeners.iter().map(|u| u.id).collect();
        if let Err(e) = self.hydrate_follow_status(&ids).await {
            warn!(error = %e, track_id = %track, "Follow status unavailable");
        }
        Ok(listeners)
    }

    /// Both follow lists for the profile view
    pub async fn open_follow_lists(&self) -> Result<FollowData> {
        let ticket = self.ticket()?;
        let data = self.gateway.fetch_follow_data(&ticket.token).await?;

        let following: HashSet<UserId> = data.following.users.iter().map(|u| u.id).collect();
        let values = following
            .iter()
            .map(|id| (SubjectId::from(id), true))
            .chain(
                data.followers
                    .users
                    .iter()
                    .filter(|u| !following.contains(&u.id))
                    .map(|u| (SubjectId::from(u.id), false)),
            );
        self.commit(ticket.epoch, |_| {
            self.cache.set_many(RelationKind::UserIsFollowed, values);
        })?;

        Ok(data)
    }

    /// Users the current user follows
    pub async fn followed_users(&self) -> Result<FollowList> {
        let ticket = self.ticket()?;
        let list = self.gateway.fetch_followed_users(&ticket.token).await?;

        self.commit(ticket.epoch, |_| {
            self.cache.set_many(
                RelationKind::UserIsFollowed,
                list.users.iter().map(|u| (SubjectId::from(u.id), true)),
            );
        })?;
        Ok(list)
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Resolve playlist membership for `ids` from the user's playlist
    pub async fn hydrate_tracks(&self, ids: &[TrackId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ticket = self.ticket()?;
        let requested: Vec<SubjectId> = ids.iter().map(SubjectId::from).collect();
        self.commit(ticket.epoch, |_| {
            self.cache
                .hydrate(RelationKind::TrackInPlaylist, requested.iter().cloned());
        })?;

        let playlist = self.gateway.fetch_playlist(&ticket.token).await?;
        let members: HashSet<SubjectId> =
            playlist.iter().map(|t| SubjectId::from(&t.id)).collect();

        self.commit(ticket.epoch, |_| {
            self.cache.set_many(
                RelationKind::TrackInPlaylist,
                requested.into_iter().map(|s| {
                    let value = members.contains(&s);
                    (s, value)
                }),
            );
        })
    }

    async fn hydrate_tracks_soft(&self, tracks: &[Track]) {
        let ids: Vec<TrackId> = tracks.iter().map(|t| t.id.clone()).collect();
        if let Err(e) = self.hydrate_tracks(&ids).await {
            warn!(error = %e, tracks = ids.len(), "Playlist membership unavailable");
        }
    }

    /// Resolve follow status for `ids`
    pub async fn hydrate_follow_status(&self, ids: &[UserId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ticket = self.ticket()?;
        self.commit(ticket.epoch, |_| {
            self.cache
                .hydrate(RelationKind::UserIsFollowed, ids.iter().map(SubjectId::from));
        })?;

        let following = self
            .gateway
            .fetch_follow_status(&ticket.token, ids)
            .await?;

        self.commit(ticket.epoch, |_| {
            self.cache.set_many(
                RelationKind::UserIsFollowed,
                ids.iter()
                    .map(|id| (SubjectId::from(id), following.contains(id))),
            );
        })
    }

    /// Drop cached relations for subjects that left the screen
    pub fn forget<I>(&self, kind: RelationKind, subjects: I)
    where
        I: IntoIterator<Item = SubjectId>,
    {
        self.cache.discard(kind, subjects);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn add_track(&self, track: &TrackId) -> Result<()> {
        self.apply(Mutation::AddTrack(track.clone())).await
    }

    pub async fn remove_track(&self, track: &TrackId) -> Result<()> {
        self.apply(Mutation::RemoveTrack(track.clone())).await
    }

    /// Flip playlist membership; returns the value now requested
    pub async fn toggle_track(&self, track: &TrackId) -> Result<bool> {
        let current = self.is_in_playlist(track).unwrap_or(false);
        if current {
            self.remove_track(track).await?;
        } else {
            self.add_track(track).await?;
        }
        Ok(!current)
    }

    pub async fn follow(&self, user: UserId) -> Result<()> {
        self.apply(Mutation::Follow(user)).await
    }

    pub async fn unfollow(&self, user: UserId) -> Result<()> {
        self.apply(Mutation::Unfollow(user)).await
    }

    /// Flip follow status; returns the value now requested
    pub async fn toggle_follow(&self, user: UserId) -> Result<bool> {
        let current = self.is_followed(user).unwrap_or(false);
        if current {
            self.unfollow(user).await?;
        } else {
            self.follow(user).await?;
        }
        Ok(!current)
    }

    pub fn is_in_playlist(&self, track: &TrackId) -> Option<bool> {
        self.cache
            .get(RelationKind::TrackInPlaylist, &SubjectId::from(track))
    }

    pub fn is_followed(&self, user: UserId) -> Option<bool> {
        self.cache
            .get(RelationKind::UserIsFollowed, &SubjectId::from(user))
    }

    async fn apply(&self, mutation: Mutation) -> Result<()> {
        let ticket = match self.ticket() {
            Ok(ticket) => ticket,
            Err(e) => {
                error!(mutation = %mutation, "Mutation issued without a session");
                return Err(e);
            }
        };

        let kind = mutation.kind();
        let subject = mutation.subject();
        let value = mutation.value();
        let write = self.commit(ticket.epoch, |_| {
            self.cache.set_optimistic(kind, &subject, value)
        })?;
        // an unknown baseline rolls back to false
        let previous = Some(write.previous.unwrap_or(false));

        match mutation.send(self.gateway.as_ref(), &ticket.token).await {
            Ok(()) => {
                info!(mutation = %mutation, version = write.version, "Mutation confirmed");
                let Ok(confirmed) = self.commit(ticket.epoch, |_| {
                    self.cache.confirm(kind, &subject, value, write.version)
                }) else {
                    return Ok(());
                };
                if let Err(superseded) = confirmed {
                    debug!(error = %superseded, "Confirmation superseded");
                }

                if let Some(message) = mutation.success_message() {
                    self.notify(Notification::success(message));
                }

                let home_loaded = self.views().home.is_some();
                if kind == RelationKind::TrackInPlaylist && home_loaded {
                    if let Err(e) = self.refresh_home(&ticket).await {
                        warn!(error = %e, "Home playlist refresh failed");
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(mutation = %mutation, version = write.version, error = %e, "Mutation failed");
                let rolled_back = self.commit(ticket.epoch, |_| {
                    self.cache.rollback(kind, &subject, previous, write.version)
                });
                match rolled_back {
                    Ok(Ok(())) => {}
                    Ok(Err(stale)) => debug!(error = %stale, "Rollback suppressed"),
                    Err(_) => return Err(e.into()),
                }
                self.notify(Notification::failure(mutation.failure_message()));
                Err(e.into())
            }
        }
    }
}
