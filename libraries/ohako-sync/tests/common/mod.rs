//! In-memory gateway for coordinator tests.
//!
//! Holds a tiny server state and lets tests fail operations outright or
//! hold individual calls until released, to reproduce completions that
//! arrive out of order.

#![allow(dead_code)]

use async_trait::async_trait;
use ohako_client::{Authenticated, ClientError, RemoteGateway, Result};
use ohako_core::{
    FollowData, FollowList, IdentityPatch, ProfileImage, Recommendation, Track, TrackId, UserId,
    UserIdentity, UserPlaylist,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const TOKEN: &str = "token-alice";
pub const PASSWORD: &str = "hunter2";

pub fn alice() -> UserIdentity {
    UserIdentity::new(1, "alice")
}

pub fn user(id: i64, name: &str) -> UserIdentity {
    UserIdentity::new(id, name)
}

pub fn track(id: &str, name: &str) -> Track {
    Track::new(id, name).with_artists(["YOASOBI"])
}

/// Releases one held gateway call
pub struct Gate(oneshot::Sender<bool>);

impl Gate {
    pub fn succeed(self) {
        let _ = self.0.send(true);
    }

    pub fn fail(self) {
        let _ = self.0.send(false);
    }
}

#[derive(Default)]
struct State {
    me: Option<UserIdentity>,
    playlist: Vec<Track>,
    catalog: Vec<Track>,
    following: HashSet<UserId>,
    followers: Vec<UserIdentity>,
    directory: HashMap<UserId, UserIdentity>,
    listeners: HashMap<TrackId, Vec<UserIdentity>>,
    user_playlists: HashMap<UserId, UserPlaylist>,
    failing: HashSet<&'static str>,
    gates: HashMap<&'static str, VecDeque<oneshot::Receiver<bool>>>,
    started: HashMap<&'static str, usize>,
    finished: HashMap<&'static str, usize>,
}

#[derive(Default)]
pub struct ScriptedGateway {
    state: Mutex<State>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        let gateway = Self::default();
        gateway.state.lock().unwrap().me = Some(alice());
        Arc::new(gateway)
    }

    pub fn set_playlist(&self, tracks: Vec<Track>) {
        self.state.lock().unwrap().playlist = tracks;
    }

    pub fn playlist_ids(&self) -> Vec<TrackId> {
        self.state
            .lock()
            .unwrap()
            .playlist
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn set_catalog(&self, tracks: Vec<Track>) {
        self.state.lock().unwrap().catalog = tracks;
    }

    pub fn add_user(&self, user: UserIdentity) {
        self.state.lock().unwrap().directory.insert(user.id, user);
    }

    pub fn set_following(&self, ids: &[i64]) {
        let mut state = self.state.lock().unwrap();
        state.following = ids.iter().copied().map(UserId::new).collect();
    }

    pub fn is_following(&self, id: i64) -> bool {
        self.state.lock().unwrap().following.contains(&UserId::new(id))
    }

    pub fn set_followers(&self, users: Vec<UserIdentity>) {
        self.state.lock().unwrap().followers = users;
    }

    pub fn set_listeners(&self, track: &str, users: Vec<UserIdentity>) {
        self.state
            .lock()
            .unwrap()
            .listeners
            .insert(TrackId::new(track), users);
    }

    pub fn set_user_playlist(&self, owner: i64, playlist: UserPlaylist) {
        self.state
            .lock()
            .unwrap()
            .user_playlists
            .insert(UserId::new(owner), playlist);
    }

    /// Make every call to `op` fail
    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    /// Hold the next call to `op` until the returned gate is released
    pub fn gate(&self, op: &'static str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.state
            .lock()
            .unwrap()
            .gates
            .entry(op)
            .or_default()
            .push_back(rx);
        Gate(tx)
    }

    /// Calls to `op` that have reached the gateway
    pub fn started(&self, op: &'static str) -> usize {
        self.state
            .lock()
            .unwrap()
            .started
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    /// Calls to `op` that have returned
    pub fn finished(&self, op: &'static str) -> usize {
        self.state
            .lock()
            .unwrap()
            .finished
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    async fn call<T>(
        &self,
        op: &'static str,
        token: Option<&str>,
        apply: impl FnOnce(&mut State) -> Result<T> + Send,
    ) -> Result<T> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            *state.started.entry(op).or_default() += 1;
            state.gates.get_mut(op).and_then(|q| q.pop_front())
        };

        let released = match gate {
            Some(rx) => rx.await.unwrap_or(false),
            None => true,
        };

        let mut state = self.state.lock().unwrap();
        let result = if !released {
            Err(ClientError::ServerError {
                status: 500,
                message: format!("{} failed", op),
            })
        } else if state.failing.contains(op) {
            Err(ClientError::ServerUnreachable(format!("{} unreachable", op)))
        } else if token.is_some_and(|t| t != TOKEN) {
            Err(ClientError::AuthRequired)
        } else {
            apply(&mut *state)
        };
        *state.finished.entry(op).or_default() += 1;
        result
    }
}

fn lookup(state: &State, name: &str) -> Result<Track> {
    state
        .catalog
        .iter()
        .find(|t| t.name == name)
        .cloned()
        .ok_or_else(|| ClientError::NotFound(format!("track {}", name)))
}

fn users_for(state: &State, ids: &HashSet<UserId>) -> Vec<UserIdentity> {
    let mut users: Vec<UserIdentity> = ids
        .iter()
        .map(|id| {
            state
                .directory
                .get(id)
                .cloned()
                .unwrap_or_else(|| UserIdentity::new(*id, format!("user{}", id)))
        })
        .collect();
    users.sort_by_key(|u| u.id);
    users
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Authenticated> {
        self.call("authenticate", None, |state| {
            let me = state.me.clone().ok_or(ClientError::InvalidCredentials)?;
            if username == me.username && password == PASSWORD {
                Ok(Authenticated {
                    token: TOKEN.to_string(),
                    user: me,
                })
            } else {
                Err(ClientError::InvalidCredentials)
            }
        })
        .await
    }

    async fn register(&self, username: &str, _password: &str) -> Result<Authenticated> {
        self.call("register", None, |state| {
            if state.me.as_ref().is_some_and(|u| u.username == username) {
                return Err(ClientError::UsernameTaken);
            }
            let user = UserIdentity::new(99, username);
            state.me = Some(user.clone());
            Ok(Authenticated {
                token: TOKEN.to_string(),
                user,
            })
        })
        .await
    }

    async fn fetch_playlist(&self, token: &str) -> Result<Vec<Track>> {
        self.call("fetch_playlist", Some(token), |state| Ok(state.playlist.clone()))
            .await
    }

    async fn add_track(&self, token: &str, track_id: &TrackId) -> Result<()> {
        self.call("add_track", Some(token), |state| {
            if !state.playlist.iter().any(|t| &t.id == track_id) {
                let track = state
                    .catalog
                    .iter()
                    .find(|t| &t.id == track_id)
                    .cloned()
                    .unwrap_or_else(|| Track::new(track_id.clone(), track_id.as_str()));
                state.playlist.push(track);
            }
            Ok(())
        })
        .await
    }

    async fn remove_track(&self, token: &str, track_id: &TrackId) -> Result<()> {
        self.call("remove_track", Some(token), |state| {
            state.playlist.retain(|t| &t.id != track_id);
            Ok(())
        })
        .await
    }

    async fn fetch_follow_status(
        &self,
        token: &str,
        user_ids: &[UserId],
    ) -> Result<HashSet<UserId>> {
        self.call("fetch_follow_status", Some(token), |state| {
            Ok(user_ids
                .iter()
                .filter(|id| state.following.contains(*id))
                .copied()
                .collect())
        })
        .await
    }

    async fn follow_user(&self, token: &str, user_id: UserId) -> Result<()> {
        self.call("follow_user", Some(token), |state| {
            state.following.insert(user_id);
            Ok(())
        })
        .await
    }

    async fn unfollow_user(&self, token: &str, user_id: UserId) -> Result<()> {
        self.call("unfollow_user", Some(token), |state| {
            state.following.remove(&user_id);
            Ok(())
        })
        .await
    }

    async fn fetch_followed_users(&self, token: &str) -> Result<FollowList> {
        self.call("fetch_followed_users", Some(token), |state| {
            let users = users_for(state, &state.following);
            Ok(FollowList {
                count: users.len() as u64,
                users,
            })
        })
        .await
    }

    async fn fetch_follow_data(&self, token: &str) -> Result<FollowData> {
        self.call("fetch_follow_data", Some(token), |state| {
            let following = users_for(state, &state.following);
            Ok(FollowData {
                following: FollowList {
                    count: following.len() as u64,
                    users: following,
                },
                followers: FollowList {
                    count: state.followers.len() as u64,
                    users: state.followers.clone(),
                },
            })
        })
        .await
    }

    async fn fetch_track_listeners(
        &self,
        token: &str,
        track_id: &TrackId,
    ) -> Result<Vec<UserIdentity>> {
        self.call("fetch_track_listeners", Some(token), |state| {
            Ok(state.listeners.get(track_id).cloned().unwrap_or_default())
        })
        .await
    }

    async fn fetch_user_playlist(&self, user_id: UserId) -> Result<UserPlaylist> {
        self.call("fetch_user_playlist", None, |state| {
            state
                .user_playlists
                .get(&user_id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("playlist of user {}", user_id)))
        })
        .await
    }

    async fn search_tracks(&self, token: &str, query: &str) -> Result<Vec<Track>> {
        let needle = query.to_lowercase();
        self.call("search_tracks", Some(token), |state| {
            Ok(state
                .catalog
                .iter()
                .filter(|t| t.name.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
        .await
    }

    async fn recommend_by_key(&self, token: &str, query: &str) -> Result<Recommendation> {
        self.call("recommend_by_key", Some(token), |state| {
            let reference = lookup(state, query)?;
            let tracks = state
                .catalog
                .iter()
                .filter(|t| t.id != reference.id)
                .cloned()
                .collect();
            Ok(Recommendation { reference, tracks })
        })
        .await
    }

    async fn recommend_by_tempo(&self, token: &str, query: &str) -> Result<Recommendation> {
        self.call("recommend_by_tempo", Some(token), |state| {
            let reference = lookup(state, query)?;
            Ok(Recommendation {
                reference,
                tracks: Vec::new(),
            })
        })
        .await
    }

    async fn update_profile(&self, token: &str, patch: &IdentityPatch) -> Result<UserIdentity> {
        self.call("update_profile", Some(token), |state| {
            let me = state.me.as_mut().ok_or(ClientError::AuthRequired)?;
            me.apply(patch);
            Ok(me.clone())
        })
        .await
    }

    async fn upload_profile_image(
        &self,
        token: &str,
        image: &ProfileImage,
    ) -> Result<UserIdentity> {
        self.call("upload_profile_image", Some(token), |state| {
            let me = state.me.as_mut().ok_or(ClientError::AuthRequired)?;
            me.profile_image = Some(format!("/media/profile_images/{}", image.file_name));
            Ok(me.clone())
        })
        .await
    }
}
