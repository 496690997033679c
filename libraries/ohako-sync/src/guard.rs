//! Route guard
//!
//! Every view requires a signed-in user. Each navigation is evaluated
//! afresh against the session; a denied navigation is redirected home and
//! asks the login surface to open.

use crate::session::SessionStore;
use ohako_core::{TrackId, UserId};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Views a front end can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Search { query: String },
    UserPlaylist { user: UserId },
    TrackListeners { track: TrackId },
    Profile,
    FollowedUsers,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Search { query } => write!(f, "/search?query={}", query),
            Route::UserPlaylist { user } => write!(f, "/user/{}", user),
            Route::TrackListeners { track } => write!(f, "/track/{}/users", track),
            Route::Profile => write!(f, "/profile"),
            Route::FollowedUsers => write!(f, "/followed"),
        }
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Denied { redirect: Route },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }
}

/// Whatever asks the user to sign in
pub trait LoginSurface: Send + Sync {
    fn open_login(&self);
}

/// Login surface state: open or closed, plus how often it was opened
#[derive(Debug, Default)]
pub struct LoginPrompt {
    open: AtomicBool,
    opened: AtomicUsize,
}

impl LoginPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn times_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl LoginSurface for LoginPrompt {
    fn open_login(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct RouteGuard<L: LoginSurface> {
    session: Arc<SessionStore>,
    login: Arc<L>,
}

impl<L: LoginSurface> RouteGuard<L> {
    pub fn new(session: Arc<SessionStore>, login: Arc<L>) -> Self {
        Self { session, login }
    }

    pub fn login_surface(&self) -> &L {
        &self.login
    }

    /// Decide a navigation to `route`
    pub fn evaluate(&self, route: &Route) -> GuardDecision {
        if self.session.is_authenticated() {
            return GuardDecision::Allowed;
        }

        debug!(route = %route, "Navigation denied, opening login");
        self.login.open_login();
        GuardDecision::Denied {
            redirect: Route::Home,
        }
    }
}
