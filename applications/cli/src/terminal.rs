/// Terminal rendering and the login hint
use ohako_core::{Track, UserIdentity};
use ohako_sync::{LoginSurface, Notification};

/// Login surface for a terminal: prints how to log in
#[derive(Debug, Default)]
pub struct TerminalLogin;

impl LoginSurface for TerminalLogin {
    fn open_login(&self) {
        eprintln!("Not logged in. Run `ohako login <username> --password <password>` first.");
    }
}

/// One line per track, with a marker for playlist membership
pub fn print_tracks(tracks: &[Track], in_playlist: impl Fn(&Track) -> Option<bool>) {
    if tracks.is_empty() {
        println!("No matching tracks found");
        return;
    }

    for (index, track) in tracks.iter().enumerate() {
        let marker = match in_playlist(track) {
            Some(true) => "★",
            Some(false) => "☆",
            None => "?",
        };
        println!(
            "{:>3}. {} {} - {}  [{}]",
            index + 1,
            marker,
            track.name,
            track.artists_display(),
            track.id
        );
    }
}

/// One line per user, with a marker for follow status
pub fn print_users(users: &[UserIdentity], followed: impl Fn(&UserIdentity) -> Option<bool>) {
    if users.is_empty() {
        println!("No users");
        return;
    }

    for user in users {
        let marker = match followed(user) {
            Some(true) => "following",
            Some(false) => "",
            None => "?",
        };
        println!("{:>6}  {:<24} {}", user.id, user.username, marker);
    }
}

pub fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        if notification.is_failure() {
            eprintln!("{}", notification);
        } else {
            println!("{}", notification);
        }
    }
}
