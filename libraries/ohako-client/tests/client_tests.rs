//! Tests for the OHAKO HTTP client.
//!
//! These run against a mock server so no real backend is needed.

use ohako_client::{ClientConfig, ClientError, OhakoClient, RemoteGateway};
use ohako_core::{IdentityPatch, ProfileImage, TrackId, UserId};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OhakoClient {
    OhakoClient::new(ClientConfig::new(server.uri())).unwrap()
}

fn track_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "spotify_id": id,
        "name": name,
        "artists": "YOASOBI, Ayase",
        "album_name": "THE BOOK",
        "album_image": "https://img.example.com/book.jpg"
    })
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        match OhakoClient::new(ClientConfig::new("")).unwrap_err() {
            ClientError::InvalidUrl(msg) => assert!(msg.contains("empty")),
            e => panic!("Expected InvalidUrl error, got {:?}", e),
        }
    }

    #[test]
    fn test_scheme_required() {
        match OhakoClient::new(ClientConfig::new("ohako.example.com")).unwrap_err() {
            ClientError::InvalidUrl(msg) => assert!(msg.contains("http")),
            e => panic!("Expected InvalidUrl error, got {:?}", e),
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OhakoClient::new(ClientConfig::new("http://localhost:8000/api/")).unwrap();
        assert_eq!(client.url(), "http://localhost:8000/api");
    }
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login/"))
            .and(body_json(json!({"username": "alice", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access": "token-abc",
                "user": {"id": 7, "username": "alice", "profile_image": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = client_for(&server)
            .authenticate("alice", "pw")
            .await
            .unwrap();

        assert_eq!(auth.token, "token-abc");
        assert_eq!(auth.user.id, UserId::new(7));
        assert_eq!(auth.user.username, "alice");
        assert!(auth.user.profile_image.is_none());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "No active account"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .authenticate("alice", "wrong")
            .await
            .unwrap_err();

        match err {
            ClientError::InvalidCredentials => {}
            e => panic!("Expected InvalidCredentials, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_register_username_taken() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "username": ["A user with that username already exists."]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .register("alice", "pw")
            .await
            .unwrap_err();

        match err {
            ClientError::UsernameTaken => {}
            e => panic!("Expected UsernameTaken, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_register_other_rejection_is_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/register/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"password": ["Too short."]})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .register("alice", "pw")
            .await
            .unwrap_err();

        match err {
            ClientError::ServerError { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("Too short"));
            }
            e => panic!("Expected ServerError, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_profile() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update_user/"))
            .and(header("Authorization", "Bearer token-abc"))
            .and(body_json(json!({"username": "alicia"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "username": "alicia",
                "profile_image": "https://img.example.com/a.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server)
            .update_profile("token-abc", &IdentityPatch::username("alicia"))
            .await
            .unwrap();

        assert_eq!(user.username, "alicia");
        assert_eq!(
            user.profile_image.as_deref(),
            Some("https://img.example.com/a.png")
        );
    }

    #[tokio::test]
    async fn test_upload_profile_image_is_multipart() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update_user/"))
            .and(header("Authorization", "Bearer token-abc"))
            .and(body_string_contains(r#"name="profile_image""#))
            .and(body_string_contains(r#"filename="me.png""#))
            .and(body_string_contains("image/png"))
            .and(body_string_contains("fake-png-bytes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "username": "alice",
                "profile_image": "/media/profile_images/me.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = ProfileImage::new("me.png", b"fake-png-bytes".to_vec());
        let user = client_for(&server)
            .upload_profile_image("token-abc", &image)
            .await
            .unwrap();

        assert_eq!(
            user.profile_image.as_deref(),
            Some("/media/profile_images/me.png")
        );
    }

    #[tokio::test]
    async fn test_upload_profile_image_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update_user/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let image = ProfileImage::new("me.png", b"x".to_vec());
        let err = client_for(&server)
            .upload_profile_image("stale", &image)
            .await
            .unwrap_err();

        match err {
            ClientError::AuthRequired => {}
            e => panic!("Expected AuthRequired, got {:?}", e),
        }
    }
}

// =============================================================================
// Playlist Tests
// =============================================================================

mod playlist {
    use super::*;

    #[tokio::test]
    async fn test_fetch_playlist_preserves_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/"))
            .and(header("Authorization", "Bearer token-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": [track_json("t2", "Idol"), track_json("t1", "Yoru ni Kakeru")]
            })))
            .mount(&server)
            .await;

        let tracks = client_for(&server).fetch_playlist("token-abc").await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, TrackId::new("t2"));
        assert_eq!(tracks[1].name, "Yoru ni Kakeru");
        assert_eq!(tracks[0].artists, vec!["YOASOBI", "Ayase"]);
    }

    #[tokio::test]
    async fn test_add_track_sends_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/add_track/"))
            .and(body_json(json!({"track_id": "t1"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .add_track("token-abc", &TrackId::new("t1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_track_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/remove_track/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .remove_track("token-abc", &TrackId::new("t1"))
            .await
            .unwrap_err();

        assert!(err.is_network());
        match err {
            ClientError::ServerError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            e => panic!("Expected ServerError, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_expired_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_playlist("stale").await.unwrap_err();

        match err {
            ClientError::AuthRequired => {}
            e => panic!("Expected AuthRequired, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_user_playlist_without_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user_playlist/42/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "name": "bob's playlist",
                "tracks": [track_json("t9", "Gunjou")]
            })))
            .mount(&server)
            .await;

        let playlist = client_for(&server)
            .fetch_user_playlist(UserId::new(42))
            .await
            .unwrap();

        assert_eq!(playlist.name, "bob's playlist");
        assert_eq!(playlist.tracks.len(), 1);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_user_playlist_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user_playlist/99/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_user_playlist(UserId::new(99))
            .await
            .unwrap_err();

        assert!(!err.is_network());
        match err {
            ClientError::NotFound(what) => assert!(what.contains("99")),
            e => panic!("Expected NotFound, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_playlist("token-abc").await.unwrap_err();

        assert!(!err.is_network());
        match err {
            ClientError::ParseError(msg) => assert!(msg.contains("playlist")),
            e => panic!("Expected ParseError, got {:?}", e),
        }
    }
}

// =============================================================================
// Social Tests
// =============================================================================

mod social {
    use super::*;

    #[tokio::test]
    async fn test_follow_status_subset() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/follow_status/"))
            .and(body_json(json!({"user_ids": [1, 2, 3]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"following": [2]})))
            .mount(&server)
            .await;

        let ids = [UserId::new(1), UserId::new(2), UserId::new(3)];
        let following = client_for(&server)
            .fetch_follow_status("token-abc", &ids)
            .await
            .unwrap();

        assert_eq!(following.len(), 1);
        assert!(following.contains(&UserId::new(2)));
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/follow_user/"))
            .and(body_json(json!({"user_id": 5})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/unfollow_user/"))
            .and(body_json(json!({"user_id": 5})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.follow_user("token-abc", UserId::new(5)).await.unwrap();
        client.unfollow_user("token-abc", UserId::new(5)).await.unwrap();
    }

    #[tokio::test]
    async fn test_follow_data_counts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/follow_data/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "following": [{"id": 2, "username": "bob"}],
                "followers": [{"id": 3, "username": "carol"}, {"id": 4, "username": "dave"}],
                "following_count": 1,
                "followers_count": 2
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let data = client.fetch_follow_data("token-abc").await.unwrap();

        assert_eq!(data.following.count, 1);
        assert_eq!(data.followers.count, 2);
        assert_eq!(data.followers.users[1].username, "dave");

        let followers = client.fetch_followers("token-abc").await.unwrap();
        assert_eq!(followers.count, 2);
    }

    #[tokio::test]
    async fn test_followed_users() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/followed_users/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "username": "bob", "profile_image": "https://img.example.com/b.png"}
            ])))
            .mount(&server)
            .await;

        let list = client_for(&server)
            .fetch_followed_users("token-abc")
            .await
            .unwrap();

        assert_eq!(list.count, 1);
        assert_eq!(list.users[0].id, UserId::new(2));
    }

    #[tokio::test]
    async fn test_track_listeners() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/track_users/t1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 7, "username": "alice"},
                {"id": 2, "username": "bob"}
            ])))
            .mount(&server)
            .await;

        let users = client_for(&server)
            .fetch_track_listeners("token-abc", &TrackId::new("t1"))
            .await
            .unwrap();

        assert_eq!(users.len(), 2);
    }
}

// =============================================================================
// Discovery Tests
// =============================================================================

mod discovery {
    use super::*;

    #[tokio::test]
    async fn test_search_encodes_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("query", "blue bird"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([track_json("t3", "Blue Bird")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tracks = client_for(&server)
            .search_tracks("token-abc", "blue bird")
            .await
            .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Blue Bird");
    }

    #[tokio::test]
    async fn test_recommend_by_tempo() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recommendations/tempo/"))
            .and(query_param("track_name", "Idol"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reference_track": track_json("t2", "Idol"),
                "tracks": [track_json("t5", "Kaibutsu"), track_json("t6", "Halzion")]
            })))
            .mount(&server)
            .await;

        let rec = client_for(&server)
            .recommend_by_tempo("token-abc", "Idol")
            .await
            .unwrap();

        assert_eq!(rec.reference.id, TrackId::new("t2"));
        assert_eq!(rec.tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_recommend_by_key_unknown_track() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recommendations/key/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .recommend_by_key("token-abc", "nothing")
            .await
            .unwrap_err();

        match err {
            ClientError::NotFound(_) => {}
            e => panic!("Expected NotFound, got {:?}", e),
        }
    }
}

// =============================================================================
// Transport Tests
// =============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server() {
        // Nothing listens on port 1.
        let client = OhakoClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();

        let err = client.fetch_playlist("token-abc").await.unwrap_err();

        assert!(err.is_network());
        match err {
            ClientError::ServerUnreachable(_) => {}
            e => panic!("Expected ServerUnreachable, got {:?}", e),
        }
    }
}
