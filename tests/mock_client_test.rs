#[cfg(feature = "mock")]
mod mock_tests {
    use chrono::{Duration, Utc};
    use mockall::Sequence;
    use spotctl::{
        resolve_channel, Channel, Credential, CredentialSession, Message,
        MockChatClient, MockMusicClient, MockTokenRefresher, Page, Playlist, Result,
        ScrapeError, ScrapePipeline,
    };

    #[tokio::test]
    async fn test_mock_resolve_channel_follows_cursor() -> Result<()> {
        let mut chat = MockChatClient::new();
        let mut seq = Sequence::new();

        chat.expect_list_channels()
            .withf(|cursor| cursor.is_end())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Page::new(vec![Channel::new("C1", "general")], "next-page")));
        chat.expect_list_channels()
            .withf(|cursor| cursor.as_str() == "next-page")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Page::last(vec![Channel::new("C2", "music")])));

        assert_eq!(resolve_channel(&chat, "music").await?, "C2");
        Ok(())
    }

    #[tokio::test]
    async fn test_mock_pipeline_commits_extracted_tracks() {
        let mut chat = MockChatClient::new();
        chat.expect_list_channels()
            .returning(|_| Ok(Page::last(vec![Channel::new("C2", "music")])));
        chat.expect_channel_history()
            .withf(|channel_id, cursor| channel_id == "C2" && cursor.is_end())
            .times(1)
            .returning(|channel_id, _| {
                Ok(Page::last(vec![
                    Message::new("<spotify:track:ABC123>", channel_id),
                    Message::new("<https://open.spotify.com/track/XYZ789?si=1>", channel_id),
                ]))
            });

        let mut music = MockMusicClient::new();
        music
            .expect_list_playlists()
            .returning(|_| Ok(Page::last(vec![Playlist::new("PL1", "Heard in #music")])));
        music
            .expect_add_tracks()
            .withf(|playlist_id, tracks| {
                playlist_id == "PL1"
                    && tracks.len() == 2
                    && tracks[0] == "ABC123"
                    && tracks[1] == "XYZ789"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let report = ScrapePipeline::new(&chat, &music)
            .run("music", "Heard in #music")
            .await
            .unwrap();
        assert_eq!(report.tracks_committed, 2);
    }

    #[tokio::test]
    async fn test_mock_refresher_replaces_expired_credential() {
        let stale = Credential::new(
            "old-access".to_string(),
            "Bearer".to_string(),
            "refresh-secret".to_string(),
            Utc::now() - Duration::minutes(1),
        );

        let mut refresher = MockTokenRefresher::new();
        refresher
            .expect_refresh()
            .withf(|credential| credential.refresh_token == "refresh-secret")
            .times(1)
            .returning(|credential| {
                let mut fresh = credential.clone();
                fresh.access_token = "new-access".to_string();
                fresh.expiry = Utc::now() + Duration::hours(1);
                Ok(fresh)
            });

        let session = CredentialSession::new(Some(stale), refresher);
        assert_eq!(session.access_token().await.unwrap(), "new-access");
        assert!(session.was_replaced());
    }

    #[tokio::test]
    async fn test_mock_refresher_rejection_is_fatal() {
        let stale = Credential::new(
            "old-access".to_string(),
            "Bearer".to_string(),
            "revoked".to_string(),
            Utc::now() - Duration::minutes(1),
        );

        let mut refresher = MockTokenRefresher::new();
        refresher
            .expect_refresh()
            .times(1)
            .returning(|_| Err(ScrapeError::AuthExpired("invalid_grant".to_string())));

        let session = CredentialSession::new(Some(stale), refresher);
        assert!(matches!(
            session.access_token().await,
            Err(ScrapeError::AuthExpired(_))
        ));
    }
}
