use clipfetch_core::{check, validate, Platform, ValidationError, MAX_URL_LEN};

#[test]
fn accepts_short_youtube_link() {
    assert!(validate("https://youtu.be/abc123", Platform::Youtube));
}

#[test]
fn accepts_common_youtube_shapes() {
    for url in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
        "https://m.youtube.com/shorts/abcDEF123",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/@somechannel",
        "https://www.youtube.com/channel/UC1234567890",
        "https://www.youtube.com/playlist?list=PL123",
    ] {
        assert!(validate(url, Platform::Youtube), "{url}");
    }
}

#[test]
fn rejects_youtube_without_video_segment() {
    for url in [
        "https://www.youtube.com/",
        "https://youtu.be/",
        "https://vimeo.com/12345",
        "not a url",
    ] {
        assert!(!validate(url, Platform::Youtube), "{url}");
    }
}

#[test]
fn instagram_accepts_posts_reels_stories_and_profiles() {
    for url in [
        "https://www.instagram.com/p/Cx1_ab-9/",
        "https://instagram.com/reel/Cx1ab9/?igsh=abc",
        "instagr.am/tv/Cx1ab9",
        "https://www.instagram.com/stories/some.user/3123456789/",
        "https://www.instagram.com/natgeo/",
        "https://www.instagram.com/natgeo/reel/C1abcDEF/",
        "https://www.instagram.com/some.user/p/Cx1_ab-9/?img_index=1",
    ] {
        assert!(validate(url, Platform::Instagram), "{url}");
    }
    assert!(!validate("https://www.instagram.com/", Platform::Instagram));
    assert!(!validate("https://youtu.be/abc123", Platform::Instagram));
}

#[test]
fn spotify_requires_kind_and_id() {
    assert!(validate(
        "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC",
        Platform::Spotify
    ));
    assert!(validate(
        "open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=xyz",
        Platform::Spotify
    ));
    assert!(!validate("https://open.spotify.com/show/abc", Platform::Spotify));
    assert!(!validate("https://spotify.com/track/abc", Platform::Spotify));
}

#[test]
fn unknown_platform_always_fails() {
    assert_eq!(
        check("https://youtu.be/abc123", Platform::Other),
        Err(ValidationError::PatternMismatch {
            platform: Platform::Other
        })
    );
}

#[test]
fn empty_and_overlong_urls_fail_before_pattern_matching() {
    assert_eq!(check("", Platform::Youtube), Err(ValidationError::Empty));

    let prefix = "https://youtu.be/";
    let at_limit = format!("{prefix}{}", "a".repeat(MAX_URL_LEN - prefix.len()));
    assert!(validate(&at_limit, Platform::Youtube));

    let over = format!("{at_limit}a");
    assert_eq!(
        check(&over, Platform::Youtube),
        Err(ValidationError::TooLong {
            len: MAX_URL_LEN + 1
        })
    );
}

#[test]
fn error_messages_name_the_platform() {
    let err = check("https://example.com", Platform::Instagram).unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid instagram URL.");
    assert_eq!(
        ValidationError::Empty.to_string(),
        "Please enter a valid URL (max 200 characters)."
    );
}

#[test]
fn platform_parse_is_total() {
    assert_eq!(Platform::parse("YouTube"), Platform::Youtube);
    assert_eq!(Platform::parse(" spotify "), Platform::Spotify);
    assert_eq!(Platform::parse("tiktok"), Platform::Other);
}
