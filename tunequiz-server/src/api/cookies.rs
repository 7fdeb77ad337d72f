//! Session cookie helpers.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tunequiz_core::SessionId;

pub const SESSION_COOKIE_NAME: &str = "tunequiz_session";

/// Lifetime of the session cookie. Stored sessions whose access token
/// expired longer ago than this are pruned.
pub const SESSION_MAX_AGE_DAYS: i64 = 30;

/// Create the session cookie.
pub(super) fn session_cookie(session_id: &SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id.as_str().to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_MAX_AGE_DAYS))
        .build()
}

/// Drop the session cookie from the jar.
pub(super) fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"))
}

/// Get the session id from cookies.
pub(super) fn get_session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .map(SessionId::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&SessionId::new("abc"), true);

        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::days(SESSION_MAX_AGE_DAYS))
        );
    }

    #[test]
    fn test_get_session_id_round_trip() {
        let jar = CookieJar::new().add(session_cookie(&SessionId::new("abc"), false));
        assert_eq!(get_session_id(&jar), Some(SessionId::new("abc")));

        let jar = clear_session_cookie(jar);
        assert_eq!(get_session_id(&jar), None);
    }
}
