//! Anonymous session cookie.

use hoax_core::SessionId;

/// Value of cookie `name` in a `Cookie` request header.
pub fn read_cookie(header: Option<&str>, name: &str) -> Option<SessionId> {
    header?
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .and_then(|(_, v)| SessionId::new(v.trim().trim_matches('"')).ok())
}

pub fn set_cookie(name: &str, session: &SessionId) -> String {
    format!("{name}={session}; Path=/; HttpOnly; SameSite=Lax")
}
