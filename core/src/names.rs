//! Display-name helpers.
//!
//! The backend rarely returns a usable name, so the session layer rebuilds
//! one from local sources. Each source is a `NameSource` producing an
//! optional candidate; `first_non_empty` picks the winner in priority order
//! and `derive_display_name` is the last resort.

/// Placeholder used when an email has no local part at all.
pub const FALLBACK_NAME: &str = "Usuario";

/// Trim and lowercase, the form used for cache keys and comparisons.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The part before `@`, or the whole input when there is none.
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Builds a readable name from an email local part: splits on `.`, `_` and
/// `-` and capitalizes each token.
///
/// `joao.silva@x.com` becomes `Joao Silva`; `joaosilva@x.com` becomes
/// `Joaosilva`.
pub fn derive_display_name(email: &str) -> String {
    let local = email_local_part(email.trim());
    let name = local
        .split(['.', '_', '-'])
        .filter(|token| !token.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// A stored name is unresolved when it is blank or just the raw email local
/// part.
pub fn looks_unresolved(name: &str, email: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name == email_local_part(email)
}

/// Where a display-name candidate came from, in descending trust order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Per-email name cache.
    Cached,
    /// Temporary registration record for the same email.
    PendingRegistration,
    /// Previously stored session for the same email.
    PreviousSession,
    /// `nome` field of the login response.
    LoginResponse,
}

impl NameSource {
    /// Login resolution order.
    pub const LOGIN_ORDER: [NameSource; 4] = [
        NameSource::Cached,
        NameSource::PendingRegistration,
        NameSource::PreviousSession,
        NameSource::LoginResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NameSource::Cached => "cache",
            NameSource::PendingRegistration => "pending_registration",
            NameSource::PreviousSession => "previous_session",
            NameSource::LoginResponse => "login_response",
        }
    }
}

/// Returns the first candidate that is non-blank after trimming, with its
/// source.
pub fn first_non_empty<I>(candidates: I) -> Option<(NameSource, String)>
where
    I: IntoIterator<Item = (NameSource, Option<String>)>,
{
    candidates.into_iter().find_map(|(source, name)| {
        let name = name?.trim().to_string();
        (!name.is_empty()).then_some((source, name))
    })
}

/// Final login name: the winning candidate, unless it is missing or equal to
/// the email local part, in which case the derived name is used. Short names
/// are kept as given.
pub fn settle_login_name(winner: Option<String>, normalized_email: &str) -> String {
    match winner {
        Some(name) if name != email_local_part(normalized_email) => name,
        _ => derive_display_name(normalized_email),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_names_from_email() {
        assert_eq!(derive_display_name("joao.silva@x.com"), "Joao Silva");
        assert_eq!(derive_display_name("joaosilva@x.com"), "Joaosilva");
        assert_eq!(derive_display_name("MARIA_de-souza@x.com"), "Maria De Souza");
        assert_eq!(derive_display_name("a..b@x.com"), "A B");
        assert_eq!(derive_display_name("@x.com"), FALLBACK_NAME);
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ana@X.COM "), "ana@x.com");
    }

    #[test]
    fn unresolved_names() {
        assert!(looks_unresolved("", "ana@x.com"));
        assert!(looks_unresolved("ana", "ana@x.com"));
        assert!(!looks_unresolved("Ana Souza", "ana@x.com"));
    }

    #[test]
    fn first_non_empty_respects_order_and_skips_blanks() {
        let winner = first_non_empty([
            (NameSource::Cached, None),
            (NameSource::PendingRegistration, Some("  ".to_string())),
            (NameSource::PreviousSession, Some(" Ana ".to_string())),
            (NameSource::LoginResponse, Some("Other".to_string())),
        ]);
        assert_eq!(winner, Some((NameSource::PreviousSession, "Ana".to_string())));
        assert_eq!(first_non_empty(Vec::new()), None);
    }

    #[test]
    fn settle_prefers_derived_over_weak_candidates() {
        assert_eq!(settle_login_name(None, "joao.silva@x.com"), "Joao Silva");
        assert_eq!(
            settle_login_name(Some("joao.silva".to_string()), "joao.silva@x.com"),
            "Joao Silva"
        );
        assert_eq!(settle_login_name(Some("Jo".to_string()), "jo@x.com"), "Jo");
        assert_eq!(
            settle_login_name(Some("Li".to_string()), "robert.king@x.com"),
            "Li"
        );
        assert_eq!(
            settle_login_name(Some("Ana Souza".to_string()), "ana@x.com"),
            "Ana Souza"
        );
    }
}
