use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DATESTAMP_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{14})(id_)?/").unwrap());

/// Derives the raw-content counterpart of a Wayback-style URI-M by appending
/// `id_` to its 14-digit capture timestamp path segment. The raw variant
/// serves the original capture bytes without archive-injected banners, which
/// is what hashing and boilerplate removal must operate on.
///
/// URI-Ms that already point at raw content, or that carry no timestamp
/// segment, pass through unchanged.
pub fn raw_urim(urim: &str) -> String {
    match DATESTAMP_SEGMENT.captures(urim) {
        Some(caps) if caps.get(2).is_none() => DATESTAMP_SEGMENT
            .replace(urim, |c: &Captures| format!("/{}id_/", &c[1]))
            .into_owned(),
        _ => urim.to_string(),
    }
}
