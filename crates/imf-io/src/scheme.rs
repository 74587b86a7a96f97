/// Return the URL scheme of `locator`, if it has one.
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`,
/// terminated by `:`. Single-letter schemes are not recognised so that
/// Windows drive paths such as `C:\media` stay filesystem paths.
pub fn url_scheme(locator: &str) -> Option<&str> {
    let colon = locator.find(':')?;
    let scheme = &locator[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || scheme.len() < 2 {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}
