//! Content checks shared by the server commands and the client forms.

/// Rejects markdown links `[label](url)` whose URL is not an absolute
/// http(s) URL with a host. Bare URLs in running text are left alone.
pub fn validate_hyperlinks(text: &str) -> Result<(), String> {
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find(']') else {
            break;
        };
        let after_label = &after_open[close + 1..];
        if let Some(target) = after_label.strip_prefix('(') {
            let Some(end) = target.find(')') else {
                return Err("unterminated hyperlink".into());
            };
            let url = &target[..end];
            if !is_web_url(url) {
                return Err(format!("invalid hyperlink '{url}'"));
            }
            rest = &target[end + 1..];
        } else {
            rest = after_open;
        }
    }
    Ok(())
}

fn is_web_url(url: &str) -> bool {
    let Some(remainder) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };
    let host = remainder.split(['/', '?', '#']).next().unwrap_or_default();
    !host.is_empty()
        && !host.starts_with('.')
        && host.contains('.')
        && !remainder.chars().any(char::is_whitespace)
}

/// Client-side guard for comment and answer forms: whitespace-only input is
/// refused before any command is sent.
pub fn ensure_not_blank(text: &str, what: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        Err(format!("{what} cannot be empty"))
    } else {
        Ok(())
    }
}
