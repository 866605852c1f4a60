//! URL helpers for joining the server address with endpoint paths.

/// Normalize a server URL by removing trailing slashes.
///
/// # Examples
///
/// ```
/// use chatbox::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:5000"), "http://localhost:5000");
/// assert_eq!(normalize_base_url("http://localhost:5000/"), "http://localhost:5000");
/// assert_eq!(normalize_base_url("http://localhost:5000///"), "http://localhost:5000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a server URL and an endpoint path without doubling slashes.
///
/// # Examples
///
/// ```
/// use chatbox::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:5000/", "/send_message"),
///     "http://localhost:5000/send_message"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Check that a configured server URL is an absolute http(s) URL.
pub fn validate_server_url(url: &str) -> Result<(), String> {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| format!("Server URL must start with http:// or https://: {trimmed}"))?;
    if rest.trim_matches('/').is_empty() {
        return Err(format!("Server URL has no host: {trimmed}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:5000"),
            "http://127.0.0.1:5000"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:5000/"),
            "http://127.0.0.1:5000"
        );
        assert_eq!(normalize_base_url("https://chat.example.com/app///"), "https://chat.example.com/app");
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("http://127.0.0.1:5000", "send_message"),
            "http://127.0.0.1:5000/send_message"
        );
        assert_eq!(
            construct_api_url("http://127.0.0.1:5000/", "/send_message"),
            "http://127.0.0.1:5000/send_message"
        );
        assert_eq!(
            construct_api_url("https://chat.example.com/app/", "///clear"),
            "https://chat.example.com/app/clear"
        );
        assert_eq!(
            construct_api_url("https://chat.example.com", ""),
            "https://chat.example.com/"
        );
    }

    #[test]
    fn server_urls_need_scheme_and_host() {
        assert!(validate_server_url("http://localhost:5000").is_ok());
        assert!(validate_server_url("https://chat.example.com/").is_ok());
        assert!(validate_server_url("localhost:5000").is_err());
        assert!(validate_server_url("http:///").is_err());
    }
}
