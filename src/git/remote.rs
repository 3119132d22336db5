use git2::Repository as Git2Repo;
use std::path::Path;
use tracing::debug;

/// Browsable URL of the repository's remote, e.g. for commit links.
///
/// Returns `None` when there is no repository, no such remote or the
/// remote has no URL.
pub fn remote_web_url(root: &Path, remote_name: &str) -> Option<String> {
    let repo = Git2Repo::discover(root).ok()?;
    let remote = repo.find_remote(remote_name).ok()?;
    let url = web_url(remote.url()?);
    debug!(remote = remote_name, url = %url, "detected repository URL");
    Some(url)
}

/// Turn a clone URL into a browsable https URL.
///
/// `git@host:owner/repo.git` becomes `https://host/owner/repo`; a trailing
/// `.git` or `/` is dropped from any URL.
pub fn web_url(remote_url: &str) -> String {
    let url = remote_url.trim();
    let url = match url.strip_prefix("git@") {
        Some(rest) => format!("https://{}", rest.replacen(':', "/", 1)),
        None => url.to_string(),
    };
    let url = url.trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_url_from_ssh() {
        assert_eq!(
            web_url("git@github.com:acme/mono.git"),
            "https://github.com/acme/mono"
        );
    }

    #[test]
    fn test_web_url_from_https() {
        assert_eq!(
            web_url("https://github.com/acme/mono.git"),
            "https://github.com/acme/mono"
        );
        assert_eq!(
            web_url("https://github.com/acme/mono/"),
            "https://github.com/acme/mono"
        );
    }

    #[test]
    fn test_remote_web_url_outside_repository() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(remote_web_url(dir.path(), "origin"), None);
    }
}
