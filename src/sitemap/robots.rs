//! Robots.txt handling
//!
//! Two things are read from robots.txt: the first `Sitemap:` directive, and
//! the allow/disallow rules used to keep disallowed pages out of a sample.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt content
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content (empty means allow all)
    content: String,
    allow_all: bool,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive policy
    ///
    /// Used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.allow_all || self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Returns the first declared sitemap URL
    pub fn sitemap(&self) -> Option<String> {
        find_sitemap_directive(&self.content)
    }
}

/// Finds the first `Sitemap:` directive, matching the key case-insensitively
///
/// # Examples
///
/// ```
/// use cdn_audit::sitemap::find_sitemap_directive;
///
/// let robots = "User-agent: *\nDisallow: /cart\nSITEMAP: https://example.com/sm.xml\n";
/// assert_eq!(
///     find_sitemap_directive(robots),
///     Some("https://example.com/sm.xml".to_string())
/// );
/// ```
pub fn find_sitemap_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            return None;
        }
        let (key, value) = trimmed.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("sitemap") {
            return None;
        }
        // Inline comments are not part of the URL
        let value = value.split('#').next().unwrap_or_default().trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
