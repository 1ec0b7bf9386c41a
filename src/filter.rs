use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for filtering discovered post links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Whether to keep post links pointing away from the seed's domain
    #[serde(default = "default_allow_external")]
    pub allow_external: bool,

    /// Regex patterns for URLs to keep (if empty, all URLs are kept unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to drop (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_allow_external() -> bool {
    true
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            allow_external: default_allow_external(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// URL filter that uses regex patterns and domain scoping to decide which post links to keep
#[derive(Debug)]
pub struct UrlFilter {
    config: UrlFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            config: UrlFilterConfig::default(),
            include_regexes: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a post link found while walking `seed` should be kept
    pub fn should_keep(&self, url: &Url, seed: &Url) -> bool {
        if !self.is_in_domain_scope(url, seed) {
            return false;
        }

        // Exclusions take precedence
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }

    fn is_in_domain_scope(&self, url: &Url, seed: &Url) -> bool {
        if self.config.allow_external {
            return true;
        }

        match (url.host_str(), seed.host_str()) {
            (Some(host), Some(seed_host)) => host == seed_host,
            _ => false,
        }
    }

    /// Create a normalized version of the URL (drops `#more-123` style fragments)
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Url {
        Url::parse("https://blog.example.com").unwrap()
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let filter = UrlFilter::default();

        let local = Url::parse("https://blog.example.com/2024/05/post/").unwrap();
        assert!(filter.should_keep(&local, &seed()));

        let external = Url::parse("https://cdn.other.net/post/").unwrap();
        assert!(filter.should_keep(&external, &seed()));
    }

    #[test]
    fn test_domain_restriction() {
        let config = UrlFilterConfig {
            allow_external: false,
            ..UrlFilterConfig::default()
        };
        let filter = UrlFilter::new(config).unwrap();

        let correct_domain = Url::parse("https://blog.example.com/post").unwrap();
        assert!(filter.should_keep(&correct_domain, &seed()));

        let wrong_domain = Url::parse("https://other.com/post").unwrap();
        assert!(!filter.should_keep(&wrong_domain, &seed()));
    }

    #[test]
    fn test_regex_patterns() {
        let config = UrlFilterConfig {
            allow_external: true,
            include_patterns: vec![r"/\d{4}/\d{2}/".to_string()],
            exclude_patterns: vec![r"/sponsored-".to_string()],
        };
        let filter = UrlFilter::new(config).unwrap();

        let included = Url::parse("https://blog.example.com/2024/05/hello/").unwrap();
        assert!(filter.should_keep(&included, &seed()));

        let not_included = Url::parse("https://blog.example.com/about/").unwrap();
        assert!(!filter.should_keep(&not_included, &seed()));

        // Matching exclude pattern wins over a matching include pattern
        let excluded = Url::parse("https://blog.example.com/2024/05/sponsored-deal/").unwrap();
        assert!(!filter.should_keep(&excluded, &seed()));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = UrlFilterConfig {
            include_patterns: vec!["(unclosed".to_string()],
            ..UrlFilterConfig::default()
        };
        assert!(UrlFilter::new(config).is_err());
    }

    #[test]
    fn test_normalize_strips_fragment() {
        let filter = UrlFilter::default();
        let url = Url::parse("https://blog.example.com/hello/#more-42").unwrap();
        assert_eq!(
            filter.normalize_url(&url).as_str(),
            "https://blog.example.com/hello/"
        );
    }
}
