pub mod listing;
pub mod post;


use crate::config::SelectorConfig;
use crate::error::{HarvestError, Result};
use scraper::Selector;

/// Compiles a CSS selector, keeping the offending text in the error
pub fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Selectors used on listing pages
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub more_link: Selector,
    pub next_page: Selector,
}

impl ListingSelectors {
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            more_link: compile(&config.more_link)?,
            next_page: compile(&config.next_page)?,
        })
    }
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default()).expect("default listing selectors are valid")
    }
}

/// Selectors used on individual posts
#[derive(Debug, Clone)]
pub struct PostSelectors {
    pub title: Selector,
    pub content: Selector,
    pub feedback: Selector,
}

impl PostSelectors {
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            title: compile(&config.title)?,
            content: compile(&config.content)?,
            feedback: compile(&config.feedback)?,
        })
    }
}

impl Default for PostSelectors {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default()).expect("default post selectors are valid")
    }
}
