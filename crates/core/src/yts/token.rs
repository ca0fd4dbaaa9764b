//! Hidden form field extraction from HTML pages.

use regex_lite::Regex;

/// Pulls the value of a named hidden form field out of an HTML document.
pub trait FormTokenExtractor: Send + Sync {
    fn extract(&self, html: &str, field: &str) -> Option<String>;
}

/// Matches `name="<field>" value="<value>"` literally. Tied to the attribute
/// order the login page renders.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexTokenExtractor;

impl FormTokenExtractor for RegexTokenExtractor {
    fn extract(&self, html: &str, field: &str) -> Option<String> {
        let pattern = format!(r#"name="{}" value="([^"]+)""#, regex_lite::escape(field));
        let re = Regex::new(&pattern).ok()?;
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
