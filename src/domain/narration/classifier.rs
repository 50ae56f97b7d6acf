use regex::Regex;

/// Keywords that mark a page as front matter
pub const DEFAULT_FRONT_MATTER_KEYWORDS: &[&str] = &[
    "copyright",
    "all rights reserved",
    "isbn",
    "library of congress",
    "cataloging-in-publication",
    "table of contents",
    "contents",
    "acknowledgements",
    "acknowledgments",
    "dedication",
    "index",
    "imprint",
    "published by",
    "first published",
    "printed in",
    "typeset",
    "cover design",
    "list of figures",
    "list of tables",
    "list of illustrations",
];

/// Patterns whose presence means narratable content begins on this page
pub const DEFAULT_CONTENT_START_PATTERNS: &[&str] = &[
    r"(?i)\bchapter\s+\d+",
    r"(?i)\bintroduction\b",
    r"(?i)\bforeword\b",
];

/// Decides whether a normalized page is front matter or the start of content.
///
/// Keyword and pattern sets are injected so callers can extend them.
#[derive(Debug, Clone)]
pub struct BoundaryClassifier {
    front_matter_keywords: Vec<String>,
    content_start_patterns: Vec<Regex>,
}

impl BoundaryClassifier {
    pub fn new<I, S>(front_matter_keywords: I, content_start_patterns: Vec<Regex>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let front_matter_keywords = front_matter_keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();

        Self {
            front_matter_keywords,
            content_start_patterns,
        }
    }

    /// Append extra front matter keywords to the current set
    pub fn with_extra_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !self.front_matter_keywords.contains(&keyword) {
                self.front_matter_keywords.push(keyword);
            }
        }
        self
    }

    pub fn front_matter_keywords(&self) -> &[String] {
        &self.front_matter_keywords
    }

    pub fn is_front_matter(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.front_matter_keywords
            .iter()
            .any(|keyword| lowered.contains(keyword.as_str()))
    }

    pub fn signals_content_start(&self, text: &str) -> bool {
        self.content_start_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }
}

impl Default for BoundaryClassifier {
    fn default() -> Self {
        let patterns = DEFAULT_CONTENT_START_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("valid content start pattern"))
            .collect();
        Self::new(DEFAULT_FRONT_MATTER_KEYWORDS.iter(), patterns)
    }
}
