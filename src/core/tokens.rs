//! Session token scraping from the translator's landing page

use regex::Regex;

/// Key of the session id, sent as `f.sid`
pub const SESSION_ID_KEY: &str = "FdrFJe";

/// Key of the frontend build label, sent as `bl`
pub const BUILD_LABEL_KEY: &str = "cfb2h";

/// Tokens embedded into the translate query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub session_id: String,
    pub build_label: String,
}

impl SessionTokens {
    /// Scrape both tokens from the landing page; missing ones are left empty
    pub fn from_init_data(init_data: &str) -> Self {
        Self {
            session_id: extract(SESSION_ID_KEY, init_data),
            build_label: extract(BUILD_LABEL_KEY, init_data),
        }
    }
}

/// Value of the first `"key":"value"` pair in `text`, or an empty string
pub fn extract(key: &str, text: &str) -> String {
    let pattern = format!(r#""{}":"(.*?)""#, regex::escape(key));
    let Ok(re) = Regex::new(&pattern) else {
        return String::new();
    };

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
