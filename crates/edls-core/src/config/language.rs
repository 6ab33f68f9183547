//! Language descriptor and token grammar configuration.

use serde::{Deserialize, Serialize};

/// Static description of the language the bridge serves.
///
/// Registered with the editor once; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageDescriptor {
    /// Language identifier used for provider registration.
    pub id: String,

    /// Human-readable names for the language.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// File extensions, including the leading dot (e.g. `.sol`).
    #[serde(default)]
    pub extensions: Vec<String>,

    /// MIME types associated with the language.
    #[serde(default)]
    pub mimetypes: Vec<String>,
}

impl LanguageDescriptor {
    /// Descriptor for Solidity sources.
    #[must_use]
    pub fn solidity() -> Self {
        Self {
            id: "solidity".to_string(),
            aliases: vec!["Solidity".to_string(), "solidity".to_string()],
            extensions: vec![".sol".to_string()],
            mimetypes: vec!["text/x-solidity".to_string()],
        }
    }

    /// Check whether a document URI belongs to this language.
    ///
    /// A descriptor without extensions claims every document.
    #[must_use]
    pub fn matches_uri(&self, uri: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let path = uri.split(['?', '#']).next().unwrap_or(uri);
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}

impl Default for LanguageDescriptor {
    fn default() -> Self {
        Self::solidity()
    }
}

/// A single tokenizer rule: a pattern and the token class it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRule {
    /// Regular expression in the editor's tokenizer dialect.
    pub pattern: String,
    /// Token class assigned to matches.
    pub token: String,
}

impl TokenRule {
    fn new(pattern: &str, token: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            token: token.to_string(),
        }
    }
}

/// Ordered tokenizer rules for the root state.
///
/// The bridge passes the grammar through to the editor untouched; rule order
/// is significant to the editor's tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenGrammar {
    /// Rules tried in order.
    #[serde(default)]
    pub rules: Vec<TokenRule>,
}

impl TokenGrammar {
    /// Grammar for Solidity sources.
    #[must_use]
    pub fn solidity() -> Self {
        Self {
            rules: vec![
                TokenRule::new(r"@\*\*[\s\S]*?\*/", "comment.doc"),
                TokenRule::new(r"//.*", "comment"),
                TokenRule::new(r"[\+\-\*\%\=/\!\&\|\^\<\>\~]", "operator"),
                TokenRule::new(
                    r"\b(if|else|for|while|do|break|continue|return|throw|try|catch|finally|switch|case|default)\b",
                    "keyword.control",
                ),
                TokenRule::new(r"\b(true|false|null|undefined)\b", "constant.language"),
                TokenRule::new(r"\b\d+\b", "number"),
                TokenRule::new(r#"".*?""#, "string"),
                TokenRule::new(
                    r"\b(bool|byte|address|int|uint|string|mapping|array)\b",
                    "keyword.type",
                ),
            ],
        }
    }
}

impl Default for TokenGrammar {
    fn default() -> Self {
        Self::solidity()
    }
}
