//! Inline elements for table cell content

use serde::{Deserialize, Serialize};

/// Inline-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    /// Plain text content
    Text(String),
    /// A hard line break
    Break,
}

impl Inline {
    /// Build inline content from possibly multi-line text.
    ///
    /// Each source line becomes a `Text` element; lines are separated by
    /// `Break`. Empty input yields no inlines.
    pub fn lines(text: &str) -> Vec<Inline> {
        let mut inlines = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                inlines.push(Inline::Break);
            }
            inlines.push(Inline::Text(line.to_string()));
        }
        inlines
    }

    /// Flatten inline content back into plain text, breaks become newlines
    pub fn plain_text(inlines: &[Inline]) -> String {
        let mut out = String::new();
        for inline in inlines {
            match inline {
                Inline::Text(t) => out.push_str(t),
                Inline::Break => out.push('\n'),
            }
        }
        out
    }
}
