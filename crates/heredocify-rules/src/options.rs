//! Rewrite options shared by the rule and the configuration file

use serde::{Deserialize, Serialize};

/// How the emitted heredoc removes the source indentation of its body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeredocStyle {
    /// `<<-END.strip_indent`
    #[default]
    StripIndent,
    /// `<<~END`
    Squiggly,
}

/// Options controlling the emitted heredoc
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Terminator names to try in order; the first one that no body line
    /// spells out is used
    pub markers: Vec<String>,
    pub heredoc: HeredocStyle,
    /// Spaces added to the base indentation for body lines
    pub indent_width: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            markers: ["END", "SOURCE", "RUBY", "EOS"]
                .into_iter()
                .map(String::from)
                .collect(),
            heredoc: HeredocStyle::default(),
            indent_width: 2,
        }
    }
}

impl RewriteOptions {
    /// Put `marker` first in the candidate list
    pub fn prefer_marker(&mut self, marker: &str) {
        self.markers.retain(|existing| existing != marker);
        self.markers.insert(0, marker.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RewriteOptions::default();
        assert_eq!(options.markers[0], "END");
        assert_eq!(options.heredoc, HeredocStyle::StripIndent);
        assert_eq!(options.indent_width, 2);
    }

    #[test]
    fn test_prefer_marker() {
        let mut options = RewriteOptions::default();
        options.prefer_marker("SOURCE");
        assert_eq!(options.markers, vec!["SOURCE", "END", "RUBY", "EOS"]);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: RewriteOptions = toml::from_str("heredoc = \"squiggly\"").unwrap();
        assert_eq!(options.heredoc, HeredocStyle::Squiggly);
        assert_eq!(options.indent_width, 2);
        assert_eq!(options.markers.len(), 4);
    }
}
