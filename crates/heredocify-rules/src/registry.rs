//! Rule trait and registry for heredocify rewrite rules

use heredocify_core::{Edit, SourceTree};

use crate::options::RewriteOptions;

/// A rewrite rule that can detect and suggest source transformations
pub trait Rule: Send + Sync {
    /// The unique identifier for this rule (e.g., "array_to_heredoc")
    fn name(&self) -> &'static str;

    /// A short description of what this rule does
    fn description(&self) -> &'static str;

    /// Check a parsed Ruby file and return suggested edits
    fn check(&self, tree: &SourceTree, options: &RewriteOptions) -> Vec<Edit>;
}

/// Registry of all available rewrite rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self { rules: Vec::new() };
        registry.register(Box::new(crate::array_to_heredoc::ArrayToHeredocRule));
        registry
    }

    /// Register a new rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all rule names
    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Get all rules with their descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect()
    }

    /// Run every registered rule on a tree
    pub fn check_all(&self, tree: &SourceTree, options: &RewriteOptions) -> Vec<Edit> {
        let mut edits = Vec::new();
        for rule in &self.rules {
            let found = rule.check(tree, options);
            tracing::trace!(rule = rule.name(), edits = found.len(), "rule checked");
            edits.extend(found);
        }
        edits
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
