#![forbid(unsafe_code)]

//! Class tokens and the root-element class list seam.
//!
//! The overlay engine owns the rendered root element; ftip only needs to add
//! and remove class tokens on it. [`ClassList`] is that narrow seam and
//! [`ClassSet`] is an ordered in-memory implementation used by engines that
//! keep their element model in Rust.

/// Mutable view of an element's class tokens.
pub trait ClassList {
    /// Add a token. Adding a token that is already present is a no-op.
    fn add(&mut self, token: &str);
    /// Remove a token. Removing an absent token is a no-op.
    fn remove(&mut self, token: &str);
    /// Whether the token is present.
    fn contains(&self, token: &str) -> bool;
}

/// Whether tokens are being added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAction {
    Add,
    Remove,
}

/// Split a class-name string on whitespace, skipping empty tokens.
pub fn class_tokens(class_name: &str) -> impl Iterator<Item = &str> {
    class_name.split_whitespace()
}

/// Apply every token of `class_name` to `list`.
pub fn apply_class_tokens(list: &mut dyn ClassList, action: ClassAction, class_name: &str) {
    for token in class_tokens(class_name) {
        match action {
            ClassAction::Add => list.add(token),
            ClassAction::Remove => list.remove(token),
        }
    }
}

/// Ordered, duplicate-free class token set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    tokens: Vec<String>,
}

impl ClassSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl ClassList for ClassSet {
    fn add(&mut self, token: &str) {
        if !self.contains(token) {
            self.tokens.push(token.to_owned());
        }
    }

    fn remove(&mut self, token: &str) {
        self.tokens.retain(|t| t != token);
    }

    fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

impl<'a> FromIterator<&'a str> for ClassSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for token in iter {
            set.add(token);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_skip_runs_of_whitespace() {
        let tokens: Vec<_> = class_tokens("  a\tb \n  c  ").collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_class_name_has_no_tokens() {
        assert_eq!(class_tokens("").count(), 0);
        assert_eq!(class_tokens("   ").count(), 0);
    }

    #[test]
    fn add_is_idempotent() {
        let mut set = ClassSet::new();
        apply_class_tokens(&mut set, ClassAction::Add, "tip tip dark");
        apply_class_tokens(&mut set, ClassAction::Add, "dark");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["tip", "dark"]);
    }

    #[test]
    fn remove_only_named_tokens() {
        let mut set: ClassSet = ["engine-box", "tip", "dark"].into_iter().collect();
        apply_class_tokens(&mut set, ClassAction::Remove, "tip dark missing");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["engine-box"]);
        assert!(!set.contains("tip"));
        assert_eq!(set.len(), 1);
    }
}
