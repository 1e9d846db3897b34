// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level name to story name resolution.

/// Maps a canonical level name onto one of the target system's story names.
pub trait StoryResolver {
    fn resolve<'s>(&self, level_name: &str, stories: &'s [String]) -> Option<&'s str>;
}

/// Matches the first story whose name contains the level name.
///
/// Target systems decorate level names with a prefix or suffix, so equality
/// would miss them. A short level name can match the wrong story: `"4"`
/// resolves to `"Story14"` if that story comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsStoryResolver;

impl StoryResolver for ContainsStoryResolver {
    fn resolve<'s>(&self, level_name: &str, stories: &'s [String]) -> Option<&'s str> {
        if level_name.is_empty() {
            return None;
        }
        stories
            .iter()
            .find(|s| s.contains(level_name))
            .map(String::as_str)
    }
}

/// Matches a story whose name is exactly the level name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactStoryResolver;

impl StoryResolver for ExactStoryResolver {
    fn resolve<'s>(&self, level_name: &str, stories: &'s [String]) -> Option<&'s str> {
        stories
            .iter()
            .find(|s| s.as_str() == level_name)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stories(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn contains_matches_decorated_names() {
        let s = stories(&["Base", "Story Level 1", "Story Level 2"]);
        assert_eq!(
            ContainsStoryResolver.resolve("Level 2", &s),
            Some("Story Level 2")
        );
        assert_eq!(ContainsStoryResolver.resolve("Roof", &s), None);
    }

    #[test]
    fn contains_can_pick_a_longer_name() {
        let s = stories(&["Story14", "Story4"]);
        assert_eq!(ContainsStoryResolver.resolve("4", &s), Some("Story14"));
        assert_eq!(ExactStoryResolver.resolve("Story4", &s), Some("Story4"));
    }

    #[test]
    fn empty_level_name_never_matches() {
        let s = stories(&["Base"]);
        assert_eq!(ContainsStoryResolver.resolve("", &s), None);
    }

    #[test]
    fn exact_requires_equality() {
        let s = stories(&["Story Level 1"]);
        assert_eq!(ExactStoryResolver.resolve("Level 1", &s), None);
    }
}
