// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Story table derived from the model's levels.

use structlink_model::{Level, LevelSequence};

use crate::error::Result;
use crate::writer::E2kWriter;

/// Name of the synthesized ground story.
pub const BASE_STORY: &str = "Base";

#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub name: String,
    pub elevation: f64,
    /// Distance to the story below; zero for the lowest story.
    pub height: f64,
    /// Source level, `None` for the synthesized base.
    pub level_id: Option<String>,
}

/// Stories in ascending elevation, plus the flat list of names used for
/// story resolution.
#[derive(Debug, Clone)]
pub struct StoryTable {
    stories: Vec<Story>,
    names: Vec<String>,
}

impl StoryTable {
    /// Builds stories named `prefix` + level name. A `"Base"` story at zero
    /// elevation is added when no level sits at zero.
    pub fn from_levels(levels: &[Level], prefix: &str) -> Self {
        let mut seq = LevelSequence::from_levels(levels);
        let synthesized_base = seq.ensure_ground(|| Level {
            id: String::new(),
            name: BASE_STORY.to_string(),
            elevation: 0.0,
            floor_type_id: None,
        });

        let stories: Vec<Story> = seq
            .story_heights()
            .into_iter()
            .map(|(level, height)| {
                let synthesized = synthesized_base && level.is_ground();
                Story {
                    name: if synthesized {
                        level.name.clone()
                    } else {
                        format!("{prefix}{}", level.name)
                    },
                    elevation: level.elevation,
                    height,
                    level_id: (!synthesized).then(|| level.id.clone()),
                }
            })
            .collect();
        let names = stories.iter().map(|s| s.name.clone()).collect();
        Self { stories, names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Writes stories from the top down. The lowest story carries its
    /// elevation, every other story its height.
    pub fn write(&self, w: &mut E2kWriter) -> Result<()> {
        for (i, story) in self.stories.iter().enumerate().rev() {
            if i == 0 {
                w.story_elevation(&story.name, story.elevation)?;
            } else {
                w.story_height(&story.name, story.height)?;
            }
        }
        Ok(())
    }
}
