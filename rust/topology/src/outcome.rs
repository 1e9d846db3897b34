// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-element export outcomes.

use std::fmt;

/// What happened to one source element during assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementOutcome {
    Exported,
    /// No connectivity record was built for the element.
    SkippedMissingMapping,
    /// The level (or the opening's host floor) or its story did not resolve.
    SkippedMissingLevel,
    SkippedMissingProperty,
    /// The element collapsed onto a shape already assigned on the same story
    /// with a different property.
    SkippedPropertyConflict,
}

impl ElementOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementOutcome::Exported => "exported",
            ElementOutcome::SkippedMissingMapping => "skipped-missing-mapping",
            ElementOutcome::SkippedMissingLevel => "skipped-missing-level",
            ElementOutcome::SkippedMissingProperty => "skipped-missing-property",
            ElementOutcome::SkippedPropertyConflict => "skipped-property-conflict",
        }
    }

    pub fn is_exported(self) -> bool {
        self == ElementOutcome::Exported
    }
}

impl fmt::Display for ElementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome counts for one element kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub exported: usize,
    pub missing_mapping: usize,
    pub missing_level: usize,
    pub missing_property: usize,
    pub property_conflict: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: ElementOutcome) {
        match outcome {
            ElementOutcome::Exported => self.exported += 1,
            ElementOutcome::SkippedMissingMapping => self.missing_mapping += 1,
            ElementOutcome::SkippedMissingLevel => self.missing_level += 1,
            ElementOutcome::SkippedMissingProperty => self.missing_property += 1,
            ElementOutcome::SkippedPropertyConflict => self.property_conflict += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.missing_mapping + self.missing_level + self.missing_property + self.property_conflict
    }

    pub fn total(&self) -> usize {
        self.exported + self.skipped()
    }

    pub fn merge(&mut self, other: &OutcomeTally) {
        self.exported += other.exported;
        self.missing_mapping += other.missing_mapping;
        self.missing_level += other.missing_level;
        self.missing_property += other.missing_property;
        self.property_conflict += other.property_conflict;
    }
}

impl FromIterator<ElementOutcome> for OutcomeTally {
    fn from_iter<I: IntoIterator<Item = ElementOutcome>>(iter: I) -> Self {
        let mut tally = OutcomeTally::default();
        for outcome in iter {
            tally.record(outcome);
        }
        tally
    }
}

impl fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} exported", self.exported)?;
        if self.skipped() > 0 {
            write!(
                f,
                ", {} skipped (mapping {}, level {}, property {})",
                self.skipped(),
                self.missing_mapping,
                self.missing_level,
                self.missing_property
            )?;
            if self.property_conflict > 0 {
                write!(f, ", {} property conflicts", self.property_conflict)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_each_outcome() {
        let tally: OutcomeTally = [
            ElementOutcome::Exported,
            ElementOutcome::Exported,
            ElementOutcome::SkippedMissingLevel,
            ElementOutcome::SkippedMissingProperty,
        ]
        .into_iter()
        .collect();

        assert_eq!(tally.exported, 2);
        assert_eq!(tally.skipped(), 2);
        assert_eq!(tally.total(), 4);
        assert_eq!(
            tally.to_string(),
            "2 exported, 2 skipped (mapping 0, level 1, property 1)"
        );
    }

    #[test]
    fn merge_adds_counts() {
        let mut a = OutcomeTally {
            exported: 1,
            ..Default::default()
        };
        a.merge(&OutcomeTally {
            exported: 2,
            missing_mapping: 1,
            ..Default::default()
        });
        assert_eq!(a.exported, 3);
        assert_eq!(a.missing_mapping, 1);
        assert_eq!(a.to_string(), "3 exported, 1 skipped (mapping 1, level 0, property 0)");
    }

    #[test]
    fn conflicts_count_as_skipped() {
        let tally: OutcomeTally = [
            ElementOutcome::Exported,
            ElementOutcome::SkippedPropertyConflict,
        ]
        .into_iter()
        .collect();
        assert_eq!(tally.skipped(), 1);
        assert_eq!(
            tally.to_string(),
            "1 exported, 1 skipped (mapping 0, level 0, property 0), 1 property conflicts"
        );
    }

    #[test]
    fn clean_tally_omits_skips() {
        let mut t = OutcomeTally::default();
        t.record(ElementOutcome::Exported);
        assert_eq!(t.to_string(), "1 exported");
    }
}
