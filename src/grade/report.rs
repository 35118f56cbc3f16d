#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The standardized grade report.

use std::{fmt::Display, ops::Index};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use super::outcome::ComponentStatus;

/// Percentage at or above which a grade counts as passing.
pub const PASS_THRESHOLD: f64 = 70.0;

/// Letter grade bands; each lower bound is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    /// 90 and above.
    A,
    /// 80 up to 90.
    B,
    /// 70 up to 80.
    C,
    /// 60 up to 70.
    D,
    /// Below 60.
    F,
}

impl LetterGrade {
    /// Maps a percentage onto a letter.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            LetterGrade::A
        } else if percentage >= 80.0 {
            LetterGrade::B
        } else if percentage >= 70.0 {
            LetterGrade::C
        } else if percentage >= 60.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }

    /// Returns the string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl Display for LetterGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate counts across components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Components whose check passed.
    pub components_passing:     usize,
    /// Components the detector considers implemented.
    pub components_implemented: usize,
    /// Components in the registry.
    pub total_components:       usize,
    /// Implemented share, percent, one decimal.
    pub implementation_rate:    f64,
    /// Passing share, percent, one decimal.
    pub pass_rate:              f64,
}

impl PerformanceSummary {
    /// Computes the rates from raw counts.
    pub fn from_counts(passing: usize, implemented: usize, total: usize) -> Self {
        let rate = |count: usize| {
            if total == 0 {
                0.0
            } else {
                round1(count as f64 / total as f64 * 100.0)
            }
        };
        Self {
            components_passing:     passing,
            components_implemented: implemented,
            total_components:       total,
            implementation_rate:    rate(implemented),
            pass_rate:              rate(passing),
        }
    }
}

/// Per-component section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Human-readable label.
    pub component_name:     String,
    /// Standardized status.
    pub status:             ComponentStatus,
    /// Points earned.
    pub points_earned:      f64,
    /// Points available.
    pub points_possible:    f64,
    /// Feedback line shown to the student.
    pub feedback:           String,
    /// Topic tags.
    pub concepts_tested:    Vec<String>,
    /// Reporting context.
    pub professional_skill: String,
}

/// Breakdown entries keyed by component id, in registry order.
///
/// Serialized as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakdown(Vec<(String, BreakdownEntry)>);

impl Breakdown {
    /// Looks up the entry for `id`.
    pub fn get(&self, id: &str) -> Option<&BreakdownEntry> {
        self.0
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, entry)| entry)
    }

    /// `(id, entry)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BreakdownEntry)> {
        self.0.iter().map(|(id, entry)| (id, entry))
    }

    /// Component ids in registry order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(id, _)| id)
    }

    /// Entries in registry order.
    pub fn values(&self) -> impl Iterator<Item = &BreakdownEntry> {
        self.0.iter().map(|(_, entry)| entry)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, BreakdownEntry)> for Breakdown {
    fn from_iter<I: IntoIterator<Item = (String, BreakdownEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<&str> for Breakdown {
    type Output = BreakdownEntry;

    fn index(&self, id: &str) -> &Self::Output {
        match self.get(id) {
            Some(entry) => entry,
            None => panic!("no breakdown entry for component `{id}`"),
        }
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, entry) in &self.0 {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Breakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Collects map entries in document order.
        struct BreakdownVisitor;

        impl<'de> Visitor<'de> for BreakdownVisitor {
            type Value = Breakdown;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of component id to breakdown entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Breakdown, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, entry)) = access.next_entry::<String, BreakdownEntry>()? {
                    entries.push((id, entry));
                }
                Ok(Breakdown(entries))
            }
        }

        deserializer.deserialize_map(BreakdownVisitor)
    }
}

/// Provenance of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Seconds spent grading.
    pub grading_time:           f64,
    /// Version of the engine that produced the report.
    pub grading_engine_version: String,
    /// Always true for reports produced here.
    pub standardized_output:    bool,
}

/// Full result of one grading run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Assignment name.
    pub assignment:                  String,
    /// Course module name.
    pub module:                      String,
    /// Grading timestamp, RFC 3339.
    pub timestamp:                   String,
    /// Sum of earned points.
    pub total_points:                f64,
    /// Sum of component points.
    pub possible_points:             f64,
    /// Exact percentage; displays round it.
    pub percentage:                  f64,
    /// Letter derived from `percentage`.
    pub letter_grade:                LetterGrade,
    /// Aggregate counts.
    pub performance_summary:         PerformanceSummary,
    /// One entry per registered component.
    pub detailed_breakdown:          Breakdown,
    /// Ordered, actionable suggestions.
    pub improvement_recommendations: Vec<String>,
    /// Opaque context copied from the assignment.
    pub professional_context:        serde_json::Value,
    /// Provenance.
    pub execution_summary:           ExecutionSummary,
}

impl GradeReport {
    /// Whether the grade meets `PASS_THRESHOLD`.
    pub fn is_passing(&self) -> bool {
        self.percentage >= PASS_THRESHOLD
    }

    /// Percentage formatted to one decimal place.
    pub fn display_percentage(&self) -> String {
        format!("{:.1}", self.percentage)
    }

    /// Serializes the report as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
