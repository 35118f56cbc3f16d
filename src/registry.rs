#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Static declaration of the gradable components of an assignment.

use std::collections::HashSet;

use bon::Builder;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::{error::ConfigError, grade::quality::SourceQuality};

/// How a component is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentCheck {
    /// Run one scoped test (a test function or a whole test class).
    Test {
        /// Selector passed to the test runner, eg. `TestJoinStationData`.
        selector: String,
    },
    /// Statically inspect one submission file.
    SourceQuality(SourceQuality),
}

impl ComponentCheck {
    /// Short label used in tables.
    pub fn label(&self) -> String {
        match self {
            ComponentCheck::Test { selector } => format!("test: {selector}"),
            ComponentCheck::SourceQuality(q) => format!("quality: {}", q.file.display()),
        }
    }
}

/// One gradable unit of student work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct ComponentSpec {
    /// Unique key, eg. `load_and_explore`.
    pub id:                 String,
    /// Human-readable label.
    pub name:               String,
    /// Weight of this component.
    pub points:             f64,
    /// What correct behavior looks like.
    #[serde(default)]
    #[builder(default)]
    pub description:        String,
    /// Topic tags, used only for feedback text.
    #[serde(default)]
    #[builder(default)]
    pub concepts:           Vec<String>,
    /// Free-form reporting context.
    #[serde(default)]
    #[builder(default)]
    pub professional_skill: String,
    /// Function whose body the implementation detector inspects.
    #[serde(default)]
    pub function:           Option<String>,
    /// How this component is checked.
    pub check:              ComponentCheck,
}

/// Row shape for printing a registry.
#[derive(Tabled)]
struct RegistryRow {
    /// Component id.
    #[tabled(rename = "Id")]
    id:       String,
    /// Component label.
    #[tabled(rename = "Component")]
    name:     String,
    /// Weight.
    #[tabled(rename = "Points")]
    points:   String,
    /// Check description.
    #[tabled(rename = "Check")]
    check:    String,
    /// Detected function, if any.
    #[tabled(rename = "Function")]
    function: String,
}

/// Ordered, validated mapping of component id to `ComponentSpec`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRegistry {
    /// Components in declaration order.
    components: Vec<ComponentSpec>,
}

impl ComponentRegistry {
    /// Validates and wraps `components`.
    ///
    /// Ids must be unique, points finite and non-negative, the sum strictly
    /// positive, and equal to `declared_total` when one is given.
    pub fn new(
        components: Vec<ComponentSpec>,
        declared_total: Option<f64>,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for spec in &components {
            if !seen.insert(spec.id.as_str()) {
                return Err(ConfigError::DuplicateComponent(spec.id.clone()));
            }
            if !spec.points.is_finite() || spec.points < 0.0 {
                return Err(ConfigError::InvalidPoints {
                    id:     spec.id.clone(),
                    points: spec.points,
                });
            }
        }

        let registry = Self { components };
        let actual = registry.possible_points();
        if actual <= 0.0 {
            return Err(ConfigError::NoPossiblePoints);
        }
        if let Some(declared) = declared_total
            && (declared - actual).abs() > 1e-9
        {
            return Err(ConfigError::TotalMismatch { declared, actual });
        }

        Ok(registry)
    }

    /// Components in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.components.iter()
    }

    /// Looks up a component by id.
    pub fn get(&self, id: &str) -> Option<&ComponentSpec> {
        self.components.iter().find(|spec| spec.id == id)
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the registry has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Sum of component points.
    pub fn possible_points(&self) -> f64 {
        self.components.iter().map(|spec| spec.points).sum()
    }

    /// Renders the registry as a table.
    pub fn table(&self) -> String {
        let rows = self.components.iter().map(|spec| RegistryRow {
            id:       spec.id.clone(),
            name:     spec.name.clone(),
            points:   format_points(spec.points),
            check:    spec.check.label(),
            function: spec.function.clone().unwrap_or_else(|| "-".to_string()),
        });
        tabled::Table::new(rows)
            .with(tabled::settings::Style::modern())
            .to_string()
    }
}

impl<'a> IntoIterator for &'a ComponentRegistry {
    type IntoIter = std::slice::Iter<'a, ComponentSpec>;
    type Item = &'a ComponentSpec;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Formats points without a trailing `.0` for whole numbers.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 && points.abs() < 1e15 {
        format!("{points:.0}")
    } else {
        format!("{}", (points * 100.0).round() / 100.0)
    }
}
