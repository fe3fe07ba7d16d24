//! Certification categories and their external bindings.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use certforge_core::{ContainerId, DomainError, TemplateId};

/// Certification level a score column tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basic,
    Intermediate,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Basic, Category::Intermediate, Category::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Basic => "Basic",
            Category::Intermediate => "Intermediate",
            Category::Advanced => "Advanced",
        }
    }

    /// Roster sheet holding the per-category name → address join.
    pub fn roster_sheet(&self) -> &'static str {
        match self {
            Category::Basic => "Basic Questions",
            Category::Intermediate => "Intermediate Questions",
            Category::Advanced => "Advanced Questions",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(Category::Basic),
            "Intermediate" => Ok(Category::Intermediate),
            "Advanced" => Ok(Category::Advanced),
            other => Err(DomainError::validation(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

/// Per-category external resources: the certificate template and the
/// destination container artifacts are written into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBinding {
    pub template: TemplateId,
    pub container: ContainerId,
}

impl CategoryBinding {
    pub fn new(template: impl Into<TemplateId>, container: impl Into<ContainerId>) -> Self {
        Self {
            template: template.into(),
            container: container.into(),
        }
    }
}

/// Complete deployment configuration: one binding per category.
///
/// Passed explicitly into every entry point; there is no ambient registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBindings {
    basic: CategoryBinding,
    intermediate: CategoryBinding,
    advanced: CategoryBinding,
}

impl CategoryBindings {
    pub fn new(
        basic: CategoryBinding,
        intermediate: CategoryBinding,
        advanced: CategoryBinding,
    ) -> Self {
        Self {
            basic,
            intermediate,
            advanced,
        }
    }

    pub fn get(&self, category: Category) -> &CategoryBinding {
        match category {
            Category::Basic => &self.basic,
            Category::Intermediate => &self.intermediate,
            Category::Advanced => &self.advanced,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryBinding)> {
        Category::ALL.iter().map(|c| (*c, self.get(*c)))
    }
}
