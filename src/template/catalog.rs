//! Template catalog partitioned by category

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::engine::Engine;
use crate::model::TemplateId;

/// Semantic template family, resolved from the id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Compare,
    List,
    Sequence,
    Quadrant,
    Hierarchy,
    Relation,
    Chart,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 7] = [
        Category::Compare,
        Category::List,
        Category::Sequence,
        Category::Quadrant,
        Category::Hierarchy,
        Category::Relation,
        Category::Chart,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Compare => "compare",
            Category::List => "list",
            Category::Sequence => "sequence",
            Category::Quadrant => "quadrant",
            Category::Hierarchy => "hierarchy",
            Category::Relation => "relation",
            Category::Chart => "chart",
        }
    }

    /// Id prefix including the trailing dash
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Compare => "compare-",
            Category::List => "list-",
            Category::Sequence => "sequence-",
            Category::Quadrant => "quadrant-",
            Category::Hierarchy => "hierarchy-",
            Category::Relation => "relation-",
            Category::Chart => "chart-",
        }
    }

    /// Short human description of what the family draws
    pub fn description(self) -> &'static str {
        match self {
            Category::Compare => "SWOT analysis, side-by-side comparison",
            Category::List => "grids, rows and columns",
            Category::Sequence => "timelines and step flows",
            Category::Quadrant => "four-quadrant matrices",
            Category::Hierarchy => "trees and org charts",
            Category::Relation => "circles and relation networks",
            Category::Chart => "column, bar, line and pie charts",
        }
    }

    /// Resolve the category of a template id; `None` when no prefix matches
    pub fn of(template: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| template.starts_with(c.prefix()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| {
                let keys: Vec<_> = Category::ALL.iter().map(|c| c.key()).collect();
                format!("unknown category '{}' (expected one of {})", s, keys.join(", "))
            })
    }
}

/// Template ids grouped by category, each group in catalog order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    groups: HashMap<Category, Vec<TemplateId>>,
}

impl CategoryMap {
    /// Ids of one category; empty if the catalog has none
    pub fn get(&self, category: Category) -> &[TemplateId] {
        self.groups.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Groups in display order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[TemplateId])> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Total number of categorized ids
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition ids by category prefix. Ids with no known prefix are dropped.
pub fn partition<'a, I>(ids: I) -> CategoryMap
where
    I: IntoIterator<Item = &'a TemplateId>,
{
    let mut map = CategoryMap::default();
    for id in ids {
        match Category::of(id.as_str()) {
            Some(category) => map.groups.entry(category).or_default().push(id.clone()),
            None => log::debug!("template '{}' matches no category, skipping", id),
        }
    }
    map
}

/// Process-wide template registry, loaded once and read-only thereafter.
///
/// Share it by `Arc` between the views.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<TemplateId>,
    categories: CategoryMap,
}

impl TemplateCatalog {
    /// Build a catalog from an ordered list of ids
    pub fn new(templates: Vec<TemplateId>) -> Self {
        let categories = partition(&templates);
        Self {
            templates,
            categories,
        }
    }

    /// Query the engine's catalog
    pub fn load(engine: &dyn Engine) -> Self {
        let catalog = Self::new(engine.templates());
        log::debug!(
            "loaded {} templates ({} categorized)",
            catalog.templates.len(),
            catalog.categories.len()
        );
        catalog
    }

    /// Every id in catalog order
    pub fn templates(&self) -> &[TemplateId] {
        &self.templates
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn in_category(&self, category: Category) -> &[TemplateId] {
        self.categories.get(category)
    }

    pub fn contains(&self, template: &str) -> bool {
        self.templates.iter().any(|t| t.as_str() == template)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
