//! Filtering, sorting and dashboard numbers over the vault
//!
//! Pure functions of a `&[Idea]` snapshot; the vault stays the only source
//! of truth.

use crate::storage::{Category, Idea};
use serde::Serialize;
use std::str::FromStr;

use crate::error::IdeaflowError;

/// Which slice of the vault to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Favorites,
    Category(Category),
}

/// Search text plus scope
#[derive(Debug, Clone, Default)]
pub struct IdeaFilter {
    /// Case-insensitive substring matched against title and tags
    pub search: Option<String>,
    pub scope: Scope,
}

impl IdeaFilter {
    pub fn matches(&self, idea: &Idea) -> bool {
        let matches_scope = match self.scope {
            Scope::All => true,
            Scope::Favorites => idea.is_favorite,
            Scope::Category(category) => idea.category == category,
        };

        matches_scope && self.matches_search(idea)
    }

    fn matches_search(&self, idea: &Idea) -> bool {
        let Some(term) = self.search.as_deref().map(str::to_lowercase) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }

        idea.title.to_lowercase().contains(&term)
            || idea.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
    }

    /// Matching ideas, input order kept
    pub fn apply<'a>(&self, ideas: &'a [Idea]) -> Vec<&'a Idea> {
        ideas.iter().filter(|idea| self.matches(idea)).collect()
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recent `createdAt` first
    #[default]
    Newest,
    Oldest,
    /// Case-insensitive title
    Title,
}

impl SortOrder {
    /// Sort in place; ties keep their vault order
    pub fn sort(&self, ideas: &mut [&Idea]) {
        match self {
            SortOrder::Newest => ideas.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => ideas.sort_by_key(|idea| idea.created_at),
            SortOrder::Title => ideas.sort_by_key(|idea| idea.title.to_lowercase()),
        }
    }
}

impl FromStr for SortOrder {
    type Err = IdeaflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "title" => Ok(SortOrder::Title),
            other => Err(IdeaflowError::Config(format!(
                "Invalid sort order: {}. Must be one of: newest, oldest, title",
                other
            ))),
        }
    }
}

/// Filter then sort
///
/// # Examples
///
/// ```
/// use ideaflow::storage::Idea;
/// use ideaflow::view::{query, IdeaFilter, SortOrder};
///
/// let ideas = vec![
///     Idea { id: "1".into(), title: "Banana".into(), created_at: 1, ..Default::default() },
///     Idea { id: "2".into(), title: "apple".into(), created_at: 2, ..Default::default() },
/// ];
/// let titles: Vec<_> = query(&ideas, &IdeaFilter::default(), SortOrder::Title)
///     .iter()
///     .map(|i| i.title.as_str())
///     .collect();
/// assert_eq!(titles, ["apple", "Banana"]);
/// ```
pub fn query<'a>(ideas: &'a [Idea], filter: &IdeaFilter, order: SortOrder) -> Vec<&'a Idea> {
    let mut selected = filter.apply(ideas);
    order.sort(&mut selected);
    selected
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStats {
    pub total: usize,
    pub favorites: usize,
    pub action_items: usize,
    pub with_image: usize,
    pub with_expansion: usize,
    /// Count per category, in `Category::ALL` order
    pub by_category: Vec<(Category, usize)>,
}

impl VaultStats {
    pub fn from_ideas(ideas: &[Idea]) -> Self {
        let by_category = Category::ALL
            .into_iter()
            .map(|category| {
                let count = ideas.iter().filter(|i| i.category == category).count();
                (category, count)
            })
            .collect();

        Self {
            total: ideas.len(),
            favorites: ideas.iter().filter(|i| i.is_favorite).count(),
            action_items: ideas.iter().map(|i| i.action_items.len()).sum(),
            with_image: ideas.iter().filter(|i| i.image_url.is_some()).count(),
            with_expansion: ideas.iter().filter(|i| i.expansion.is_some()).count(),
            by_category,
        }
    }
}
