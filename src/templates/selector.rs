use rand::seq::SliceRandom;
use rand::Rng;
use log::debug;
use super::Category;

/// Keyword sets in priority order; first match wins
const KEYWORDS: [(Category, &[&str]); 3] = [
    ( Category::Calculator
    , &["calculator", "calc", "math", "arithmetic", "number"]
    )
  , ( Category::Todo
    , &["todo", "task", "list", "checklist", "reminder"]
    )
  , ( Category::Contact
    , &["contact", "form", "email", "message", "feedback"]
    )
];

/// Maps a description to a template category
#[derive(Debug, Clone)]
pub struct TemplateSelector
{   categories: Vec<Category>
}

impl Default for TemplateSelector
{   fn default() -> Self
    {   TemplateSelector::new(
          super::TemplateCatalog::builtin().categories()
        )
    }
}

impl TemplateSelector
{   /// `categories` is the pool for the random default
    pub fn new(categories: Vec<Category>) -> Self
    {   TemplateSelector
        {   categories
        }
    }

    /// Keyword match, or a uniformly random category
    pub fn select(&self, description: &str) -> Category
    {   self.select_with(description, &mut rand::thread_rng())
    }

    pub fn select_with<R: Rng + ?Sized>(
      &self
    , description: &str
    , rng: &mut R
    ) -> Category
    {   if let Some(category) = match_keywords(description)
        {   debug!("Keyword match: {}", category.as_str());
            return category;
        }
        let category = self.categories
          .choose(rng)
          .copied()
          .unwrap_or(Category::Calculator);
        debug!("No keyword match, picked {}", category.as_str());
        category
    }
}

/// Substring match against the lower-cased description
pub fn match_keywords(description: &str) -> Option<Category>
{   let lowered = description.to_lowercase();
    KEYWORDS
      .iter()
      .find(|(_, words)| words.iter().any(|w| lowered.contains(*w)))
      .map(|(category, _)| *category)
}
