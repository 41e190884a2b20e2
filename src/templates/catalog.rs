use log::{debug, trace};
use super::Category;

/// Tokens dropped when deriving a title from a description
pub const TITLE_STOP_WORDS: [&str; 7]
  = ["a", "an", "the", "for", "with", "app", "application"];

/// Number of leading description tokens considered for a title
const TITLE_TOKENS: usize = 3;

/// A complete application keyed by category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template
{   pub category: Category
  , /// Exact text between the body's `<title>` tags
    pub default_title: &'static str
  , pub body: &'static str
}

impl Template
{   fn title_tag(title: &str) -> String
    {   format!("<title>{}</title>", title)
    }
}

/// Fixed, read-only mapping from category to template
#[derive(Debug)]
pub struct TemplateCatalog
{   templates: [Template; 3]
}

static BUILTIN: TemplateCatalog = TemplateCatalog
{   templates: [
      Template
      {   category: Category::Calculator
        , default_title: "Calculator"
        , body: include_str!("calculator.html")
      }
    , Template
      {   category: Category::Todo
        , default_title: "Todo List"
        , body: include_str!("todo.html")
      }
    , Template
      {   category: Category::Contact
        , default_title: "Contact Form"
        , body: include_str!("contact.html")
      }
    ]
};

impl TemplateCatalog
{   /// The process-wide catalog
    pub fn builtin() -> &'static TemplateCatalog
    {   &BUILTIN
    }

    pub fn get(&self, category: Category) -> &Template
    {   // every Category has exactly one entry
        self.templates
          .iter()
          .find(|t| t.category == category)
          .unwrap_or(&self.templates[0])
    }

    pub fn categories(&self) -> Vec<Category>
    {   self.templates.iter().map(|t| t.category).collect()
    }

    /// Copy of `template` with a title derived from `description`.
    /// Only the literal default `<title>` element changes.
    pub fn customize(
      &self
    , template: &Template
    , description: &str
    ) -> String
    {   match derive_title(description)
        {   Some(title) => {
              debug!(
                "Customizing {} template with title {:?}",
                template.category.as_str(), title
              );
              template.body.replacen(
                &Template::title_tag(template.default_title),
                &Template::title_tag(
                  &crate::fallback_page::escape_html(&title)
                ),
                1
              )
            }
          , None => {
              trace!("No title tokens survived, keeping default");
              template.body.to_string()
            }
        }
    }
}

/// Title from the first three tokens of `description`, stop words
/// removed, each capitalized, with an " App" suffix.
pub fn derive_title(description: &str) -> Option<String>
{   let words: Vec<String> = description
      .split_whitespace()
      .take(TITLE_TOKENS)
      .filter(|token| {
        !TITLE_STOP_WORDS.contains(&token.to_lowercase().as_str())
      })
      .map(capitalize)
      .collect();

    if words.is_empty()
    {   None
    } else
    {   Some(format!("{} App", words.join(" ")))
    }
}

fn capitalize(token: &str) -> String
{   let mut chars = token.chars();
    match chars.next()
    {   Some(first) => {
          first.to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
        }
      , None => String::new()
    }
}
