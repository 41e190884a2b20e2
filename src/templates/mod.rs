//! Hand-authored applications used when no model answers

pub mod catalog;
pub mod selector;

pub use catalog::{Template, TemplateCatalog};
pub use selector::TemplateSelector;

use serde::{Deserialize, Serialize};

/// Category of a bundled template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Category
{   Calculator
  , Todo
  , Contact
}

impl Category
{   pub const ALL: [Category; 3]
      = [Category::Calculator, Category::Todo, Category::Contact];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Category::Calculator => "calculator"
          , Category::Todo => "todo"
          , Category::Contact => "contact"
        }
    }
}
