use async_trait::async_trait;
use log::debug;
use crate::templates::{TemplateCatalog, TemplateSelector};

/// Deterministic stage: pick and customize a bundled template
pub struct TemplateBackend
{   catalog: &'static TemplateCatalog
  , selector: TemplateSelector
}

impl Default for TemplateBackend
{   fn default() -> Self
    {   TemplateBackend::new(TemplateCatalog::builtin())
    }
}

impl TemplateBackend
{   pub fn new(catalog: &'static TemplateCatalog) -> Self
    {   TemplateBackend
        {   catalog
          , selector: TemplateSelector::new(catalog.categories())
        }
    }

    /// Never fails
    pub fn render(&self, description: &str) -> String
    {   let category = self.selector.select(description);
        debug!("Template fallback using {}", category.as_str());
        self.catalog.customize(self.catalog.get(category), description)
    }
}

#[async_trait]
impl super::Backend for TemplateBackend
{   fn kind(&self) -> crate::BackendKind
    {   crate::BackendKind::Template
    }

    fn is_available(&self) -> bool
    {   true
    }

    async fn attempt(
      &self
    , request: &crate::request::GenerationRequest
    ) -> Result<String, crate::error::Error>
    {   Ok(self.render(&request.description))
    }
}
