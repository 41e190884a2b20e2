//! Configuration for the generation backends

use std::path::Path;
use serde::{Deserialize, Serialize};
use log::{debug, warn};
use crate::BackendKind;

/// Placeholder replaced by the request description
pub const DESCRIPTION_PLACEHOLDER: &str = "{description}";

/// Environment variable holding the remote API key by default
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Overrides the local completion server endpoint
pub const LOCAL_ENDPOINT_ENV: &str = "HTMLFORGE_LOCAL_ENDPOINT";

/// Any non-empty value disables the local backend
pub const DISABLE_LOCAL_ENV: &str = "HTMLFORGE_DISABLE_LOCAL";

const REMOTE_USER_TEMPLATE: &str
  = "Create a complete, functional HTML web application for the \
     following description: \"{description}\". Return only the HTML \
     document with embedded CSS in <style> tags and JavaScript in \
     <script> tags.";

/// Richer template given to the best local model.
/// Ends with a primed document prefix the model continues.
pub const RICH_LOCAL_TEMPLATE: &str = r#"Generate a complete HTML web application based on this description: "{description}"

Requirements:
- Complete HTML document with DOCTYPE, head, and body
- Include CSS styling in style tags for modern, responsive design
- Add JavaScript functionality in script tags if needed
- Use semantic HTML elements
- Make it visually appealing with good UX
- Ensure it works as a standalone HTML file

HTML:
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>"#;

/// Shared template for every other local model
pub const COMMON_LOCAL_TEMPLATE: &str = r#"Create an HTML web page for: {description}

<!DOCTYPE html>
<html>
<head>
<title>"#;

/// Static per-backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig
{   /// Which backend this configures
    pub identifier: BackendKind
  , /// Maximum tokens the backend may generate
    pub max_output_length: usize
  , /// Sampling temperature, within (0, 2]
    pub temperature: f32
  , /// Prompt with a `{description}` placeholder
    pub prompt_template: String
}

impl BackendConfig
{   pub fn new(
      identifier: BackendKind
    , max_output_length: usize
    , temperature: f32
    , prompt_template: &str
    ) -> Self
    {   BackendConfig
        {   identifier
          , max_output_length
          , temperature
          , prompt_template: prompt_template.to_string()
        }
    }

    /// Substitute the description into the prompt template
    pub fn render_prompt(&self, description: &str) -> String
    {   self.prompt_template
          .replace(DESCRIPTION_PLACEHOLDER, description)
    }

    /// Template text after the last placeholder, the part a completion
    /// continues. Never contains request text.
    pub fn primed_prefix(&self) -> &str
    {   match self.prompt_template.rfind(DESCRIPTION_PLACEHOLDER)
        {   Some(at) => {
              &self.prompt_template[at + DESCRIPTION_PLACEHOLDER.len()..]
            }
          , None => &self.prompt_template
        }
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if !(self.temperature > 0.0 && self.temperature <= 2.0)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "{:?} temperature {} outside (0, 2]",
                self.identifier, self.temperature
              )
            ));
        }
        if self.max_output_length == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "{:?} max_output_length must be positive",
                self.identifier
              )
            ));
        }
        if !self.prompt_template.contains(DESCRIPTION_PLACEHOLDER)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "{:?} prompt template lacks {}",
                self.identifier, DESCRIPTION_PLACEHOLDER
              )
            ));
        }
        Ok(())
    }
}

/// Hosted chat-completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig
{   /// API base URL, `/chat/completions` is appended
    pub api_base: String
  , /// Model requested from the API
    pub model: String
  , /// Environment variable the key is read from
    pub api_key_env: String
  , /// Resolved key, never serialized
    #[serde(skip)]
    pub api_key: Option<String>
  , /// Request timeout in seconds, none by default
    pub timeout_secs: Option<u64>
  , pub backend: BackendConfig
}

impl Default for RemoteConfig
{   fn default() -> Self
    {   RemoteConfig
        {   api_base: "https://api.openai.com/v1".to_string()
          , model: "gpt-3.5-turbo".to_string()
          , api_key_env: DEFAULT_API_KEY_ENV.to_string()
          , api_key: None
          , timeout_secs: None
          , backend: BackendConfig::new(
              BackendKind::RemoteApi,
              2000,
              0.7,
              REMOTE_USER_TEMPLATE
            )
        }
    }
}

impl RemoteConfig
{   /// Read the key from `api_key_env`; empty values count as absent
    pub fn resolve_api_key(&mut self)
    {   self.api_key = std::env::var(&self.api_key_env)
          .ok()
          .filter(|k| !k.trim().is_empty());
        debug!(
          "Remote credential {} {}",
          self.api_key_env,
          if self.api_key.is_some() { "present" } else { "absent" }
        );
    }
}

/// One entry of the ordered local model list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalModelCandidate
{   /// Identifier passed to the model runtime
    pub model: String
  , pub backend: BackendConfig
}

impl LocalModelCandidate
{   pub fn new(
      model: &str
    , max_output_length: usize
    , prompt_template: &str
    ) -> Self
    {   LocalModelCandidate
        {   model: model.to_string()
          , backend: BackendConfig::new(
              BackendKind::LocalModel,
              max_output_length,
              0.7,
              prompt_template
            )
        }
    }
}

/// Local causal-language-model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig
{   /// Set false to never probe a local model
    pub enabled: bool
  , /// Base URL of the completion server
    pub endpoint: String
  , /// Request timeout in seconds, none by default
    pub timeout_secs: Option<u64>
  , /// Highest quality first, lightest last
    pub candidates: Vec<LocalModelCandidate>
}

impl Default for LocalConfig
{   fn default() -> Self
    {   LocalConfig
        {   enabled: true
          , endpoint: "http://localhost:11434".to_string()
          , timeout_secs: None
          , candidates: vec![
              LocalModelCandidate::new(
                "deepseek-coder:6.7b-instruct",
                2048,
                RICH_LOCAL_TEMPLATE
              )
            , LocalModelCandidate::new(
                "codellama:7b-instruct",
                1024,
                COMMON_LOCAL_TEMPLATE
              )
            , LocalModelCandidate::new(
                "qwen2.5-coder:1.5b",
                1024,
                COMMON_LOCAL_TEMPLATE
              )
            , LocalModelCandidate::new(
                "tinyllama",
                1024,
                COMMON_LOCAL_TEMPLATE
              )
            ]
        }
    }
}

/// Top-level generator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig
{   pub remote: RemoteConfig
  , pub local: LocalConfig
}

impl GeneratorConfig
{   /// Defaults adjusted by the process environment
    pub fn from_env() -> Self
    {   let mut config = GeneratorConfig::default();
        config.apply_env();
        config
    }

    /// Load a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path)
      -> Result<Self, crate::error::Error>
    {   debug!("Loading generator config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
          crate::error::Error::InvalidConfiguration(
            format!("{}: {}", path.display(), e)
          )
        })?;
        let mut config = Self::from_json_str(&text)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_json_str(text: &str)
      -> Result<Self, crate::error::Error>
    {   let config: GeneratorConfig
          = serde_json::from_str(text).map_err(|e| {
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self)
    {   self.remote.resolve_api_key();
        if let Ok(endpoint) = std::env::var(LOCAL_ENDPOINT_ENV)
        {   if !endpoint.trim().is_empty()
            {   debug!("Local endpoint overridden: {}", endpoint);
                self.local.endpoint = endpoint;
            }
        }
        if std::env::var(DISABLE_LOCAL_ENV)
          .map(|v| !v.trim().is_empty())
          .unwrap_or(false)
        {   debug!("Local backend disabled by {}", DISABLE_LOCAL_ENV);
            self.local.enabled = false;
        }
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   self.remote.backend.validate()?;
        for candidate in &self.local.candidates
        {   candidate.backend.validate()?;
        }
        if self.local.enabled && self.local.candidates.is_empty()
        {   warn!("Local backend enabled with no model candidates");
        }
        Ok(())
    }
}
