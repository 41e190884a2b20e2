use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use htmlforge::config::{
  GeneratorConfig, LocalConfig, LocalModelCandidate, RemoteConfig,
  COMMON_LOCAL_TEMPLATE
};
use htmlforge::error::{Error, ErrorKind};
use htmlforge::providers::{
  Backend, LoadedModel, LocalModelBackend, ModelRuntime, RemoteApiBackend
};
use htmlforge::templates::{Category, TemplateCatalog, TemplateSelector};
use htmlforge::{
  BackendKind, GenerationRequest, GenerationResult, GeneratorService,
  HtmlGenerator, LocalModelState
};

// ===== Helpers =====

/// Runtime that loads only the listed models and counts every load
struct StubRuntime
{   loadable: Vec<String>
  , loads: Arc<AtomicUsize>
  , completion: Result<String, Error>
  , prompts: Arc<Mutex<Vec<String>>>
}

impl StubRuntime
{   fn new(loadable: &[&str], completion: Result<String, Error>) -> Self
    {   StubRuntime
        {   loadable: loadable.iter().map(|m| m.to_string()).collect()
          , loads: Arc::new(AtomicUsize::new(0))
          , completion
          , prompts: Arc::new(Mutex::new(vec![]))
        }
    }
}

struct StubModel
{   identifier: String
  , completion: Result<String, Error>
  , prompts: Arc<Mutex<Vec<String>>>
}

#[async_trait]
impl ModelRuntime for StubRuntime
{   async fn load(&self, model: &str)
      -> Result<Arc<dyn LoadedModel>, Error>
    {   self.loads.fetch_add(1, Ordering::SeqCst);
        if self.loadable.iter().any(|m| m == model)
        {   Ok(Arc::new(StubModel
            {   identifier: model.to_string()
              , completion: self.completion.clone()
              , prompts: Arc::clone(&self.prompts)
            }))
        } else
        {   Err(Error::ModelUnavailable(model.to_string()))
        }
    }
}

#[async_trait]
impl LoadedModel for StubModel
{   fn identifier(&self) -> &str
    {   &self.identifier
    }

    async fn complete(
      &self
    , prompt: &str
    , _max_output_length: usize
    , _temperature: f32
    ) -> Result<String, Error>
    {   self.prompts.lock().unwrap().push(prompt.to_string());
        self.completion.clone()
    }
}

/// Backend returning a fixed result
struct FixedBackend
{   kind: BackendKind
  , result: Result<String, Error>
  , calls: Arc<AtomicUsize>
}

#[async_trait]
impl Backend for FixedBackend
{   fn kind(&self) -> BackendKind
    {   self.kind
    }

    fn is_available(&self) -> bool
    {   true
    }

    async fn attempt(&self, _request: &GenerationRequest)
      -> Result<String, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct PanickingBackend;

#[async_trait]
impl Backend for PanickingBackend
{   fn kind(&self) -> BackendKind
    {   BackendKind::Template
    }

    fn is_available(&self) -> bool
    {   true
    }

    async fn attempt(&self, _request: &GenerationRequest)
      -> Result<String, Error>
    {   panic!("template store corrupted")
    }
}

fn unconfigured_remote() -> RemoteApiBackend
{   RemoteApiBackend::new(RemoteConfig::default())
      .expect("remote backend")
}

fn remote_at(uri: &str) -> RemoteApiBackend
{   let config = RemoteConfig
    {   api_base: uri.to_string()
      , api_key: Some("test-key".to_string())
      , ..RemoteConfig::default()
    };
    RemoteApiBackend::new(config).expect("remote backend")
}

fn disabled_local() -> LocalModelBackend
{   let config = LocalConfig
    {   enabled: false
      , ..LocalConfig::default()
    };
    LocalModelBackend::with_runtime(
      config,
      Arc::new(StubRuntime::new(&[], Ok(String::new())))
    )
}

fn stub_local(runtime: StubRuntime) -> LocalModelBackend
{   LocalModelBackend::with_runtime(
      LocalConfig::default(),
      Arc::new(runtime)
    )
}

fn random_description(rng: &mut impl Rng) -> String
{   let mut words = Vec::new();
    for _ in 0..rng.gen_range(0..8)
    {   let len = rng.gen_range(1..10);
        let word: String = (0..len)
          .map(|_| char::from(rng.sample::<u8, _>(Alphanumeric)))
          .collect();
        words.push(word);
    }
    words.join(" ")
}

fn assert_document(html: &str)
{   let lowered = html.to_ascii_lowercase();
    assert!(
      lowered.starts_with("<!doctype") || lowered.starts_with("<html"),
      "not a document: {}",
      &html[..html.len().min(60)]
    );
    assert!(lowered.contains("</html>"), "no closing tag");
}

// ===== Templates =====

#[test]
fn test_selector_keyword_categories()
{   let selector = TemplateSelector::default();
    assert_eq!(
      selector.select("build me a calculator"),
      Category::Calculator
    );
    assert_eq!(
      selector.select("todo list for groceries"),
      Category::Todo
    );
    assert_eq!(
      selector.select("contact form for feedback"),
      Category::Contact
    );
}

#[test]
fn test_selector_random_default_is_valid()
{   let selector = TemplateSelector::default();
    let mut seen = HashSet::new();
    for _ in 0..300
    {   let category
          = selector.select("random description with no keywords");
        assert!(Category::ALL.contains(&category));
        seen.insert(category);
    }
    // 300 uniform draws over three categories
    assert_eq!(seen.len(), 3);
}

#[test]
fn test_customize_calculator_title()
{   let catalog = TemplateCatalog::builtin();
    let template = catalog.get(Category::Calculator);
    let html = catalog.customize(template, "a simple calculator app");

    assert!(html.contains("<title>Simple Calculator App</title>"));
    assert_eq!(
      html.replacen(
        "<title>Simple Calculator App</title>",
        "<title>Calculator</title>",
        1
      ),
      template.body
    );
}

#[test]
fn test_customize_without_surviving_tokens_keeps_body()
{   let catalog = TemplateCatalog::builtin();
    let template = catalog.get(Category::Contact);
    assert_eq!(catalog.customize(template, "an app for"), template.body);
    assert_eq!(catalog.customize(template, ""), template.body);
}

// ===== Remote backend =====

#[tokio::test]
async fn test_remote_missing_credential()
{   let remote = unconfigured_remote();
    assert!(!remote.is_configured());
    assert_eq!(
      remote.call("anything").await.map_err(|e| e.kind()),
      Err(ErrorKind::CredentialMissing)
    );
}

#[tokio::test]
async fn test_remote_success_is_extracted()
{   let server = MockServer::start().await;
    let content = "Here is your app:\n<!DOCTYPE html><html><head>\
                   <title>Timer</title></head><body>t</body></html>\n\
                   Enjoy!";

    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .and(header("authorization", "Bearer test-key"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
          "message": { "role": "assistant", "content": content },
          "finish_reason": "stop"
        }]
      })))
      .expect(1)
      .mount(&server)
      .await;

    let generator = HtmlGenerator::new(
      remote_at(&server.uri()),
      disabled_local()
    );
    let outcome = generator
      .generate_detailed(&GenerationRequest::new("a countdown timer"))
      .await;

    assert_eq!(outcome.backend, BackendKind::RemoteApi);
    assert_eq!(
      outcome.html,
      "<!DOCTYPE html><html><head><title>Timer</title></head>\
       <body>t</body></html>"
    );
    assert_eq!(outcome.notice(), None);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value
      = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 2000);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"]
      .as_str()
      .unwrap()
      .contains("a countdown timer"));
}

#[tokio::test]
async fn test_remote_rate_limit_falls_back_to_template()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(429).set_body_string("slow down")
      )
      .expect(2)
      .mount(&server)
      .await;

    let generator = HtmlGenerator::new(
      remote_at(&server.uri()),
      disabled_local()
    );

    // rate limiting is transient: the remote is tried on every request
    for _ in 0..2
    {   let outcome = generator
          .generate_detailed(&GenerationRequest::new("todo tracker"))
          .await;
        assert_eq!(outcome.backend, BackendKind::Template);
        assert!(outcome.html.contains("<title>Todo Tracker App</title>"));
        assert_eq!(
          outcome.attempts[0].result,
          GenerationResult::Failure
          {   reason: ErrorKind::NonSuccessStatus
          }
        );
        assert!(outcome.attempts[0].rate_limited);
        assert_eq!(
          outcome.notice().as_deref(),
          Some("Using templates because models are rate-limited")
        );
    }
    assert!(generator.availability().remote_configured);
}

#[tokio::test]
async fn test_remote_without_document_is_skipped()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
          "message": { "role": "assistant", "content": "I cannot help." }
        }]
      })))
      .mount(&server)
      .await;

    let generator = HtmlGenerator::new(
      remote_at(&server.uri()),
      disabled_local()
    );
    let outcome = generator
      .generate_detailed(&GenerationRequest::new("contact page"))
      .await;

    assert_eq!(outcome.backend, BackendKind::Template);
    assert_eq!(
      outcome.attempts[0].result,
      GenerationResult::Failure
      {   reason: ErrorKind::ExtractionNotFound
      }
    );
    assert_eq!(
      outcome.notice().as_deref(),
      Some("Using templates because no model produced a usable document")
    );
}

#[tokio::test]
async fn test_remote_empty_choices_is_malformed()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(json!({ "choices": [] }))
      )
      .mount(&server)
      .await;

    let remote = remote_at(&server.uri());
    assert_eq!(
      remote.call("x").await.map_err(|e| e.kind()),
      Err(ErrorKind::MalformedResponse)
    );
}

// ===== Local backend =====

#[tokio::test]
async fn test_local_probe_keeps_first_loadable_candidate()
{   let runtime = StubRuntime::new(
      &["codellama:7b-instruct", "tinyllama"],
      Ok("Todo App</title>\n</head>\n<body><ul></ul></body>\n</html>\n\
          That is the page."
        .to_string())
    );
    let loads = Arc::clone(&runtime.loads);
    let prompts = Arc::clone(&runtime.prompts);
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      stub_local(runtime)
    );
    assert_eq!(generator.availability().local, LocalModelState::NotProbed);

    for _ in 0..3
    {   let outcome = generator
          .generate_detailed(&GenerationRequest::new("todo tracker"))
          .await;
        assert_eq!(outcome.backend, BackendKind::LocalModel);
        assert_eq!(
          outcome.html,
          "<!DOCTYPE html>\n<html>\n<head>\n<title>Todo App</title>\n\
           </head>\n<body><ul></ul></body>\n</html>"
        );
    }

    // deepseek failed, codellama loaded, nothing probed afterwards
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(
      generator.availability().local,
      LocalModelState::Loaded("codellama:7b-instruct".to_string())
    );
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert_eq!(
      prompts[0],
      COMMON_LOCAL_TEMPLATE.replace("{description}", "todo tracker")
    );
}

#[tokio::test]
async fn test_local_best_model_gets_rich_prompt()
{   let runtime = StubRuntime::new(
      &["deepseek-coder:6.7b-instruct"],
      Ok("X</title></head><body></body></html>".to_string())
    );
    let prompts = Arc::clone(&runtime.prompts);
    let local = stub_local(runtime);

    let raw = local.call("weather dashboard").await.unwrap();
    assert!(raw.ends_with("X</title></head><body></body></html>"));
    assert!(!raw.contains("weather dashboard"));

    let prompts = prompts.lock().unwrap();
    assert!(prompts[0].contains("Requirements:"));
    assert!(prompts[0].contains("\"weather dashboard\""));
}

#[tokio::test]
async fn test_local_unavailable_is_memoized_and_templates_answer()
{   let runtime = StubRuntime::new(&[], Ok(String::new()));
    let loads = Arc::clone(&runtime.loads);
    let candidates = LocalConfig::default().candidates.len();
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      stub_local(runtime)
    );

    let mut rng = rand::thread_rng();
    let mut seen = HashSet::new();
    while seen.len() < 100
    {   let description = random_description(&mut rng);
        if !seen.insert(description.clone())
        {   continue;
        }
        let outcome = generator
          .generate_detailed(&GenerationRequest::new(description))
          .await;
        assert_eq!(outcome.backend, BackendKind::Template);
        assert_document(&outcome.html);
    }

    assert_eq!(loads.load(Ordering::SeqCst), candidates);
    let availability = generator.availability();
    assert_eq!(availability.local, LocalModelState::Unavailable);
    assert!(availability.templates_only());
}

#[tokio::test]
async fn test_local_generation_failure_is_transient()
{   let runtime = StubRuntime::new(
      &["deepseek-coder:6.7b-instruct"],
      Err(Error::TransportFailure("connection reset".to_string()))
    );
    let loads = Arc::clone(&runtime.loads);
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      stub_local(runtime)
    );

    for _ in 0..2
    {   let outcome = generator
          .generate_detailed(&GenerationRequest::new("a calculator"))
          .await;
        assert_eq!(outcome.backend, BackendKind::Template);
        assert_eq!(
          outcome.attempts[1].result,
          GenerationResult::Failure
          {   reason: ErrorKind::GenerationException
          }
        );
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(
      generator.availability().local,
      LocalModelState::Loaded("deepseek-coder:6.7b-instruct".to_string())
    );
}

#[tokio::test]
async fn test_concurrent_first_requests_probe_once()
{   let runtime = StubRuntime::new(
      &["tinyllama"],
      Ok("Hi</title></head><body></body></html>".to_string())
    );
    let loads = Arc::clone(&runtime.loads);
    let candidates = LocalConfig::default().candidates.len();
    let generator = Arc::new(HtmlGenerator::new(
      unconfigured_remote(),
      stub_local(runtime)
    ));

    let tasks: Vec<_> = (0..8)
      .map(|i| {
        let generator = Arc::clone(&generator);
        tokio::spawn(async move {
          generator.generate(&format!("page {}", i)).await
        })
      })
      .collect();
    for task in tasks
    {   assert_document(&task.await.unwrap());
    }

    // tinyllama is last, so every earlier candidate failed exactly once
    assert_eq!(loads.load(Ordering::SeqCst), candidates);
}

#[tokio::test]
async fn test_http_runtime_loads_then_completes()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/generate"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "model": "tinyllama",
        "response": "Notes App</title></head><body>notes</body></html>",
        "done": true
      })))
      .expect(2)
      .mount(&server)
      .await;

    let config = LocalConfig
    {   endpoint: server.uri()
      , candidates: vec![
          LocalModelCandidate::new("tinyllama", 64, COMMON_LOCAL_TEMPLATE)
        ]
      , ..LocalConfig::default()
    };
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      LocalModelBackend::new(config).unwrap()
    );

    let availability = generator.warm_up().await;
    assert_eq!(
      availability.local,
      LocalModelState::Loaded("tinyllama".to_string())
    );

    let outcome = generator
      .generate_detailed(&GenerationRequest::new("notes"))
      .await;
    assert_eq!(outcome.backend, BackendKind::LocalModel);
    assert_eq!(
      outcome.html,
      "<!DOCTYPE html>\n<html>\n<head>\n<title>Notes App</title>\
       </head><body>notes</body></html>"
    );

    let requests = server.received_requests().await.unwrap();
    let load: serde_json::Value
      = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(load["model"], "tinyllama");
    assert!(load.get("prompt").is_none());
    let completion: serde_json::Value
      = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(completion["stream"], false);
    assert_eq!(completion["options"]["num_predict"], 64);
}

#[tokio::test]
async fn test_http_runtime_unknown_model_probed_once()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api/generate"))
      .respond_with(
        ResponseTemplate::new(404)
          .set_body_json(json!({ "error": "model not found" }))
      )
      .expect(1)
      .mount(&server)
      .await;

    let config = LocalConfig
    {   endpoint: server.uri()
      , candidates: vec![
          LocalModelCandidate::new("missing", 64, COMMON_LOCAL_TEMPLATE)
        ]
      , ..LocalConfig::default()
    };
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      LocalModelBackend::new(config).unwrap()
    );

    for _ in 0..3
    {   let outcome = generator
          .generate_detailed(&GenerationRequest::new("a number game"))
          .await;
        assert_eq!(outcome.backend, BackendKind::Template);
    }
    assert_eq!(
      generator.availability().local,
      LocalModelState::Unavailable
    );
}

// ===== Orchestrator =====

#[tokio::test]
async fn test_local_result_excludes_description_markup()
{   let runtime = StubRuntime::new(
      &["deepseek-coder:6.7b-instruct"],
      Ok("Model Page</title></head><body>MODEL OUTPUT</body></html>"
        .to_string())
    );
    let prompts = Arc::clone(&runtime.prompts);
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      stub_local(runtime)
    );
    let description = "restyle this: <!DOCTYPE html><html><body>\
                       USER PASTE</body></html>";

    let outcome = generator
      .generate_detailed(&GenerationRequest::new(description))
      .await;
    assert_eq!(outcome.backend, BackendKind::LocalModel);
    assert!(
      outcome.html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">")
    );
    assert!(outcome.html.contains("<title>Model Page</title>"));
    assert!(outcome.html.contains("MODEL OUTPUT"));
    assert!(!outcome.html.contains("USER PASTE"));

    // The model still sees the description
    assert!(prompts.lock().unwrap()[0].contains("USER PASTE"));
}

#[tokio::test]
async fn test_local_empty_completion_falls_to_templates()
{   let runtime = StubRuntime::new(
      &["codellama:7b-instruct"],
      Ok("  \n".to_string())
    );
    let generator = HtmlGenerator::new(
      unconfigured_remote(),
      stub_local(runtime)
    );

    let outcome = generator
      .generate_detailed(&GenerationRequest::new("a calculator"))
      .await;
    assert_eq!(outcome.backend, BackendKind::Template);
    assert_document(&outcome.html);
    assert_eq!(
      outcome.attempts[1].result,
      GenerationResult::Failure
      {   reason: ErrorKind::GenerationException
      }
    );
    // An empty completion is transient, the model stays active
    assert_eq!(
      generator.availability().local,
      LocalModelState::Loaded("codellama:7b-instruct".to_string())
    );
}

#[tokio::test]
async fn test_listed_local_stage_reports_its_state()
{   let loaded = HtmlGenerator::with_backends(vec![
      Arc::new(stub_local(
        StubRuntime::new(&["tinyllama"], Ok(String::new()))
      )) as Arc<dyn Backend>
    ]);
    assert_eq!(loaded.availability().local, LocalModelState::NotProbed);
    assert_eq!(
      loaded.warm_up().await.local,
      LocalModelState::Loaded("tinyllama".to_string())
    );

    let unloadable = HtmlGenerator::with_backends(vec![
      Arc::new(stub_local(
        StubRuntime::new(&[], Ok(String::new()))
      )) as Arc<dyn Backend>
    ]);
    let availability = unloadable.warm_up().await;
    assert_eq!(availability.local, LocalModelState::Unavailable);
    assert!(availability.templates_only());
}

#[tokio::test]
async fn test_chain_stops_at_first_valid_document()
{   let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let third = Arc::new(AtomicUsize::new(0));
    let generator = HtmlGenerator::with_backends(vec![
      Arc::new(FixedBackend
      {   kind: BackendKind::RemoteApi
        , result: Ok("<div>not a document</div>".to_string())
        , calls: Arc::clone(&first)
      }) as Arc<dyn Backend>
    , Arc::new(FixedBackend
      {   kind: BackendKind::LocalModel
        , result: Ok("<html><body>local</body></html>".to_string())
        , calls: Arc::clone(&second)
      }) as Arc<dyn Backend>
    , Arc::new(FixedBackend
      {   kind: BackendKind::Template
        , result: Ok("<html></html>".to_string())
        , calls: Arc::clone(&third)
      }) as Arc<dyn Backend>
    ]);

    let outcome = generator
      .generate_detailed(&GenerationRequest::new("anything"))
      .await;
    assert_eq!(outcome.backend, BackendKind::LocalModel);
    assert_eq!(outcome.html, "<html><body>local</body></html>");
    assert_eq!(
      outcome.attempts[1].result.html(),
      Some("<html><body>local</body></html>")
    );
    assert_eq!(
      outcome.attempts[0].result,
      GenerationResult::Failure
      {   reason: ErrorKind::ValidationFailed
      }
    );
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(third.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_exhausted_chain_uses_fallback_page()
{   let generator = HtmlGenerator::with_backends(vec![
      Arc::new(FixedBackend
      {   kind: BackendKind::RemoteApi
        , result: Err(Error::TransportFailure("dns".to_string()))
        , calls: Arc::new(AtomicUsize::new(0))
      }) as Arc<dyn Backend>
    , Arc::new(PanickingBackend) as Arc<dyn Backend>
    ]);

    let outcome = generator
      .generate_detailed(&GenerationRequest::new("<script>x</script>"))
      .await;
    assert_eq!(outcome.backend, BackendKind::Fallback);
    assert_document(&outcome.html);
    assert!(outcome.html.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert_eq!(outcome.attempts.len(), 3);
    assert_eq!(
      outcome.attempts[1].result,
      GenerationResult::Failure
      {   reason: ErrorKind::Other
      }
    );
    assert_eq!(
      outcome.notice().as_deref(),
      Some("Using the built-in fallback page because no model \
            produced a usable document")
    );

    let empty = HtmlGenerator::with_backends(vec![]);
    assert_document(&empty.generate("").await);
}

#[tokio::test]
async fn test_every_description_yields_a_document()
{   let generator = HtmlGenerator::new(
      unconfigured_remote(),
      disabled_local()
    );
    let mut rng = rand::thread_rng();
    assert_document(&generator.generate("").await);
    for _ in 0..50
    {   let description = random_description(&mut rng);
        assert_document(&generator.generate(&description).await);
    }
}

#[test]
fn test_disabled_local_reports_disabled()
{   let generator = HtmlGenerator::new(
      unconfigured_remote(),
      disabled_local()
    );
    let availability = tokio_test::block_on(generator.warm_up());
    assert_eq!(availability.local, LocalModelState::Disabled);
    assert!(!availability.remote_configured);
    assert!(availability.templates_only());
}

#[test]
fn test_generation_result_from_backend_result()
{   assert_eq!(
      GenerationResult::from(Ok::<_, Error>("<html></html>".to_string())),
      GenerationResult::Success { html: "<html></html>".to_string() }
    );
    let failure = GenerationResult::from(
      Err::<String, _>(Error::ModelUnavailable("none".to_string()))
    );
    assert_eq!(failure.html(), None);
    assert!(!ErrorKind::ModelUnavailable.is_transient());
    assert!(ErrorKind::NonSuccessStatus.is_transient());
}

// ===== Config =====

#[test]
fn test_config_json_keeps_defaults()
{   let config = GeneratorConfig::from_json_str(r#"{
      "remote": { "model": "gpt-4o-mini", "timeout_secs": 30 },
      "local": { "enabled": false }
    }"#).unwrap();
    assert_eq!(config.remote.model, "gpt-4o-mini");
    assert_eq!(config.remote.timeout_secs, Some(30));
    assert_eq!(config.remote.api_key_env, "OPENAI_API_KEY");
    assert!(config.remote.api_key.is_none());
    assert!(!config.local.enabled);
    assert_eq!(config.local.candidates.len(), 4);
}

#[test]
fn test_primed_prefix_follows_description()
{   let candidate = &LocalConfig::default().candidates[1];
    assert_eq!(
      candidate.backend.primed_prefix(),
      "\n\n<!DOCTYPE html>\n<html>\n<head>\n<title>"
    );
    assert_eq!(
      COMMON_LOCAL_TEMPLATE,
      format!(
        "Create an HTML web page for: {{description}}{}",
        candidate.backend.primed_prefix()
      )
    );
}

#[test]
fn test_config_rejects_bad_temperature()
{   let mut config = GeneratorConfig::default();
    config.local.candidates[0].backend.temperature = 0.0;
    assert_eq!(
      config.validate().map_err(|e| e.kind()),
      Err(ErrorKind::InvalidConfiguration)
    );

    let mut config = GeneratorConfig::default();
    config.remote.backend.temperature = 2.5;
    assert!(config.validate().is_err());

    let mut config = GeneratorConfig::default();
    config.remote.backend.prompt_template = "no placeholder".to_string();
    assert!(config.validate().is_err());
}

// ===== Service =====

#[tokio::test]
async fn test_service_generate_and_shutdown()
{   let service = GeneratorService::new(HtmlGenerator::new(
      unconfigured_remote(),
      disabled_local()
    ));

    let mut availability_rx = service.availability().await.unwrap();
    let availability = availability_rx.recv().await.unwrap();
    assert!(availability.templates_only());

    let mut first = service
      .generate("a simple calculator app".to_string())
      .await
      .unwrap();
    let mut second = service
      .generate("feedback form".to_string())
      .await
      .unwrap();

    let first = first.recv().await.unwrap();
    assert_eq!(first.backend, BackendKind::Template);
    assert!(first.html.contains("<title>Simple Calculator App</title>"));

    let second = second.recv().await.unwrap();
    assert!(second.html.contains("<title>Feedback Form App</title>"));

    assert_eq!(service.shutdown().await, Ok(()));
}
