//! Async client for the translate and speak RPCs

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages::{GoogleLanguages, LanguageResolver};
use crate::core::models::{Batch, BatchItem, SpeechAudio, TranslationResult};
use crate::core::request::{build_init_request, prepare_speak, prepare_translate};
use crate::core::response::{decode_speech, order_by_index, parse_records};
use crate::core::tokens::SessionTokens;
use crate::core::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::core::translation::decode_translation;

/// Async translation client.
///
/// Every call is independent: `translate` performs the landing-page fetch and
/// one batchexecute round-trip, `speak` only the latter. Nothing is cached
/// between calls.
#[derive(Clone)]
pub struct AsyncTranslator {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn LanguageResolver>,
    config: Arc<TranslatorConfig>,
}

impl std::fmt::Debug for AsyncTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncTranslator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AsyncTranslator {
    /// Create a new async translator using `reqwest` and the built-in language table
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_defaults()?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a translator sending requests through `transport`
    pub fn with_transport(config: TranslatorConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            transport,
            resolver: Arc::new(GoogleLanguages),
            config: Arc::new(config),
        })
    }

    /// Replace the language resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn LanguageResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate with the client's configuration
    pub async fn translate(
        &self,
        input: impl Into<Batch<BatchItem>>,
    ) -> Result<Batch<TranslationResult>> {
        self.translate_with(input, &self.config).await
    }

    /// Translate with an explicit configuration
    pub async fn translate_with(
        &self,
        input: impl Into<Batch<BatchItem>>,
        config: &TranslatorConfig,
    ) -> Result<Batch<TranslationResult>> {
        let input = input.into();
        info!("Translating {} {} item(s)", input.shape(), input.len());

        // languages are checked before anything goes on the wire
        let prepared = prepare_translate(&input, config, self.resolver.as_ref())?;

        let init_data = self.fetch_init_data(config).await?;
        let tokens = SessionTokens::from_init_data(&init_data);
        if tokens.session_id.is_empty() || tokens.build_label.is_empty() {
            warn!("Session tokens missing from landing page, sending request without them");
        }

        let request = prepared.into_request(config, &tokens)?;
        let body = self.send(request, config).await?;

        let mut results = Vec::new();
        for record in parse_records(&body)? {
            results.push((record.index, decode_translation(record.payload)?));
        }

        shape_results(&input, results)
    }

    /// Speak with the client's configuration
    pub async fn speak(&self, input: impl Into<Batch<BatchItem>>) -> Result<Batch<SpeechAudio>> {
        self.speak_with(input, &self.config).await
    }

    /// Speak with an explicit configuration
    pub async fn speak_with(
        &self,
        input: impl Into<Batch<BatchItem>>,
        config: &TranslatorConfig,
    ) -> Result<Batch<SpeechAudio>> {
        let input = input.into();
        info!("Speaking {} {} item(s)", input.shape(), input.len());

        let request = prepare_speak(&input, config, self.resolver.as_ref())?
            .into_request(config, &SessionTokens::default())?;
        let body = self.send(request, config).await?;

        let mut results = Vec::new();
        for record in parse_records(&body)? {
            results.push((record.index, decode_speech(&record.payload)?));
        }

        shape_results(&input, results)
    }

    /// Raw landing page carrying the session tokens
    pub async fn fetch_init_data(&self, config: &TranslatorConfig) -> Result<String> {
        let request = build_init_request(config);
        self.send(request, config).await
    }

    /// Send a request and return the body of an OK response
    async fn send(&self, request: HttpRequest, config: &TranslatorConfig) -> Result<String> {
        let url = request.url.clone();
        debug!("Sending request to {}", url);

        let response: HttpResponse = self.transport.execute(request).await?;

        if !response.is_ok() {
            warn!("Request to {} failed: {} {}", url, response.status, response.status_text);
            return Err(TranslationError::Transport {
                status_text: response.status_text,
                url,
                options: Box::new(config.clone()),
            });
        }

        Ok(response.body)
    }
}

fn shape_results<R>(input: &Batch<BatchItem>, results: Vec<(usize, R)>) -> Result<Batch<R>> {
    let ordered = order_by_index(results, input.len())?;
    input
        .with_values(ordered)
        .ok_or_else(|| TranslationError::decode("result count does not match input"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use indexmap::IndexMap;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    use crate::core::errors::LanguageField;
    use crate::core::transport::HttpMethod;

    const INIT_PAGE: &str = r#"<html>{"FdrFJe":"8517345","cfb2h":"boq_translate_20240101"}</html>"#;

    /// Replays canned responses in order and records every request
    struct MockTransport {
        responses: Mutex<Vec<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl MockTransport {
        fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(TranslationError::NetworkError {
                    message: "no canned response left".to_string(),
                });
            }
            Ok(responses.remove(0))
        }
    }

    fn ok(body: impl Into<String>) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    fn translation_payload(text: &str, detected: &str) -> Value {
        json!([
            null,
            [[[null, null, null, null, null, [[text]]]], null, "en", "auto"],
            detected
        ])
    }

    fn batch_body(rpc_id: &str, records: &[(Value, usize)]) -> String {
        let mut body = String::from(")]}'\n\n");
        for (payload, index) in records {
            let line = json!([[
                "wrb.fr",
                rpc_id,
                payload.to_string(),
                null,
                null,
                null,
                crate::core::request::encode_index(*index)
            ]])
            .to_string();
            body.push_str(&format!("{}\n{}\n", line.len(), line));
        }
        body.push_str("[[\"di\",17],[\"af.httprm\",16,\"-1\",3]]\n");
        body.push_str("[[\"e\",4,null,null,321]]\n");
        body
    }

    fn translator(transport: Arc<MockTransport>) -> AsyncTranslator {
        AsyncTranslator::with_transport(TranslatorConfig::default(), transport).unwrap()
    }

    #[tokio::test]
    async fn test_translate_sequence_ignores_response_order() {
        let body = batch_body(
            "MkEWBc",
            &[
                (translation_payload("drei", "de"), 2),
                (translation_payload("un", "fr"), 0),
                (translation_payload("dos", "es"), 1),
            ],
        );
        let transport = MockTransport::new(vec![ok(INIT_PAGE), ok(body)]);
        let client = translator(transport.clone());

        let result = client.translate(vec!["one", "two", "three"]).await.unwrap();

        let Batch::Sequence(results) = result else {
            panic!("expected a sequence");
        };
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["un", "dos", "drei"]);
        assert_eq!(results[2].from.language.iso, "de");

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].url, "https://translate.google.com");
        assert_eq!(requests[1].method, HttpMethod::Post);
        assert!(requests[1].url.contains("f.sid=8517345"));
        assert!(requests[1].url.contains("bl=boq_translate_20240101"));
    }

    #[tokio::test]
    async fn test_translate_keyed_by_position() {
        let body = batch_body(
            "MkEWBc",
            &[
                (translation_payload("au revoir", "en"), 1),
                (translation_payload("bonjour", "en"), 0),
            ],
        );
        let transport = MockTransport::new(vec![ok(INIT_PAGE), ok(body)]);
        let client = translator(transport);

        let mut input = IndexMap::new();
        input.insert("z_hello".to_string(), BatchItem::new("hello").with_to("fr"));
        input.insert("a_bye".to_string(), BatchItem::new("bye").with_to("fr"));

        let Batch::Keyed(results) = client.translate(input).await.unwrap() else {
            panic!("expected a keyed batch");
        };
        let keys: Vec<&str> = results.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z_hello", "a_bye"]);
        assert_eq!(results["z_hello"].text, "bonjour");
        assert_eq!(results["a_bye"].text, "au revoir");
    }

    #[tokio::test]
    async fn test_translate_single_is_unwrapped() {
        let body = batch_body("MkEWBc", &[(translation_payload("hallo", "en"), 0)]);
        let transport = MockTransport::new(vec![ok(INIT_PAGE), ok(body)]);
        let client = translator(transport);

        let result = client.translate("hello").await.unwrap();
        let single = result.into_single().expect("single result");
        assert_eq!(single.text, "hallo");
        assert_eq!(single.from.language.iso, "en");
        assert!(single.from.language.did_you_mean);
    }

    #[tokio::test]
    async fn test_unsupported_language_makes_no_call() {
        let transport = MockTransport::new(vec![ok(INIT_PAGE)]);
        let client = translator(transport.clone());

        let err = client
            .translate(BatchItem::new("qapla'").with_to("klingon"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TranslationError::UnsupportedLanguage { field: LanguageField::To, ref value } if value == "klingon"
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_speak_unsupported_language_makes_no_call() {
        let transport = MockTransport::new(vec![]);
        let client = translator(transport.clone());

        let err = client
            .speak(BatchItem::new("hello").with_to("klingon"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::UnsupportedLanguage { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_ok_status_is_transport_error() {
        let transport = MockTransport::new(vec![
            ok(INIT_PAGE),
            HttpResponse {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                body: String::new(),
            },
        ]);
        let client = translator(transport);

        match client.translate("hello").await.unwrap_err() {
            TranslationError::Transport {
                status_text,
                url,
                options,
            } => {
                assert_eq!(status_text, "Internal Server Error");
                assert!(url.contains("batchexecute"));
                assert_eq!(*options, TranslatorConfig::default());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failed_init_fetch_is_transport_error() {
        let transport = MockTransport::new(vec![HttpResponse {
            status: 429,
            status_text: "Too Many Requests".to_string(),
            body: String::new(),
        }]);
        let client = translator(transport.clone());

        let err = client.translate("hello").await.unwrap_err();
        assert!(matches!(err, TranslationError::Transport { ref status_text, .. } if status_text == "Too Many Requests"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_speak_sequence() {
        let body = batch_body(
            "jQ1olc",
            &[(json!(["SUQzBA=="]), 1), (json!(["//uQZA=="]), 0)],
        );
        let transport = MockTransport::new(vec![ok(body)]);
        let client = translator(transport.clone());

        let result = client.speak(vec!["first", "second"]).await.unwrap();
        let audio = result.into_vec();
        assert_eq!(audio[0].as_base64(), "//uQZA==");
        assert_eq!(audio[1].as_base64(), "SUQzBA==");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("rpcids=jQ1olc"));
        assert!(requests[0].url.contains("f.sid=&"));
    }

    #[tokio::test]
    async fn test_missing_record_fails_whole_batch() {
        let body = batch_body("MkEWBc", &[(translation_payload("un", "en"), 0)]);
        let transport = MockTransport::new(vec![ok(INIT_PAGE), ok(body)]);
        let client = translator(transport);

        let err = client.translate(vec!["one", "two"]).await.unwrap_err();
        assert!(matches!(err, TranslationError::MissingResult { index: 1 }));
    }

    #[tokio::test]
    async fn test_translate_with_overrides_config() {
        let body = batch_body("MkEWBc", &[(translation_payload("hola", "en"), 0)]);
        let transport = MockTransport::new(vec![ok(INIT_PAGE), ok(body)]);
        let client = translator(transport.clone());

        let config = TranslatorConfig {
            tld: "es".to_string(),
            to: "es".to_string(),
            ..Default::default()
        };
        client.translate_with("hello", &config).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://translate.google.es");
        assert!(requests[1]
            .url
            .starts_with("https://translate.google.es/_/TranslateWebserverUi/data/batchexecute?"));
    }
}
