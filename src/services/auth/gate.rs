/*
 * Responsibility
 * - Authorization ヘッダの credential 抽出 → scheme A → scheme B → 失敗 の順で判定
 * - 判定結果を 1 リクエストにつき 1 行だけログに残す
 * - 成功時のみ next を呼ぶ (request はそのまま渡す)
 */
use std::borrow::Cow;
use std::future::Future;

use axum::http::{HeaderMap, Request, header};

use crate::context::{ResourceDetail, TxContext};

use super::error::{AuthError, RESOURCE_DETAIL};
use super::scheme::{CredentialScheme, PrefixScheme, SchemeKind};

/// Call-path label attached to the outcome log line.
pub const TX_PATH: &str = "AuthGate.filter";

const MSG_SUCCESS: &str = "Authentication successful.";
const MSG_FAILURE: &str = "Authentication failed.";

/// Successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proceed {
    pub scheme: SchemeKind,
}

/// Stateless request gate. Schemes are tried in order; first match wins.
#[derive(Debug)]
pub struct AuthGate {
    schemes: Vec<Box<dyn CredentialScheme>>,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PrefixScheme::primary()),
            Box::new(PrefixScheme::ott()),
        ])
    }
}

impl AuthGate {
    pub fn new(schemes: Vec<Box<dyn CredentialScheme>>) -> Self {
        Self { schemes }
    }

    /// Primary then OTT, with caller-supplied prefixes.
    pub fn with_prefixes(primary: impl Into<String>, ott: impl Into<String>) -> Self {
        Self::new(vec![
            Box::new(PrefixScheme::new(SchemeKind::Primary, primary.into())),
            Box::new(PrefixScheme::new(SchemeKind::Ott, ott.into())),
        ])
    }

    /// Runs the gate and, if the credential is accepted, hands the untouched
    /// request to `next`. On failure `next` is dropped without being called.
    pub async fn filter<B, F, Fut, R>(
        &self,
        tx: &TxContext,
        req: Request<B>,
        next: F,
    ) -> Result<R, AuthError>
    where
        F: FnOnce(Request<B>) -> Fut,
        Fut: Future<Output = R>,
    {
        tracing::info!(tx_id = %tx.tx_id(), "[AuthGate was called] {tx}");

        let Some(resource) = req.extensions().get::<ResourceDetail>() else {
            // upstream の route 設定漏れ。デフォルト値で埋めない
            tracing::error!(tx_id = %tx.tx_id(), attribute = RESOURCE_DETAIL, "request attribute not attached");
            return Err(AuthError::MissingAttribute {
                name: RESOURCE_DETAIL,
            });
        };
        tracing::debug!(tx_id = %tx.tx_id(), resource = %resource, "resource detail");

        let headers = req.headers();
        let outcome = self.authenticate(headers).await;
        log_outcome(tx, &outcome);
        outcome?;

        Ok(next(req).await)
    }

    /// Classification only: extract, then walk the scheme list.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Proceed, AuthError> {
        let credential = extract_credential(headers).await?;

        self.classify(&credential)
            .await
            .map(|scheme| Proceed { scheme })
            .ok_or(AuthError::Unauthorized)
    }

    async fn classify(&self, credential: &str) -> Option<SchemeKind> {
        for scheme in &self.schemes {
            if scheme.recognizes(credential).await {
                return Some(scheme.kind());
            }
        }
        None
    }
}

/// First `Authorization` value; absent or all-whitespace counts as missing.
///
/// Works on raw bytes: obs-text (>= 0x80) is still a credential, decoded lossily
/// so the ASCII prefix survives.
async fn extract_credential(headers: &HeaderMap) -> Result<Cow<'_, str>, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .map(|v| v.as_bytes())
        .filter(|bytes| !bytes.trim_ascii().is_empty())
        .map(String::from_utf8_lossy)
        .ok_or_else(AuthError::missing_authorization)
}

fn log_outcome(tx: &TxContext, outcome: &Result<Proceed, AuthError>) {
    match outcome {
        Ok(proceed) => tracing::info!(
            tx_id = %tx.tx_id(),
            tx_path = TX_PATH,
            scheme = %proceed.scheme,
            "{MSG_SUCCESS}"
        ),
        Err(err) => tracing::warn!(
            tx_id = %tx.tx_id(),
            tx_path = TX_PATH,
            code = err.code(),
            "{MSG_FAILURE}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::http::{HeaderValue, Method};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::services::auth::error::{REST_400002, REST_401001};

    /// Captures the message of every event tagged with `tx_path = TX_PATH`.
    #[derive(Clone, Default)]
    struct OutcomeLines(Arc<Mutex<Vec<String>>>);

    impl OutcomeLines {
        fn taken(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct OutcomeVisitor {
        tx_path: Option<String>,
        message: Option<String>,
    }

    impl Visit for OutcomeVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "tx_path" {
                self.tx_path = Some(value.to_owned());
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for OutcomeLines {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = OutcomeVisitor::default();
            event.record(&mut visitor);
            if visitor.tx_path.as_deref() == Some(TX_PATH) {
                self.0
                    .lock()
                    .unwrap()
                    .push(visitor.message.unwrap_or_default());
            }
        }
    }

    /// Wraps a scheme and counts how often it was asked.
    #[derive(Debug)]
    struct Counting {
        inner: PrefixScheme,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CredentialScheme for Counting {
        fn kind(&self) -> SchemeKind {
            self.inner.kind()
        }

        async fn recognizes(&self, credential: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.recognizes(credential).await
        }
    }

    fn request(authorization: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/api/v1/greetings");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ResourceDetail::new(Method::GET, "/api/v1/greetings"));
        req
    }

    fn tx() -> TxContext {
        TxContext::new("tx-test-1")
    }

    /// Runs the gate with a `next` that echoes the request back, returning
    /// the result and how many times `next` ran.
    async fn run(gate: &AuthGate, req: Request<()>) -> (Result<Request<()>, AuthError>, usize) {
        let calls = Cell::new(0);
        let result = gate
            .filter(&tx(), req, |req| {
                calls.set(calls.get() + 1);
                async move { req }
            })
            .await;
        (result, calls.get())
    }

    #[tokio::test]
    async fn primary_token_is_forwarded_once_unchanged() {
        let gate = AuthGate::default();

        let (result, calls) = run(&gate, request(Some("abc123"))).await;

        assert_eq!(calls, 1);
        let forwarded = result.unwrap();
        assert_eq!(
            forwarded.headers().get(header::AUTHORIZATION),
            Some(&HeaderValue::from_static("abc123"))
        );
        assert_eq!(forwarded.uri(), "/api/v1/greetings");
        assert!(forwarded.extensions().get::<ResourceDetail>().is_some());
    }

    #[tokio::test]
    async fn ott_token_is_forwarded_once() {
        let gate = AuthGate::default();

        let (result, calls) = run(&gate, request(Some("ottXYZ"))).await;

        assert!(result.is_ok());
        assert_eq!(calls, 1);
        assert_eq!(
            gate.authenticate(request(Some("ottXYZ")).headers())
                .await
                .unwrap()
                .scheme,
            SchemeKind::Ott
        );
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let gate = AuthGate::default();

        let (result, calls) = run(&gate, request(Some("xyz"))).await;

        let err = result.unwrap_err();
        assert_eq!(err, AuthError::Unauthorized);
        assert_eq!(err.code(), REST_401001);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_rejected_before_classification() {
        let gate = AuthGate::default();

        for req in [request(None), request(Some("")), request(Some("   \t "))] {
            let (result, calls) = run(&gate, req).await;

            let err = result.unwrap_err();
            assert_eq!(err.code(), REST_400002);
            assert!(err.to_string().contains("Authorization"));
            assert_eq!(calls, 0);
        }
    }

    #[tokio::test]
    async fn non_ascii_bytes_do_not_hide_a_present_credential() {
        let gate = AuthGate::default();
        let with_value = |bytes: &'static [u8]| {
            let mut req = request(None);
            req.headers_mut().insert(
                header::AUTHORIZATION,
                HeaderValue::from_bytes(bytes).unwrap(),
            );
            req
        };

        let accepted = gate
            .authenticate(with_value(b"abc\xe9123").headers())
            .await
            .unwrap();
        assert_eq!(accepted.scheme, SchemeKind::Primary);

        let (result, calls) = run(&gate, with_value(b"ott\xe9")).await;
        assert!(result.is_ok());
        assert_eq!(calls, 1);

        let rejected = gate
            .authenticate(with_value(b"xyz\xe9").headers())
            .await
            .unwrap_err();
        assert_eq!(rejected.code(), REST_401001);
    }

    #[tokio::test]
    async fn only_first_authorization_value_is_considered() {
        let gate = AuthGate::default();
        let mut req = request(Some("xyz"));
        req.headers_mut()
            .append(header::AUTHORIZATION, HeaderValue::from_static("abc123"));

        let (result, calls) = run(&gate, req).await;

        assert_eq!(result.unwrap_err(), AuthError::Unauthorized);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn primary_wins_when_both_prefixes_match() {
        let gate = AuthGate::with_prefixes("ab", "a");

        let proceed = gate
            .authenticate(request(Some("abc")).headers())
            .await
            .unwrap();

        assert_eq!(proceed.scheme, SchemeKind::Primary);
    }

    #[tokio::test]
    async fn ott_is_not_evaluated_after_primary_match() {
        let primary_calls = Arc::new(AtomicUsize::new(0));
        let ott_calls = Arc::new(AtomicUsize::new(0));
        let gate = AuthGate::new(vec![
            Box::new(Counting {
                inner: PrefixScheme::primary(),
                calls: primary_calls.clone(),
            }),
            Box::new(Counting {
                inner: PrefixScheme::ott(),
                calls: ott_calls.clone(),
            }),
        ]);

        gate.authenticate(request(Some("abc123")).headers())
            .await
            .unwrap();
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ott_calls.load(Ordering::SeqCst), 0);

        gate.authenticate(request(Some("ott1")).headers())
            .await
            .unwrap();
        assert_eq!(primary_calls.load(Ordering::SeqCst), 2);
        assert_eq!(ott_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_resource_detail_fails_without_calling_next() {
        let gate = AuthGate::default();
        let req = Request::builder()
            .header(header::AUTHORIZATION, "abc123")
            .body(())
            .unwrap();

        let (result, calls) = run(&gate, req).await;

        assert_eq!(
            result.unwrap_err(),
            AuthError::MissingAttribute {
                name: RESOURCE_DETAIL
            }
        );
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn exactly_one_outcome_line_per_request() {
        let lines = OutcomeLines::default();
        let subscriber = tracing_subscriber::registry().with(lines.clone());
        let _guard = tracing::subscriber::set_default(subscriber);
        let gate = AuthGate::default();

        let cases = [
            (Some("abc123"), MSG_SUCCESS),
            (Some("ottXYZ"), MSG_SUCCESS),
            (Some("xyz"), MSG_FAILURE),
            (None, MSG_FAILURE),
            (Some(" "), MSG_FAILURE),
        ];

        for (i, (authorization, expected)) in cases.into_iter().enumerate() {
            let _ = run(&gate, request(authorization)).await;

            let captured = lines.taken();
            assert_eq!(captured.len(), i + 1, "case {authorization:?}");
            assert_eq!(captured[i], expected);
        }
    }

    #[tokio::test]
    async fn repeated_classification_is_stable() {
        let gate = AuthGate::default();

        for value in ["abc123", "ottXYZ", "xyz", ""] {
            let req = request(Some(value));
            let first = gate.authenticate(req.headers()).await;
            let second = gate.authenticate(req.headers()).await;
            assert_eq!(first, second, "value {value:?}");
        }
    }
}
