//! アクセスログミドルウェア

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

use crate::common::{Handler, Middleware, Request, Response};
use crate::error::Error;

/// 1リクエスト分のアクセスログ
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccessLog {
    pub timestamp: String,
    pub host: Option<String>,
    pub method: String,
    pub path: String,
    pub matched_route: Option<String>,
    pub status: u16,
    pub elapsed_ms: u128,
}

type Sink = Arc<dyn Fn(&AccessLog) + Send + Sync>;

/// アクセスログを出力するミドルウェア
///
/// デフォルトではJSON 1行を `log::info!` で出力する。
#[derive(Clone)]
pub struct AccessLogMiddleware {
    sink: Sink,
}

impl Default for AccessLogMiddleware {
    fn default() -> Self {
        Self {
            sink: Arc::new(|entry: &AccessLog| match serde_json::to_string(entry) {
                Ok(line) => info!("{}", line),
                Err(e) => warn!("Failed to serialize access log: {}", e),
            }),
        }
    }
}

impl AccessLogMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力先を差し替え
    pub fn with_sink<F>(sink: F) -> Self
    where
        F: Fn(&AccessLog) + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }
}

impl Middleware for AccessLogMiddleware {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(AccessLogHandler {
            sink: Arc::clone(&self.sink),
            next,
        })
    }
}

struct AccessLogHandler {
    sink: Sink,
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for AccessLogHandler {
    async fn handle(&self, req: Request) -> Result<Response, Error> {
        let started = Instant::now();
        let host = req.header("host").map(str::to_string);
        let method = req.method.to_string();
        let path = req.path.clone();
        let matched_route = req.matched_route().map(str::to_string);

        let result = self.next.handle(req).await;

        let status = match &result {
            Ok(res) => res.status,
            Err(e) => e.status_code(),
        };
        let entry = AccessLog {
            timestamp: Utc::now().to_rfc3339(),
            host,
            method,
            path,
            matched_route,
            status,
            elapsed_ms: started.elapsed().as_millis(),
        };
        (self.sink)(&entry);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::common::Method;
    use crate::handler;

    #[tokio::test]
    async fn test_access_log_records_request() {
        let records: Arc<Mutex<Vec<AccessLog>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&records);
        let middleware = AccessLogMiddleware::with_sink(move |entry| {
            captured.lock().unwrap().push(entry.clone());
        });

        let endpoint: Arc<dyn Handler> =
            Arc::new(handler::from_fn(|_req| Ok(Response::new(201))));
        let chain = middleware.wrap(endpoint);

        let mut req = Request::new(Method::POST, "/order/detail/42").with_header("Host", "example.com");
        let mut params = HashMap::new();
        params.insert("id".to_string(), "42".to_string());
        req.set_route_info("/order/detail/:id", params);

        let res = chain.handle(req).await.unwrap();
        assert_eq!(res.status, 201);

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let entry = &records[0];
        assert_eq!(entry.host.as_deref(), Some("example.com"));
        assert_eq!(entry.method, "POST");
        assert_eq!(entry.path, "/order/detail/42");
        assert_eq!(entry.matched_route.as_deref(), Some("/order/detail/:id"));
        assert_eq!(entry.status, 201);
    }

    #[tokio::test]
    async fn test_access_log_records_error_status() {
        let statuses: Arc<Mutex<Vec<u16>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&statuses);
        let middleware = AccessLogMiddleware::with_sink(move |entry| {
            captured.lock().unwrap().push(entry.status);
        });

        let endpoint: Arc<dyn Handler> = Arc::new(handler::from_fn(|_req| -> Result<Response, Error> {
            Err(Error::InvalidRequestBody("bad".to_string()))
        }));
        let result = middleware.wrap(endpoint).handle(Request::new(Method::GET, "/")).await;

        assert!(result.is_err());
        assert_eq!(*statuses.lock().unwrap(), vec![400]);
    }
}
