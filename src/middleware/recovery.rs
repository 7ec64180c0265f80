//! パニックからの復帰ミドルウェア

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use log::error;

use crate::common::{Handler, Middleware, Request, Response};
use crate::error::Error;

/// ハンドラーのパニックを捕捉し、固定のレスポンスを返すミドルウェア
#[derive(Debug, Clone)]
pub struct RecoveryMiddleware {
    status: u16,
    message: String,
}

impl Default for RecoveryMiddleware {
    fn default() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

impl RecoveryMiddleware {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl Middleware for RecoveryMiddleware {
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(RecoveryHandler {
            status: self.status,
            message: self.message.clone(),
            next,
        })
    }
}

struct RecoveryHandler {
    status: u16,
    message: String,
    next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for RecoveryHandler {
    async fn handle(&self, req: Request) -> Result<Response, Error> {
        let method = req.method;
        let path = req.path.clone();

        match AssertUnwindSafe(self.next.handle(req)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                error!(
                    "Recovered from panic in {} {}: {}",
                    method,
                    path,
                    panic_message(panic.as_ref())
                );
                Ok(Response::new(self.status).text(self.message.clone()))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
