//! ミドルウェアの実装
//!
//! - [`from_fn`]: クロージャからミドルウェアを作成
//! - [`AccessLogMiddleware`]: リクエストごとにアクセスログを出力
//! - [`RecoveryMiddleware`]: ハンドラー内のパニックをレスポンスに変換

pub mod access_log;
pub mod recovery;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{Handler, Middleware, Request, Response};
use crate::error::Error;

pub use access_log::{AccessLog, AccessLogMiddleware};
pub use recovery::RecoveryMiddleware;

/// チェーン内の次のハンドラー
pub type Next = Arc<dyn Handler>;

/// クロージャで定義するミドルウェア
pub struct FnMiddleware<F, Fut> {
    f: Arc<F>,
    _future: PhantomData<fn() -> Fut>,
}

/// `|req, next| async move { next.handle(req).await }` 形式のクロージャからミドルウェアを作成
pub fn from_fn<F, Fut>(f: F) -> FnMiddleware<F, Fut>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    FnMiddleware {
        f: Arc::new(f),
        _future: PhantomData,
    }
}

impl<F, Fut> Middleware for FnMiddleware<F, Fut>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(FnMiddlewareHandler {
            f: Arc::clone(&self.f),
            next,
            _future: PhantomData::<fn() -> Fut>,
        })
    }
}

struct FnMiddlewareHandler<F, Fut> {
    f: Arc<F>,
    next: Next,
    _future: PhantomData<fn() -> Fut>,
}

#[async_trait]
impl<F, Fut> Handler for FnMiddlewareHandler<F, Fut>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    async fn handle(&self, req: Request) -> Result<Response, Error> {
        (self.f)(req, Arc::clone(&self.next)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{compose, Method};
    use crate::handler;

    #[tokio::test]
    async fn test_from_fn_wraps_in_order() {
        let tag = |name: &'static str| {
            Arc::new(from_fn(move |req: Request, next: Next| async move {
                let res = next.handle(req).await?;
                let trail = res
                    .headers
                    .get("X-Trail")
                    .cloned()
                    .unwrap_or_default();
                Ok::<Response, Error>(res.with_header("X-Trail", format!("{}{}", trail, name)))
            })) as Arc<dyn Middleware>
        };

        let endpoint: Arc<dyn Handler> = Arc::new(handler::from_fn(|_req| Ok(Response::ok())));
        let chain = compose(endpoint, &[tag("a"), tag("b"), tag("c")]);

        let res = chain.handle(Request::new(Method::GET, "/")).await.unwrap();
        // 内側から順に戻るので、最も外側の "a" が最後に追記される
        assert_eq!(res.headers.get("X-Trail"), Some(&"cba".to_string()));
    }

    #[tokio::test]
    async fn test_from_fn_can_short_circuit() {
        let guard = from_fn(|req: Request, next: Next| async move {
            match req.header("x-auth-token") {
                Some("secret-token") => next.handle(req).await,
                _ => Err(Error::MiddlewareError("unauthorized".to_string())),
            }
        });
        let endpoint: Arc<dyn Handler> = Arc::new(handler::from_fn(|_req| Ok(Response::ok())));
        let chain = guard.wrap(endpoint);

        let denied = chain.handle(Request::new(Method::GET, "/")).await;
        assert!(matches!(denied, Err(Error::MiddlewareError(_))));

        let allowed = chain
            .handle(Request::new(Method::GET, "/").with_header("X-Auth-Token", "secret-token"))
            .await
            .unwrap();
        assert_eq!(allowed.status, 200);
    }
}
