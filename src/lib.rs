//! TrieBridge: トライ木ルーターとノード単位のミドルウェア解決
//!
//! ルートはHTTPメソッドごとのトライ木に登録され、リクエストはセグメント単位で照合される。
//! ミドルウェアはパス上の任意のノードに登録でき、マッチしたルートに適用される
//! ミドルウェア列は幅優先探索で解決され、終端ノードにキャッシュされる。

pub mod common;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, warn};

pub use common::*;
pub use config::RouterConfig;
pub use error::*;
pub use router::{MatchResult, NotFound, Router};

/// ルート表を構築するためのビルダー
///
/// 登録エラーは蓄積され、`build()` で最初のエラーが返る。
pub struct TrieBridgeBuilder {
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
    errors: Vec<Error>,
}

impl Default for TrieBridgeBuilder {
    fn default() -> Self {
        Self {
            router: Router::new(),
            middlewares: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl TrieBridgeBuilder {
    /// 新しいTrieBridgeBuilderインスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定を指定して作成
    pub fn with_config(config: &RouterConfig) -> Self {
        let mut builder = Self::default();
        match Router::from_config(config) {
            Ok(router) => builder.router = router,
            Err(e) => {
                error!("Invalid router configuration: {}", e);
                builder.errors.push(e);
            }
        }
        builder
    }

    fn register(
        &mut self,
        method: &str,
        path: &str,
        handler: Option<Arc<dyn Handler>>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) {
        if let Err(e) = self.router.add_route(method, path, handler, middlewares) {
            error!("Failed to register {} {}: {}", method, path, e);
            self.errors.push(e);
        }
    }

    /// ハンドラーを登録
    pub fn route<H>(mut self, method: Method, path: &str, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.register(method.as_str(), path, Some(Arc::new(handler)), Vec::new());
        self
    }

    /// ハンドラーとミドルウェアを同時に登録
    pub fn route_with<H>(
        mut self,
        method: Method,
        path: &str,
        handler: H,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Self
    where
        H: Handler + 'static,
    {
        self.register(method.as_str(), path, Some(Arc::new(handler)), middlewares);
        self
    }

    pub fn get<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::GET, path, handler)
    }

    pub fn post<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::POST, path, handler)
    }

    pub fn put<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    pub fn patch<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::PATCH, path, handler)
    }

    pub fn options<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::OPTIONS, path, handler)
    }

    /// パス上のノードにミドルウェアのみを登録（ハンドラーは変更しない）
    pub fn use_middleware<M>(mut self, method: Method, path: &str, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.register(method.as_str(), path, None, vec![Arc::new(middleware)]);
        self
    }

    /// 複数のミドルウェアをまとめて登録
    pub fn use_middlewares(
        mut self,
        method: Method,
        path: &str,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        self.register(method.as_str(), path, None, middlewares);
        self
    }

    /// すべてのリクエストに適用するミドルウェアを追加
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// アプリケーションをビルドして返却
    pub fn build(self) -> Result<TrieBridge, Error> {
        let mut errors = self.errors.into_iter();
        if let Some(first) = errors.next() {
            let remaining = errors.count();
            if remaining > 0 {
                warn!("{} more registration error(s) suppressed", remaining);
            }
            return Err(first);
        }

        Ok(TrieBridge {
            router: self.router,
            middlewares: self.middlewares,
        })
    }
}

/// リクエストを処理するアプリケーション
pub struct TrieBridge {
    router: Router,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl TrieBridge {
    /// 新しいTrieBridgeBuilderインスタンスを作成
    pub fn builder() -> TrieBridgeBuilder {
        TrieBridgeBuilder::new()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// グローバルミドルウェアのリストを取得
    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    /// リクエストをルーティングしてレスポンスを返す
    ///
    /// ルートが見つからない場合は404、ハンドラーのエラーは `Response::from_error` に変換する。
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let endpoint = match self.router.match_route(req.method.as_str(), &req.path) {
            Ok(matched) => {
                let route = matched.route();
                let chain = compose(Arc::clone(matched.handler()), matched.middlewares());
                req.set_route_info(route, matched.into_params());
                chain
            }
            Err(not_found) => {
                debug!("{}", not_found);
                Arc::new(NotFoundHandler) as Arc<dyn Handler>
            }
        };

        let entry = compose(endpoint, &self.middlewares);
        match entry.handle(req).await {
            Ok(res) => res,
            Err(e) => {
                if e.status_code() >= 500 {
                    error!("Request failed: {}", e);
                } else {
                    warn!("Request rejected: {}", e);
                }
                Response::from_error(&e)
            }
        }
    }
}

#[async_trait]
impl Handler for TrieBridge {
    async fn handle(&self, req: Request) -> Result<Response, Error> {
        Ok(self.dispatch(req).await)
    }
}

/// マッチしなかったリクエストへの応答
struct NotFoundHandler;

#[async_trait]
impl Handler for NotFoundHandler {
    async fn handle(&self, _req: Request) -> Result<Response, Error> {
        Ok(Response::not_found().text("resource not found"))
    }
}
