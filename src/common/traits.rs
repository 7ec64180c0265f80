//! コアトレイト定義（Handler、Middleware）

use std::sync::Arc;

use async_trait::async_trait;

use super::http::{Request, Response};
use crate::error::Error;

/// ハンドラーの特性
///
/// ルーターに登録される終端処理。リクエストごとに1回呼ばれる。
#[async_trait]
pub trait Handler: Send + Sync {
    /// リクエストを処理
    async fn handle(&self, req: Request) -> Result<Response, Error>;
}

/// ミドルウェアの特性
///
/// ハンドラーを受け取り、それを包んだ新しいハンドラーを返す。
pub trait Middleware: Send + Sync {
    /// `next` を包んだハンドラーを返す
    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

/// ミドルウェア列でハンドラーを包む
///
/// 先頭のミドルウェアが最も外側になる。
pub fn compose(handler: Arc<dyn Handler>, middlewares: &[Arc<dyn Middleware>]) -> Arc<dyn Handler> {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware.wrap(next))
}
