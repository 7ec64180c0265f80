use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::common::{Handler, Request, Response};
use crate::error::Error;

use super::body::decode_json_body;
use super::response::ResponseWrapper;

/// 同期関数を包むハンドラー
pub struct FnHandler<F, T, R> {
    /// ハンドラー関数
    handler_fn: F,
    /// ボディをJSONとしてデコードするか
    decode_body: bool,
    _types: PhantomData<fn() -> (T, R)>,
}

impl<F, T, R> FnHandler<F, T, R>
where
    F: Fn(Request, Option<T>) -> Result<R, Error> + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
{
    pub fn new(handler_fn: F, decode_body: bool) -> Self {
        Self {
            handler_fn,
            decode_body,
            _types: PhantomData,
        }
    }
}

/// 非同期関数を包むハンドラー
pub struct AsyncFnHandler<F, T, R, Fut> {
    /// 非同期ハンドラー関数
    handler_fn: F,
    /// ボディをJSONとしてデコードするか
    decode_body: bool,
    _types: PhantomData<fn() -> (T, R, Fut)>,
}

impl<F, T, R, Fut> AsyncFnHandler<F, T, R, Fut>
where
    F: Fn(Request, Option<T>) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    pub fn new(handler_fn: F, decode_body: bool) -> Self {
        Self {
            handler_fn,
            decode_body,
            _types: PhantomData,
        }
    }
}

#[async_trait]
impl<F, T, R> Handler for FnHandler<F, T, R>
where
    F: Fn(Request, Option<T>) -> Result<R, Error> + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
{
    async fn handle(&self, req: Request) -> Result<Response, Error> {
        let body_data = if self.decode_body {
            decode_json_body::<T>(&req)?
        } else {
            None
        };

        (self.handler_fn)(req, body_data)?.into_response()
    }
}

#[async_trait]
impl<F, T, R, Fut> Handler for AsyncFnHandler<F, T, R, Fut>
where
    F: Fn(Request, Option<T>) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    async fn handle(&self, req: Request) -> Result<Response, Error> {
        let body_data = if self.decode_body {
            decode_json_body::<T>(&req)?
        } else {
            None
        };

        (self.handler_fn)(req, body_data).await?.into_response()
    }
}
