use std::future::Future;

use futures::future::{self, Ready};
use serde::de::DeserializeOwned;

use crate::common::{Handler, Request};
use crate::error::Error;

use super::core::{AsyncFnHandler, FnHandler};
use super::response::ResponseWrapper;

// 可読性のための型エイリアス（ボディ必須の非同期ハンドラー）
pub type BodyOrError<Fut, R> = future::Either<Ready<Result<R, Error>>, Fut>;

// 同期: Option<T> から T を要求し、なければエラーにする薄いアダプタ
fn require_body_sync<F, T, R>(handler: F) -> impl Fn(Request, Option<T>) -> Result<R, Error> + Send + Sync + 'static
where
    F: Fn(Request, T) -> Result<R, Error> + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
{
    move |req, body_data| {
        if let Some(data) = body_data {
            handler(req, data)
        } else {
            Err(Error::InvalidRequestBody("Missing request body".to_string()))
        }
    }
}

// 非同期: Option<T> から T を要求し、なければ即時エラーfutureを返すアダプタ
fn require_body_async<F, T, R, Fut>(handler: F) -> impl Fn(Request, Option<T>) -> BodyOrError<Fut, R> + Send + Sync + 'static
where
    F: Fn(Request, T) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    move |req, body_data| {
        if let Some(data) = body_data {
            future::Either::Right(handler(req, data))
        } else {
            future::Either::Left(future::ready(Err(Error::InvalidRequestBody(
                "Missing request body".to_string(),
            ))))
        }
    }
}

/// 同期関数からハンドラーを作成（ボディは読まない）
pub fn from_fn<F, R>(handler: F) -> impl Handler
where
    F: Fn(Request) -> Result<R, Error> + Send + Sync + 'static,
    R: ResponseWrapper + Send + 'static,
{
    FnHandler::<_, (), R>::new(move |req, _| handler(req), false)
}

/// 非同期関数からハンドラーを作成（ボディは読まない）
pub fn from_async_fn<F, R, Fut>(handler: F) -> impl Handler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    R: ResponseWrapper + Send + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    AsyncFnHandler::<_, (), R, Fut>::new(move |req, _| handler(req), false)
}

/// JSONボディ必須の同期ハンドラーを作成
pub fn json_fn<F, T, R>(handler: F) -> impl Handler
where
    F: Fn(Request, T) -> Result<R, Error> + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
{
    FnHandler::new(require_body_sync(handler), true)
}

/// JSONボディ必須の非同期ハンドラーを作成
pub fn json_async_fn<F, T, R, Fut>(handler: F) -> impl Handler
where
    F: Fn(Request, T) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: ResponseWrapper + Send + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    AsyncFnHandler::new(require_body_async(handler), true)
}
