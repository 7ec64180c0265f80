use serde::Serialize;

use crate::common::{Response, StatusCode};
use crate::error::Error;

/// レスポンス変換トレイト
pub trait ResponseWrapper {
    /// 自身をResponseに変換
    fn into_response(self) -> Result<Response, Error>;
}

/// シリアライズ可能なデータは200のJSONレスポンスになる
impl<T: Serialize> ResponseWrapper for T {
    fn into_response(self) -> Result<Response, Error> {
        Response::ok().json(&self)
    }
}

/// Responseはそのまま返す
impl ResponseWrapper for Response {
    fn into_response(self) -> Result<Response, Error> {
        Ok(self)
    }
}

/// ステータスのみ（ボディなし）
impl ResponseWrapper for StatusCode {
    fn into_response(self) -> Result<Response, Error> {
        Ok(Response::with_status(self))
    }
}
