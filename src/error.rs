//! エラー型の定義

use thiserror::Error;

/// アプリケーションのエラー型
#[derive(Error, Debug)]
pub enum Error {
    /// ルート登録パスの文法違反
    #[error("Malformed path: {0}")]
    MalformedPath(String),

    /// 同じ位置に異なるパラメータ/正規表現ノードを登録しようとした
    #[error("Conflicting registration: '{requested}' conflicts with existing '{existing}'")]
    ConflictingRegistration { existing: String, requested: String },

    /// 正規表現セグメントのコンパイル失敗
    #[error("Invalid pattern in segment '{segment}': {source}")]
    InvalidPattern {
        segment: String,
        #[source]
        source: regex::Error,
    },

    /// リクエストのルーティングエラー
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// 未登録のHTTPメソッド
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// 無効なリクエストボディ
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    /// レスポンスのシリアライズエラー
    #[error("Failed to serialize response: {0}")]
    ResponseSerializationError(String),

    /// ミドルウェアエラー
    #[error("Middleware error: {0}")]
    MiddlewareError(String),

    /// 内部サーバーエラー
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl Error {
    /// エラーからHTTPステータスコードを取得
    pub fn status_code(&self) -> u16 {
        match self {
            Error::RouteNotFound(_) | Error::MethodNotFound(_) => 404,
            Error::InvalidRequestBody(_) => 400,
            Error::MalformedPath(_)
            | Error::ConflictingRegistration { .. }
            | Error::InvalidPattern { .. } => 500,
            Error::ResponseSerializationError(_) => 500,
            Error::MiddlewareError(_) => 500,
            Error::InternalServerError(_) => 500,
            Error::ConfigurationError(_) => 500,
        }
    }

    /// ルート登録時のエラーかどうか
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedPath(_)
                | Error::ConflictingRegistration { .. }
                | Error::InvalidPattern { .. }
        )
    }
}
