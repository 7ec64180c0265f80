//! 共通の抽象化レイヤーとトレイト定義

pub mod http;
pub mod traits;

pub use http::{Method, Request, Response, ResponseBuilder, StatusCode};
pub use traits::{compose, Handler, Middleware};
