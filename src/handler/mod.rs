//! 関数をハンドラーに変換するアダプタ

pub mod response;
pub mod body;
pub mod core;
pub mod builders;

pub use response::ResponseWrapper;
pub use core::{AsyncFnHandler, FnHandler};
pub use builders::{from_async_fn, from_fn, json_async_fn, json_fn};

#[cfg(test)]
mod tests;
