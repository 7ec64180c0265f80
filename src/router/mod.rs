//! トライ木ベースのルーター
//!
//! HTTPメソッドごとに1本のツリーを持ち、パスをセグメント単位で登録・照合する。
//!
//! | 形式 | 意味 |
//! |---|---|
//! | `literal` | 完全一致 |
//! | `:name` | 名前付きパラメータ |
//! | `:name(pattern)` | 正規表現で制約されたパラメータ |
//! | `*` | ワイルドカード（後続のセグメントも貪欲に吸収） |

pub mod condition;
pub mod node;
pub mod queue;
pub mod resolver;


use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::common::{Handler, Middleware};
use crate::config::RouterConfig;
use crate::error::Error;

pub use condition::Condition;
pub use node::{Node, NodeKind, Segment};
pub use queue::Queue;
pub use resolver::MiddlewareResolver;

/// ルート照合の否定結果（エラーではなく通常の結果）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// メソッドに対するツリーが存在しない
    #[error("method not found: {0}")]
    Method(String),
    /// パスにマッチするハンドラーが存在しない
    #[error("route not found: {0}")]
    Route(String),
}

impl From<NotFound> for Error {
    fn from(not_found: NotFound) -> Self {
        match not_found {
            NotFound::Method(method) => Error::MethodNotFound(method),
            NotFound::Route(path) => Error::RouteNotFound(path),
        }
    }
}

/// ルート照合の結果
pub struct MatchResult<'a, H, M: Clone> {
    node: &'a Node<H, M>,
    handler: &'a H,
    params: HashMap<String, String>,
    middlewares: Cow<'a, [M]>,
}

impl<'a, H, M: Clone> MatchResult<'a, H, M> {
    /// マッチした終端ノード
    pub fn node(&self) -> &'a Node<H, M> {
        self.node
    }

    pub fn handler(&self) -> &'a H {
        self.handler
    }

    /// 抽出されたパスパラメータ
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.params
    }

    /// 登録時のルートパス
    pub fn route(&self) -> &'a str {
        self.node.route()
    }

    /// 適用されるミドルウェア（外側から順）
    pub fn middlewares(&self) -> &[M] {
        &self.middlewares
    }
}

/// 登録パスを検証してセグメントに分割する
///
/// `/` は空のセグメント列になる。
pub fn split_path(path: &str) -> Result<Vec<&str>, Error> {
    if path == "/" {
        return Ok(Vec::new());
    }

    let Some(rest) = path.strip_prefix('/') else {
        return Err(Error::MalformedPath(format!(
            "path '{}' must start with '/'",
            path
        )));
    };

    if path.ends_with('/') {
        return Err(Error::MalformedPath(format!(
            "path '{}' must not end with '/'",
            path
        )));
    }

    let segments: Vec<&str> = rest.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::MalformedPath(format!(
            "path '{}' must not contain consecutive '/'",
            path
        )));
    }

    Ok(segments)
}

/// メソッドごとのトライ木の集合
pub struct Router<H = Arc<dyn Handler>, M = Arc<dyn Middleware>> {
    trees: HashMap<String, Node<H, M>>,
    resolver: MiddlewareResolver,
    cache_middleware: bool,
}

impl<H, M> Default for Router<H, M> {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
            resolver: MiddlewareResolver::default(),
            cache_middleware: true,
        }
    }
}

impl<H, M: Clone> Router<H, M> {
    /// デフォルト設定でルーターを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定からルーターを作成
    pub fn from_config(config: &RouterConfig) -> Result<Self, Error> {
        let resolver = MiddlewareResolver::new(config.middleware_order.clone())?;
        Ok(Self {
            trees: HashMap::new(),
            resolver,
            cache_middleware: config.cache_middleware,
        })
    }

    /// ミドルウェアリゾルバーを差し替え
    pub fn with_resolver(mut self, resolver: MiddlewareResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &MiddlewareResolver {
        &self.resolver
    }

    /// 登録済みのメソッド一覧
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// メソッドのルートノード
    pub fn root(&self, method: &str) -> Option<&Node<H, M>> {
        self.trees.get(method)
    }

    /// ルートを登録する
    ///
    /// `handler` が `None` の場合はミドルウェアのみの登録になる。ハンドラーは
    /// 後勝ちで上書きされ、ミドルウェアは追記される。失敗した場合ツリーは変更されない。
    pub fn add_route<I>(
        &mut self,
        method: &str,
        path: &str,
        handler: Option<H>,
        middlewares: I,
    ) -> Result<(), Error>
    where
        I: IntoIterator<Item = M>,
    {
        let segments = split_path(path)?
            .into_iter()
            .map(Segment::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(root) = self.trees.get(method) {
            let mut current = Some(root);
            for segment in &segments {
                match current {
                    Some(node) => current = node.existing_child(segment)?,
                    None => break,
                }
            }
        }

        let root = self
            .trees
            .entry(method.to_string())
            .or_insert_with(Node::root);
        root.clear_resolved();

        let mut node = root;
        for segment in segments {
            node = node.child_or_insert(segment)?;
        }

        node.set_route(path);
        let has_handler = handler.is_some();
        if let Some(handler) = handler {
            if node.handler().is_some() {
                warn!("Overwriting handler for {} {}", method, path);
            }
            node.set_handler(handler);
        }

        let before = node.middlewares().len();
        node.append_middlewares(middlewares);
        let added = node.middlewares().len() - before;

        // 開発時はinfo、本番相当ではdebugに落とす
        #[cfg(debug_assertions)]
        info!(
            "Registered {} {} (handler: {}, middlewares: +{})",
            method, path, has_handler, added
        );
        #[cfg(not(debug_assertions))]
        debug!(
            "Registered {} {} (handler: {}, middlewares: +{})",
            method, path, has_handler, added
        );

        Ok(())
    }

    /// リクエストのメソッドとパスを照合する
    pub fn match_route(&self, method: &str, path: &str) -> Result<MatchResult<'_, H, M>, NotFound> {
        let root = self
            .trees
            .get(method)
            .ok_or_else(|| NotFound::Method(method.to_string()))?;

        if path == "/" {
            let handler = root
                .handler()
                .ok_or_else(|| NotFound::Route(path.to_string()))?;
            return Ok(MatchResult {
                node: root,
                handler,
                params: HashMap::new(),
                middlewares: Cow::Borrowed(root.middlewares()),
            });
        }

        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| NotFound::Route(path.to_string()))?;
        let segments: Vec<&str> = rest.split('/').collect();

        let mut params = HashMap::new();
        let mut current = root;
        for segment in &segments {
            let (next, binds) = current.next(segment).ok_or_else(|| {
                debug!("No route for {} {} at segment '{}'", method, path, segment);
                NotFound::Route(path.to_string())
            })?;
            if binds {
                if let Some(name) = next.param_name() {
                    params.insert(name.to_string(), segment.to_string());
                }
            }
            current = next;
        }

        let Some(handler) = current.handler() else {
            debug!("Matched waypoint without handler: {} {}", method, path);
            return Err(NotFound::Route(path.to_string()));
        };

        let middlewares = if self.cache_middleware {
            Cow::Borrowed(
                current
                    .resolved()
                    .get_or_init(|| self.resolver.resolve(root, &segments))
                    .as_slice(),
            )
        } else {
            Cow::Owned(self.resolver.resolve(root, &segments))
        };

        debug!(
            "Matched {} {} -> {} ({} params)",
            method,
            path,
            current.route(),
            params.len()
        );

        Ok(MatchResult {
            node: current,
            handler,
            params,
            middlewares,
        })
    }
}
