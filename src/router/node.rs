//! ルーティングツリーのノードとセグメント分類

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::Error;

/// 登録パスの1セグメントを分類したもの
#[derive(Debug, Clone)]
pub enum Segment {
    /// 完全一致
    Literal(String),
    /// `:name`
    Param { text: String, name: String },
    /// `:name(pattern)`
    Regex {
        text: String,
        name: String,
        regex: Regex,
    },
    /// `*`
    Wildcard,
}

impl Segment {
    /// セグメント文字列を分類する
    ///
    /// `:name(pattern)` の名前は最初の `(` まで、パターンはその `(` から末尾の `)` の手前まで。
    pub fn parse(text: &str) -> Result<Self, Error> {
        if text.is_empty() {
            return Err(Error::MalformedPath("empty segment".to_string()));
        }

        if text == "*" {
            return Ok(Segment::Wildcard);
        }

        let Some(rest) = text.strip_prefix(':') else {
            return Ok(Segment::Literal(text.to_string()));
        };

        if let (Some(open), true) = (rest.find('('), rest.ends_with(')')) {
            let name = &rest[..open];
            let pattern = &rest[open + 1..rest.len() - 1];
            if name.is_empty() || pattern.is_empty() {
                return Err(Error::MalformedPath(format!(
                    "regex segment '{}' needs both a name and a pattern",
                    text
                )));
            }
            let regex = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
                segment: text.to_string(),
                source,
            })?;
            return Ok(Segment::Regex {
                text: text.to_string(),
                name: name.to_string(),
                regex,
            });
        }

        if rest.is_empty() {
            return Err(Error::MalformedPath(format!(
                "parameter segment '{}' has no name",
                text
            )));
        }

        Ok(Segment::Param {
            text: text.to_string(),
            name: rest.to_string(),
        })
    }

    /// 登録時の元の文字列
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(text) => text,
            Segment::Param { text, .. } | Segment::Regex { text, .. } => text,
            Segment::Wildcard => "*",
        }
    }
}

/// ノードの種別
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Literal,
    Param { name: String },
    Regex { name: String, regex: Regex },
    Wildcard,
}

/// ルーティングツリーのノード
///
/// 子ノードは親が排他的に所有する。`resolved` は終端ノードに適用される
/// ミドルウェア列の遅延キャッシュ。
pub struct Node<H, M> {
    segment: String,
    kind: NodeKind,
    static_children: HashMap<String, Node<H, M>>,
    param_child: Option<Box<Node<H, M>>>,
    regex_child: Option<Box<Node<H, M>>>,
    wildcard_child: Option<Box<Node<H, M>>>,
    handler: Option<H>,
    middlewares: Vec<M>,
    resolved: OnceLock<Vec<M>>,
    route: String,
}

impl<H, M> Node<H, M> {
    /// メソッドごとのルートノードを作成
    pub(crate) fn root() -> Self {
        Self::with_kind("/".to_string(), NodeKind::Root)
    }

    fn with_kind(segment: String, kind: NodeKind) -> Self {
        Self {
            segment,
            kind,
            static_children: HashMap::new(),
            param_child: None,
            regex_child: None,
            wildcard_child: None,
            handler: None,
            middlewares: Vec::new(),
            resolved: OnceLock::new(),
            route: String::new(),
        }
    }

    fn from_segment(segment: Segment) -> Self {
        match segment {
            Segment::Literal(text) => Self::with_kind(text, NodeKind::Literal),
            Segment::Param { text, name } => Self::with_kind(text, NodeKind::Param { name }),
            Segment::Regex { text, name, regex } => {
                Self::with_kind(text, NodeKind::Regex { name, regex })
            }
            Segment::Wildcard => Self::with_kind("*".to_string(), NodeKind::Wildcard),
        }
    }

    /// 登録時のセグメント文字列
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// 登録された元のルートパス（未登録の中継ノードでは空）
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// このノードに直接登録されたミドルウェア
    pub fn middlewares(&self) -> &[M] {
        &self.middlewares
    }

    /// パラメータ名（パラメータ/正規表現ノードのみ）
    pub fn param_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Param { name } | NodeKind::Regex { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, NodeKind::Wildcard)
    }

    /// 正規表現ノードの場合、セグメントがパターンに一致するか
    pub fn is_match(&self, segment: &str) -> bool {
        match &self.kind {
            NodeKind::Regex { regex, .. } => regex.is_match(segment),
            _ => false,
        }
    }

    pub(crate) fn static_child(&self, segment: &str) -> Option<&Node<H, M>> {
        self.static_children.get(segment)
    }

    pub(crate) fn param_child(&self) -> Option<&Node<H, M>> {
        self.param_child.as_deref()
    }

    pub(crate) fn regex_child(&self) -> Option<&Node<H, M>> {
        self.regex_child.as_deref()
    }

    pub(crate) fn wildcard_child(&self) -> Option<&Node<H, M>> {
        self.wildcard_child.as_deref()
    }

    pub(crate) fn resolved(&self) -> &OnceLock<Vec<M>> {
        &self.resolved
    }

    pub(crate) fn set_handler(&mut self, handler: H) {
        self.handler = Some(handler);
    }

    pub(crate) fn set_route(&mut self, route: &str) {
        self.route = route.to_string();
    }

    pub(crate) fn append_middlewares<I: IntoIterator<Item = M>>(&mut self, middlewares: I) {
        self.middlewares.extend(middlewares);
    }

    /// 配下すべてのミドルウェアキャッシュを破棄
    pub(crate) fn clear_resolved(&mut self) {
        self.resolved = OnceLock::new();
        for child in self.static_children.values_mut() {
            child.clear_resolved();
        }
        for child in [
            self.param_child.as_deref_mut(),
            self.regex_child.as_deref_mut(),
            self.wildcard_child.as_deref_mut(),
        ]
        .into_iter()
        .flatten()
        {
            child.clear_resolved();
        }
    }

    /// 既存の子ノードを参照する（変更なし）
    ///
    /// 存在しなければ `Ok(None)`、同じ位置に異なる名前/パターンがあれば競合エラー。
    pub(crate) fn existing_child(&self, segment: &Segment) -> Result<Option<&Node<H, M>>, Error> {
        let slot = match segment {
            Segment::Literal(text) => return Ok(self.static_children.get(text)),
            Segment::Wildcard => return Ok(self.wildcard_child.as_deref()),
            Segment::Param { .. } => self.param_child.as_deref(),
            Segment::Regex { .. } => self.regex_child.as_deref(),
        };

        match slot {
            Some(child) if child.segment != segment.as_str() => {
                Err(Error::ConflictingRegistration {
                    existing: child.segment.clone(),
                    requested: segment.as_str().to_string(),
                })
            }
            other => Ok(other),
        }
    }

    /// 子ノードを取得し、存在しなければ作成する
    pub(crate) fn child_or_insert(&mut self, segment: Segment) -> Result<&mut Node<H, M>, Error> {
        self.existing_child(&segment)?;

        let child = match segment {
            Segment::Literal(ref text) => {
                if !self.static_children.contains_key(text) {
                    debug!("Creating literal node '{}' under '{}'", text, self.segment);
                }
                let key = text.clone();
                return Ok(self
                    .static_children
                    .entry(key)
                    .or_insert_with(|| Node::from_segment(segment)));
            }
            Segment::Param { .. } => &mut self.param_child,
            Segment::Regex { .. } => &mut self.regex_child,
            Segment::Wildcard => &mut self.wildcard_child,
        };

        let child = child.get_or_insert_with(|| Box::new(Node::from_segment(segment)));
        Ok(child.as_mut())
    }

    /// リクエストセグメントに対して次に進むノードを選択する
    ///
    /// 優先順位: 完全一致 > 正規表現 > パラメータ > ワイルドカード > ワイルドカード自身。
    /// 2番目の値はパラメータとして値を束縛すべきかどうか。
    pub(crate) fn next(&self, segment: &str) -> Option<(&Node<H, M>, bool)> {
        if let Some(child) = self.static_children.get(segment) {
            return Some((child, false));
        }

        if let Some(child) = self.regex_child.as_deref() {
            if child.is_match(segment) {
                return Some((child, true));
            }
        }

        if let Some(child) = self.param_child.as_deref() {
            return Some((child, true));
        }

        if let Some(child) = self.wildcard_child.as_deref() {
            return Some((child, false));
        }

        if self.is_wildcard() {
            return Some((self, false));
        }

        None
    }
}

impl<H, M> fmt::Debug for Node<H, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut literals: Vec<&String> = self.static_children.keys().collect();
        literals.sort();
        f.debug_struct("Node")
            .field("segment", &self.segment)
            .field("route", &self.route)
            .field("has_handler", &self.handler.is_some())
            .field("middlewares", &self.middlewares.len())
            .field("literals", &literals)
            .field("param", &self.param_child.as_ref().map(|c| &c.segment))
            .field("regex", &self.regex_child.as_ref().map(|c| &c.segment))
            .field("wildcard", &self.wildcard_child.is_some())
            .finish()
    }
}
