//! ミドルウェア解決時に各ノードへ適用するマッチ条件

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

use super::node::Node;

/// 1種類のセグメントマッチを試みる条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// 完全一致の子ノード
    Literal,
    /// パラメータ子ノード（無条件）
    Param,
    /// 正規表現子ノード（セグメントがパターンに一致する場合のみ）
    Regex,
    /// ワイルドカード子ノード（無条件）
    Wildcard,
}

impl Condition {
    /// ミドルウェア解決のデフォルト順序
    pub const RESOLUTION_ORDER: [Condition; 4] = [
        Condition::Literal,
        Condition::Param,
        Condition::Regex,
        Condition::Wildcard,
    ];

    /// ルートマッチング時の優先順位と同じ順序
    pub const MATCH_PRIORITY: [Condition; 4] = [
        Condition::Literal,
        Condition::Regex,
        Condition::Param,
        Condition::Wildcard,
    ];

    /// `node` の子のうち、この条件で `segment` にマッチするものを返す
    pub fn apply<'a, H, M>(&self, node: &'a Node<H, M>, segment: &str) -> Option<&'a Node<H, M>> {
        match self {
            Condition::Literal => node.static_child(segment),
            Condition::Param => node.param_child(),
            Condition::Regex => node.regex_child().filter(|child| child.is_match(segment)),
            Condition::Wildcard => node.wildcard_child(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Literal => "literal",
            Condition::Param => "param",
            Condition::Regex => "regex",
            Condition::Wildcard => "wildcard",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" | "static" => Ok(Condition::Literal),
            "param" => Ok(Condition::Param),
            "regex" => Ok(Condition::Regex),
            "wildcard" | "*" => Ok(Condition::Wildcard),
            other => Err(Error::ConfigurationError(format!(
                "Unknown match condition: '{}'",
                other
            ))),
        }
    }
}

/// カンマ区切りの条件リストをパース
pub fn parse_conditions(list: &str) -> Result<Vec<Condition>, Error> {
    list.split(',')
        .filter(|item| !item.trim().is_empty())
        .map(Condition::from_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::node::Segment;

    #[test]
    fn test_parse_conditions() {
        let parsed = parse_conditions("literal, regex,param ,wildcard").unwrap();
        assert_eq!(parsed, Condition::MATCH_PRIORITY.to_vec());
        assert!(parse_conditions("literal,bogus").is_err());
        assert!(parse_conditions("").unwrap().is_empty());
    }

    #[test]
    fn test_apply_each_condition() {
        let mut root: Node<(), ()> = Node::root();
        for seg in ["user", ":id", ":num(^[0-9]+$)", "*"] {
            root.child_or_insert(Segment::parse(seg).unwrap()).unwrap();
        }

        assert_eq!(
            Condition::Literal.apply(&root, "user").map(|n| n.segment()),
            Some("user")
        );
        assert!(Condition::Literal.apply(&root, "other").is_none());
        assert_eq!(
            Condition::Param.apply(&root, "anything").map(|n| n.segment()),
            Some(":id")
        );
        assert_eq!(
            Condition::Regex.apply(&root, "42").map(|n| n.segment()),
            Some(":num(^[0-9]+$)")
        );
        assert!(Condition::Regex.apply(&root, "abc").is_none());
        assert_eq!(
            Condition::Wildcard.apply(&root, "x").map(|n| n.segment()),
            Some("*")
        );
    }
}
