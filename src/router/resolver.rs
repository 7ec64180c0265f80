//! マッチしたパスに適用されるミドルウェア列の解決
//!
//! 主マッチングが選んだノードだけでなく、各セグメントに正当にマッチする
//! すべてのノードのミドルウェアを幅優先で集める。

use std::collections::HashSet;

use log::debug;

use crate::error::Error;

use super::condition::Condition;
use super::node::Node;
use super::queue::Queue;

/// 条件リストを保持するミドルウェアリゾルバー
///
/// 条件の順序は同じ深さにあるノード同士のミドルウェア追加順を決める。
#[derive(Debug, Clone)]
pub struct MiddlewareResolver {
    conditions: Vec<Condition>,
}

impl Default for MiddlewareResolver {
    fn default() -> Self {
        Self {
            conditions: Condition::RESOLUTION_ORDER.to_vec(),
        }
    }
}

impl MiddlewareResolver {
    /// 条件リストを指定して作成（重複はエラー）
    pub fn new(conditions: Vec<Condition>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for condition in &conditions {
            if !seen.insert(*condition) {
                return Err(Error::ConfigurationError(format!(
                    "Duplicate match condition: {}",
                    condition
                )));
            }
        }
        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// `root` から `segments` をたどり、適用されるミドルウェアを順番に集める
    ///
    /// 各ノードのミドルウェアは1回の解決で高々1度だけ追加される。
    /// ワイルドカードノードは自分自身を次のセグメントへ持ち越す。
    pub fn resolve<H, M: Clone>(&self, root: &Node<H, M>, segments: &[&str]) -> Vec<M> {
        if segments.is_empty() {
            return root.middlewares().to_vec();
        }

        let last = segments.len() - 1;
        let mut result = Vec::new();
        let mut queue: Queue<(usize, &Node<H, M>)> = Queue::new();
        let mut enqueued: HashSet<(usize, *const Node<H, M>)> = HashSet::new();
        let mut collected: HashSet<*const Node<H, M>> = HashSet::new();

        queue.push((0, root));

        while let Some((index, node)) = queue.pop() {
            let segment = segments[index];

            for condition in &self.conditions {
                let Some(child) = condition.apply(node, segment) else {
                    continue;
                };
                let key = child as *const Node<H, M>;

                if collected.insert(key) {
                    result.extend(child.middlewares().iter().cloned());
                }
                if index < last && enqueued.insert((index + 1, key)) {
                    queue.push((index + 1, child));
                }
            }

            if node.is_wildcard() && index < last {
                let key = node as *const Node<H, M>;
                if enqueued.insert((index + 1, key)) {
                    queue.push((index + 1, node));
                }
            }
        }

        debug!(
            "Resolved {} middleware(s) for /{}",
            result.len(),
            segments.join("/")
        );
        result
    }
}
