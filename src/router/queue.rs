//! 幅優先探索用のFIFOキュー

use std::collections::VecDeque;

/// 汎用FIFOキュー
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> Queue<T> {
    /// 空のキューを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に1件追加
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// 末尾に複数件を順番どおり追加
    pub fn push_all<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.extend(items);
    }

    /// 先頭から1件取り出す
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = std::collections::vec_deque::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
