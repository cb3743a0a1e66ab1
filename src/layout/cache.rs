// Frame cache with a generation counter
// Invalidation is wholesale: bumping the generation makes every existing
// entry a stale read, so partial-invalidation bugs cannot occur.

use std::collections::HashMap;

use super::ItemFrame;

/// Non-event frame kinds the layout engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplementaryKind {
    CornerHeader,
    ColumnHeader,
    AllDayHeader,
    RowHeader,
    VerticalGridline,
    HorizontalGridline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Item { section: usize, item: usize },
    Supplementary { kind: SupplementaryKind, index: usize },
}

#[derive(Debug, Default)]
pub(crate) struct LayoutCache {
    generation: u64,
    frames: HashMap<CacheKey, (u64, ItemFrame)>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached frame unless it predates the current generation.
    pub fn get(&self, key: CacheKey) -> Option<ItemFrame> {
        self.frames
            .get(&key)
            .filter(|(generation, _)| *generation == self.generation)
            .map(|(_, frame)| *frame)
    }

    pub fn insert(&mut self, key: CacheKey, frame: ItemFrame) {
        self.frames.insert(key, (self.generation, frame));
    }

    /// Invalidate every entry at once. Stale entries are overwritten lazily.
    pub fn invalidate_all(&mut self) {
        self.generation += 1;
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, Rect};

    fn frame(x: f32) -> ItemFrame {
        ItemFrame {
            rect: Rect::from_min_max(pos2(x, 0.0), pos2(x + 10.0, 10.0)),
            z_index: 0,
        }
    }

    #[test]
    fn test_get_returns_inserted_frame() {
        let mut cache = LayoutCache::new();
        let key = CacheKey::Item { section: 2, item: 1 };
        cache.insert(key, frame(5.0));
        assert_eq!(cache.get(key), Some(frame(5.0)));
    }

    #[test]
    fn test_invalidate_all_makes_entries_stale() {
        let mut cache = LayoutCache::new();
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::ColumnHeader,
            index: 3,
        };
        cache.insert(key, frame(1.0));
        cache.invalidate_all();
        assert_eq!(cache.get(key), None);
        assert_eq!(cache.generation(), 1);
    }

    #[test]
    fn test_reinsert_after_invalidation_is_fresh() {
        let mut cache = LayoutCache::new();
        let key = CacheKey::Item { section: 0, item: 0 };
        cache.insert(key, frame(1.0));
        cache.invalidate_all();
        cache.insert(key, frame(2.0));
        assert_eq!(cache.get(key), Some(frame(2.0)));
    }
}
