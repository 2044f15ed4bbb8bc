//! Depth-bucketed drawable collection

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::Drawable;
use crate::surface::Surface;

/// Render depth bucket. Buckets draw back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderDepth {
    Background,
    #[default]
    Middleground,
    Foreground,
}

impl RenderDepth {
    fn slot(self) -> usize {
        match self {
            RenderDepth::Background => 0,
            RenderDepth::Middleground => 1,
            RenderDepth::Foreground => 2,
        }
    }
}

struct Entry {
    seq: u64,
    drawable: Box<dyn Drawable>,
}

/// Ordered drawables split into three depth buckets.
///
/// Within a bucket, draw order is insertion order. Drawing never removes
/// entries. With a limit set, pushing past it evicts the oldest entry across
/// all buckets; without one the list grows without bound.
pub struct DrawList {
    buckets: [VecDeque<Entry>; 3],
    limit: Option<usize>,
    next_seq: u64,
    evicted: u64,
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawList {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            buckets: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
            limit,
            next_seq: 0,
            evicted: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count in a single bucket
    pub fn len_at(&self, depth: RenderDepth) -> usize {
        self.buckets[depth.slot()].len()
    }

    /// Total entries dropped by the limit so far
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Append to the middleground
    pub fn push(&mut self, drawable: Box<dyn Drawable>) {
        self.push_at(RenderDepth::Middleground, drawable);
    }

    pub fn push_at(&mut self, depth: RenderDepth, drawable: Box<dyn Drawable>) {
        if self.limit == Some(0) {
            self.evicted += 1;
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.buckets[depth.slot()].push_back(Entry { seq, drawable });

        if let Some(limit) = self.limit {
            while self.len() > limit {
                self.evict_oldest();
            }
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .buckets
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.front().map(|e| (i, e.seq)))
            .min_by_key(|&(_, seq)| seq);

        if let Some((slot, _)) = oldest {
            self.buckets[slot].pop_front();
            self.evicted += 1;
        }
    }

    /// Draw every entry, background first
    pub fn draw(&mut self, surface: &mut dyn Surface) {
        for bucket in &mut self.buckets {
            for entry in bucket.iter_mut() {
                entry.drawable.draw(surface);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    /// Writes its tag as text so draw order is visible
    struct Tag(&'static str);

    impl Drawable for Tag {
        fn draw(&mut self, surface: &mut dyn Surface) {
            surface.fill_text(self.0, 0.0, 0.0);
        }
    }

    fn drawn(list: &mut DrawList) -> Vec<String> {
        let log = RecordingSurface::new();
        let mut surface = log.clone();
        list.draw(&mut surface);
        log.commands()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_flat_push_draws_in_insertion_order() {
        let mut list = DrawList::new();
        for tag in ["a", "b", "c"] {
            list.push(Box::new(Tag(tag)));
        }
        assert_eq!(drawn(&mut list), ["a", "b", "c"]);
        // Drawing removes nothing
        assert_eq!(drawn(&mut list), ["a", "b", "c"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_depth_buckets_draw_back_to_front() {
        let mut list = DrawList::new();
        list.push_at(RenderDepth::Foreground, Box::new(Tag("fg")));
        list.push(Box::new(Tag("mid")));
        list.push_at(RenderDepth::Background, Box::new(Tag("bg")));
        assert_eq!(drawn(&mut list), ["bg", "mid", "fg"]);
        assert_eq!(list.len_at(RenderDepth::Background), 1);
    }

    #[test]
    fn test_limit_evicts_oldest_across_buckets() {
        let mut list = DrawList::with_limit(Some(2));
        list.push_at(RenderDepth::Foreground, Box::new(Tag("first")));
        list.push_at(RenderDepth::Background, Box::new(Tag("second")));
        list.push(Box::new(Tag("third")));

        assert_eq!(list.len(), 2);
        assert_eq!(list.evicted(), 1);
        assert_eq!(drawn(&mut list), ["second", "third"]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut list = DrawList::with_limit(Some(0));
        list.push(Box::new(Tag("x")));
        assert!(list.is_empty());
        assert_eq!(list.evicted(), 1);
    }
}
