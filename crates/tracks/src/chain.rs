//! A synthetic topology: segments linked in a fixed order, independent of any
//! block world.
//!
//! A link can be laid reversed, meaning its own start-to-end direction runs
//! against the chain order. A joint between two links is inverted exactly
//! when one of them is reversed and the other is not.

use crate::segment::TrackSegment;
use crate::topology::{Placement, SegmentRef, TrackTopology};

#[derive(Debug, Clone)]
struct ChainLink {
    segment: TrackSegment,
    placement: Placement,
    reversed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ChainTopology {
    links: Vec<ChainLink>,
    closed: bool,
}

impl ChainTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, segment: TrackSegment, placement: Placement) -> Self {
        self.push(segment, placement, false);
        self
    }

    pub fn with_reversed_link(mut self, segment: TrackSegment, placement: Placement) -> Self {
        self.push(segment, placement, true);
        self
    }

    /// Join the last link back onto the first.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn push(&mut self, segment: TrackSegment, placement: Placement, reversed: bool) -> usize {
        self.links.push(ChainLink {
            segment,
            placement,
            reversed,
        });
        self.links.len() - 1
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn segment(&self, index: usize) -> Option<&TrackSegment> {
        self.links.get(index).map(|link| &link.segment)
    }

    pub fn is_reversed(&self, index: usize) -> bool {
        self.links.get(index).is_some_and(|link| link.reversed)
    }

    fn step(&self, index: usize, forward: bool) -> Option<usize> {
        let len = self.links.len();
        if forward {
            if index + 1 < len {
                Some(index + 1)
            } else if self.closed && len > 0 {
                Some(0)
            } else {
                None
            }
        } else if index > 0 {
            Some(index - 1)
        } else if self.closed && len > 0 {
            Some(len - 1)
        } else {
            None
        }
    }

    fn link_ref(&self, index: usize) -> Option<SegmentRef<'_, usize>> {
        self.links
            .get(index)
            .map(|link| SegmentRef::new(&link.segment, index))
    }
}

impl TrackTopology for ChainTopology {
    type Context = usize;

    fn segment_at(&self, context: usize) -> Option<SegmentRef<'_, usize>> {
        self.link_ref(context)
    }

    fn previous_of(&self, _segment: &TrackSegment, context: usize) -> Option<SegmentRef<'_, usize>> {
        let reversed = self.is_reversed(context);
        self.step(context, reversed)
            .and_then(|index| self.link_ref(index))
    }

    fn next_of(&self, _segment: &TrackSegment, context: usize) -> Option<SegmentRef<'_, usize>> {
        let reversed = self.is_reversed(context);
        self.step(context, !reversed)
            .and_then(|index| self.link_ref(index))
    }

    fn is_inverted(&self, from: SegmentRef<'_, usize>, to: SegmentRef<'_, usize>) -> bool {
        self.is_reversed(from.context) != self.is_reversed(to.context)
    }

    fn placement(&self, context: usize) -> Option<Placement> {
        self.links.get(context).map(|link| link.placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bezier::CubicBezier;
    use crate::segment::SegmentOptions;
    use bevy::math::Vec3;

    fn straight(length: f32) -> TrackSegment {
        TrackSegment::new(
            vec![CubicBezier::straight(Vec3::ZERO, Vec3::new(0.0, 0.0, -length))],
            &SegmentOptions::default(),
        )
        .unwrap()
    }

    fn abc(reverse_b: bool) -> ChainTopology {
        let mut chain = ChainTopology::new();
        chain.push(straight(10.0), Placement::IDENTITY, false);
        chain.push(straight(10.0), Placement::IDENTITY, reverse_b);
        chain.push(straight(10.0), Placement::IDENTITY, false);
        chain
    }

    #[test]
    fn test_open_chain_ends() {
        let chain = abc(false);
        let first = chain.segment(0).unwrap();
        let last = chain.segment(2).unwrap();
        assert!(chain.previous_of(first, 0).is_none());
        assert!(chain.next_of(last, 2).is_none());
        assert_eq!(chain.next_of(first, 0).map(|r| r.context), Some(1));
        assert_eq!(chain.previous_of(last, 2).map(|r| r.context), Some(1));
    }

    #[test]
    fn test_closed_chain_wraps() {
        let chain = abc(false).closed();
        let first = chain.segment(0).unwrap();
        let last = chain.segment(2).unwrap();
        assert_eq!(chain.previous_of(first, 0).map(|r| r.context), Some(2));
        assert_eq!(chain.next_of(last, 2).map(|r| r.context), Some(0));
    }

    #[test]
    fn test_reversed_link_swaps_its_neighbors() {
        let chain = abc(true);
        let b = chain.segment(1).unwrap();
        // B runs against the chain, so its end touches A and its start touches C
        assert_eq!(chain.next_of(b, 1).map(|r| r.context), Some(0));
        assert_eq!(chain.previous_of(b, 1).map(|r| r.context), Some(2));
    }

    #[test]
    fn test_inversion_follows_reversal_mismatch() {
        let chain = abc(true);
        let a = chain.segment_at(0).unwrap();
        let b = chain.segment_at(1).unwrap();
        let c = chain.segment_at(2).unwrap();
        assert!(chain.is_inverted(a, b));
        assert!(chain.is_inverted(c, b));
        assert!(!chain.is_inverted(a, c));
    }

    #[test]
    fn test_walk_through_reversed_link_and_out() {
        let chain = abc(true);
        let a = chain.segment(0).unwrap();
        let max = a.max_distance();

        // A -> B lands near B's end
        let on_b = a.get_track_segment(max + 1.0, 0, &chain).unwrap();
        assert_eq!(on_b.context, 1);
        let b_max = on_b.segment.max_distance();
        assert!((on_b.t - (b_max - 1.0)).abs() < 1e-4);

        // running B backwards off its start lands on C's start
        let on_c = on_b.segment.get_track_segment(-0.5, 1, &chain).unwrap();
        assert_eq!(on_c.context, 2);
        assert!((on_c.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_placement_lookup() {
        let mut chain = ChainTopology::new();
        let at = Placement::from_translation(Vec3::new(0.0, 0.0, -10.0));
        chain.push(straight(10.0), Placement::IDENTITY, false);
        chain.push(straight(10.0), at, false);
        assert_eq!(chain.placement(1), Some(at));
        assert_eq!(chain.placement(2), None);
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
    }
}
