use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use gpui::{Pixels, Point, point, px};

use crate::motion::BlockMotion;
use crate::order::{
    ActiveDivider, BlockBounds, BlockId, BlockLayout, commit_reorder, resolve_active_divider,
};

pub(crate) const DEFAULT_DIVIDER_HEIGHT: Pixels = px(5.);
pub(crate) const DEFAULT_SNAP_BACK: Duration = Duration::from_millis(200);

/// Per-block handles: where the block was last laid out, and its animation.
#[derive(Clone, Default)]
pub struct BlockSlot {
    bounds: Rc<Cell<Option<BlockBounds>>>,
    motion: BlockMotion,
}

impl BlockSlot {
    pub fn bounds(&self) -> Option<BlockBounds> {
        self.bounds.get()
    }

    /// Store the bounds the block was laid out at in the latest frame.
    pub fn record_bounds(&self, bounds: BlockBounds) {
        self.bounds.set(Some(bounds));
    }

    pub fn motion(&self) -> &BlockMotion {
        &self.motion
    }
}

/// Maps every block in the stack to its [`BlockSlot`].
#[derive(Default)]
pub struct BlockRegistry {
    slots: HashMap<BlockId, BlockSlot>,
}

impl BlockRegistry {
    pub fn get(&self, id: &BlockId) -> Option<&BlockSlot> {
        self.slots.get(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.slots.keys()
    }
}

impl BlockLayout for BlockRegistry {
    fn block_bounds(&self, id: &BlockId) -> Option<BlockBounds> {
        self.slots.get(id).and_then(BlockSlot::bounds)
    }
}

#[derive(Clone, Debug)]
pub enum DragPhase {
    Start,
    Move { position: Point<Pixels> },
    End,
}

/// One pointer-drag lifecycle event reported by a block.
#[derive(Clone)]
pub struct BlockDragEvent {
    pub block_id: BlockId,
    pub motion: BlockMotion,
    pub phase: DragPhase,
}

/// A committed move of one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackReorder {
    pub block_id: BlockId,
    pub from: usize,
    pub to: usize,
}

/// Block order plus the transient state of one drag gesture.
pub struct BlockStack {
    registry: BlockRegistry,
    order: Vec<BlockId>,
    dragging: Option<BlockId>,
    active_divider: Option<ActiveDivider>,
    divider_height: Pixels,
    snap_back: Duration,
}

impl Default for BlockStack {
    fn default() -> Self {
        Self {
            registry: BlockRegistry::default(),
            order: Vec::new(),
            dragging: None,
            active_divider: None,
            divider_height: DEFAULT_DIVIDER_HEIGHT,
            snap_back: DEFAULT_SNAP_BACK,
        }
    }
}

impl BlockStack {
    pub fn new(ids: impl IntoIterator<Item = impl Into<BlockId>>) -> Self {
        let mut stack = Self::default();
        stack.initialize(ids);
        stack
    }

    pub fn set_divider_height(&mut self, height: Pixels) {
        self.divider_height = height;
    }

    pub fn set_snap_back_duration(&mut self, duration: Duration) {
        self.snap_back = duration;
    }

    /// Replace every block, discarding the registry and any drag in progress.
    ///
    /// Ids must be unique; repeats after the first occurrence are dropped.
    pub fn initialize(&mut self, ids: impl IntoIterator<Item = impl Into<BlockId>>) {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for id in ids {
            let id = id.into();
            if !seen.insert(id.clone()) {
                tracing::warn!(block = %id, "duplicate block id dropped");
                continue;
            }
            order.push(id);
        }

        self.registry = BlockRegistry {
            slots: order
                .iter()
                .map(|id| (id.clone(), BlockSlot::default()))
                .collect(),
        };
        self.order = order;
        self.dragging = None;
        self.active_divider = None;
        tracing::debug!(blocks = self.order.len(), "block stack initialized");
    }

    pub fn order(&self) -> &[BlockId] {
        &self.order
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn slot(&self, id: &BlockId) -> Option<&BlockSlot> {
        self.registry.get(id)
    }

    pub fn dragging(&self) -> Option<&BlockId> {
        self.dragging.as_ref()
    }

    pub fn active_divider(&self) -> Option<&ActiveDivider> {
        self.active_divider.as_ref()
    }

    /// Whether the divider rendered after `anchor` is the current drop target.
    pub fn is_divider_active(&self, anchor: &BlockId) -> bool {
        self.active_divider
            .as_ref()
            .and_then(ActiveDivider::anchor)
            .is_some_and(|active| active == anchor)
    }

    pub fn is_top_divider_active(&self) -> bool {
        self.active_divider == Some(ActiveDivider::Top)
    }

    /// Apply one drag event. Returns the reorder when a drop changed the order.
    pub fn handle_drag(&mut self, event: BlockDragEvent) -> Option<StackReorder> {
        match event.phase {
            DragPhase::Start => {
                self.on_drag_start(event.block_id);
                None
            }
            DragPhase::Move { position } => {
                self.on_drag_move(&event.block_id, position);
                None
            }
            DragPhase::End => self.on_drag_end(&event.block_id, &event.motion),
        }
    }

    pub fn on_drag_start(&mut self, id: BlockId) {
        tracing::debug!(block = %id, "drag started");
        self.dragging = Some(id);
    }

    /// Re-resolve the active divider for the pointer. Returns true if it changed.
    pub fn on_drag_move(&mut self, id: &BlockId, position: Point<Pixels>) -> bool {
        let next = resolve_active_divider(&self.order, id, position.y, &self.registry);
        if next == self.active_divider {
            return false;
        }

        tracing::trace!(block = %id, divider = ?next, "active divider changed");
        self.active_divider = next;
        true
    }

    pub fn on_drag_end(&mut self, id: &BlockId, motion: &BlockMotion) -> Option<StackReorder> {
        let divider = self.active_divider.take();
        self.dragging = None;

        let Some(divider) = divider else {
            motion.start(Point::default(), self.snap_back);
            tracing::debug!(block = %id, "drag abandoned");
            return None;
        };

        let Some(from) = self.order.iter().position(|key| key == id) else {
            motion.start(Point::default(), self.snap_back);
            return None;
        };

        let next = commit_reorder(&self.order, id, &divider);
        let to = next.iter().position(|key| key == id).unwrap_or(from);
        if from == to {
            motion.start(Point::default(), self.snap_back);
            return None;
        }

        self.slide_into_place(&next);
        self.order = next;
        motion.start(Point::default(), self.snap_back);
        tracing::debug!(block = %id, from, to, order = ?self.order, "drag committed");

        Some(StackReorder {
            block_id: id.clone(),
            from,
            to,
        })
    }

    /// Offset every block that moves under `next` by its old position minus its
    /// predicted new one, then ease it back to zero.
    fn slide_into_place(&self, next: &[BlockId]) {
        let Some(tops) = self.predicted_tops(next) else {
            return;
        };

        for (id, new_top) in next.iter().zip(tops) {
            let Some(slot) = self.registry.get(id) else {
                continue;
            };
            let Some(bounds) = slot.bounds() else {
                continue;
            };

            let delta = bounds.top - new_top;
            if delta != px(0.) {
                slot.motion.translate(point(px(0.), delta));
                slot.motion.start(Point::default(), self.snap_back);
            }
        }
    }

    /// Predict the top of each block in `next`, assuming the stack keeps its origin and
    /// each block keeps its height. `None` if any block has not been laid out.
    pub(crate) fn predicted_tops(&self, next: &[BlockId]) -> Option<Vec<Pixels>> {
        let first = self.order.first()?;
        let mut cursor = self.registry.block_bounds(first)?.top;
        let mut tops = Vec::with_capacity(next.len());
        for id in next {
            let bounds = self.registry.block_bounds(id)?;
            tops.push(cursor);
            cursor += bounds.height() + self.divider_height;
        }
        Some(tops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&'static str]) -> Vec<BlockId> {
        names.iter().map(|name| BlockId::from(*name)).collect()
    }

    fn lay_out(stack: &BlockStack) {
        for (ix, id) in stack.order().iter().enumerate() {
            let top = px(ix as f32 * 53.);
            stack
                .slot(id)
                .unwrap()
                .record_bounds(BlockBounds::new(top, top + px(48.)));
        }
    }

    fn event(stack: &BlockStack, id: &str, phase: DragPhase) -> BlockDragEvent {
        let block_id = BlockId::from(id.to_string());
        let motion = stack.slot(&block_id).unwrap().motion().clone();
        BlockDragEvent {
            block_id,
            motion,
            phase,
        }
    }

    fn move_to(y: f32) -> DragPhase {
        DragPhase::Move {
            position: point(px(10.), px(y)),
        }
    }

    #[test]
    fn initialize_drops_duplicates() {
        let stack = BlockStack::new(["A", "B", "A", "C"]);
        assert_eq!(stack.order(), ids(&["A", "B", "C"]).as_slice());
        assert_eq!(stack.registry().len(), 3);
    }

    #[test]
    fn drag_start_only_records_dragging() {
        let mut stack = BlockStack::new(["A", "B"]);
        stack.handle_drag(event(&stack, "A", DragPhase::Start));
        assert_eq!(stack.dragging(), Some(&BlockId::from("A")));
        assert_eq!(stack.active_divider(), None);
        assert_eq!(stack.order(), ids(&["A", "B"]).as_slice());
    }

    #[test]
    fn move_does_not_touch_order() {
        let mut stack = BlockStack::new(["A", "B", "C", "D"]);
        lay_out(&stack);
        stack.handle_drag(event(&stack, "A", DragPhase::Start));
        stack.handle_drag(event(&stack, "A", move_to(170.)));
        assert!(stack.is_divider_active(&BlockId::from("C")));
        assert!(!stack.is_divider_active(&BlockId::from("A")));
        assert_eq!(stack.order(), ids(&["A", "B", "C", "D"]).as_slice());
    }

    #[test]
    fn on_drag_move_reports_changes_only() {
        let mut stack = BlockStack::new(["A", "B", "C"]);
        lay_out(&stack);
        let a = BlockId::from("A");
        assert!(stack.on_drag_move(&a, point(px(0.), px(90.))));
        assert!(!stack.on_drag_move(&a, point(px(0.), px(95.))));
    }

    #[test]
    fn drop_commits_and_clears() {
        let mut stack = BlockStack::new(["A", "B", "C", "D"]);
        lay_out(&stack);
        stack.handle_drag(event(&stack, "A", DragPhase::Start));
        stack.handle_drag(event(&stack, "A", move_to(170.)));
        let reorder = stack.handle_drag(event(&stack, "A", DragPhase::End));

        assert_eq!(
            reorder,
            Some(StackReorder {
                block_id: "A".into(),
                from: 0,
                to: 2,
            })
        );
        assert_eq!(stack.order(), ids(&["B", "C", "A", "D"]).as_slice());
        assert_eq!(stack.dragging(), None);
        assert_eq!(stack.active_divider(), None);
    }

    #[test]
    fn drop_without_divider_is_abandoned() {
        let mut stack = BlockStack::new(["A", "B", "C"]);
        lay_out(&stack);
        stack.handle_drag(event(&stack, "B", DragPhase::Start));
        // Top half of C: B's own gap.
        stack.handle_drag(event(&stack, "B", move_to(110.)));
        assert_eq!(stack.active_divider(), None);

        let reorder = stack.handle_drag(event(&stack, "B", DragPhase::End));
        assert_eq!(reorder, None);
        assert_eq!(stack.order(), ids(&["A", "B", "C"]).as_slice());
        assert_eq!(stack.dragging(), None);
    }

    #[test]
    fn drop_into_unchanged_position_reports_nothing() {
        let mut stack = BlockStack::new(["A", "B", "C"]);
        lay_out(&stack);
        stack.handle_drag(event(&stack, "B", DragPhase::Start));
        // The gap after A is where B already sits.
        stack.active_divider = Some(ActiveDivider::after("A", 0));
        let reorder = stack.handle_drag(event(&stack, "B", DragPhase::End));
        assert_eq!(reorder, None);
        assert_eq!(stack.order(), ids(&["A", "B", "C"]).as_slice());
    }

    #[test]
    fn drop_snaps_dragged_block_back() {
        let mut stack = BlockStack::new(["A", "B"]);
        stack.set_snap_back_duration(Duration::ZERO);
        let a = BlockId::from("A");
        let motion = stack.slot(&a).unwrap().motion().clone();
        motion.set_offset(point(px(7.), px(30.)));

        stack.handle_drag(event(&stack, "A", DragPhase::Start));
        stack.handle_drag(event(&stack, "A", DragPhase::End));
        assert_eq!(motion.offset(), (Point::default(), true));
    }

    #[test]
    fn commit_slides_moved_blocks_towards_new_slots() {
        let mut stack = BlockStack::new(["A", "B", "C"]);
        lay_out(&stack);
        stack.handle_drag(event(&stack, "A", DragPhase::Start));
        stack.handle_drag(event(&stack, "A", move_to(900.)));
        stack.handle_drag(event(&stack, "A", DragPhase::End));
        assert_eq!(stack.order(), ids(&["B", "C", "A"]).as_slice());

        // B moved up one slot, so it starts one slot below its new position.
        let b = stack.slot(&BlockId::from("B")).unwrap().motion();
        assert_eq!(b.target(), Point::default());
        let (offset, _) = b.sample_at(std::time::Instant::now() - Duration::from_secs(1));
        assert_eq!(offset, point(px(0.), px(53.)));
    }

    #[test]
    fn predicted_tops_follow_recorded_heights() {
        let stack = BlockStack::new(["A", "B", "C"]);
        lay_out(&stack);
        let tops = stack.predicted_tops(&ids(&["C", "A", "B"])).unwrap();
        assert_eq!(tops, vec![px(0.), px(53.), px(106.)]);
    }

    #[test]
    fn reinitialize_mid_drag_clears_transient_state() {
        let mut stack = BlockStack::new(["A", "B", "C"]);
        lay_out(&stack);
        stack.handle_drag(event(&stack, "A", DragPhase::Start));
        stack.handle_drag(event(&stack, "A", move_to(900.)));
        assert!(stack.active_divider().is_some());

        stack.initialize(["X", "Y"]);
        assert_eq!(stack.dragging(), None);
        assert_eq!(stack.active_divider(), None);
        assert_eq!(stack.order(), ids(&["X", "Y"]).as_slice());
        assert!(stack.slot(&BlockId::from("X")).unwrap().bounds().is_none());
    }
}
