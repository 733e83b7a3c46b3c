use gpui::{Pixels, SharedString};

/// Opaque identifier of a block, stable for the block's lifetime in the stack.
pub type BlockId = SharedString;

/// Vertical extent of a rendered block, in window coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlockBounds {
    pub top: Pixels,
    pub bottom: Pixels,
}

impl BlockBounds {
    pub fn new(top: Pixels, bottom: Pixels) -> Self {
        Self { top, bottom }
    }

    pub fn mid_y(&self) -> Pixels {
        lerp(self.top, self.bottom, 0.5)
    }

    pub fn height(&self) -> Pixels {
        self.bottom - self.top
    }
}

pub(crate) fn lerp(a: Pixels, b: Pixels, t: f32) -> Pixels {
    a + (b - a) * t
}

/// Source of block geometry for divider resolution.
///
/// Blocks that have not been laid out yet return `None` and are ignored.
pub trait BlockLayout {
    fn block_bounds(&self, id: &BlockId) -> Option<BlockBounds>;
}

/// The gap highlighted as the drop target while a block is dragged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveDivider {
    /// The gap above the first block.
    Top,
    /// The gap right after `anchor`, which sits at `index` in the block order.
    After { anchor: BlockId, index: usize },
}

impl ActiveDivider {
    pub fn after(anchor: impl Into<BlockId>, index: usize) -> Self {
        Self::After {
            anchor: anchor.into(),
            index,
        }
    }

    pub fn anchor(&self) -> Option<&BlockId> {
        match self {
            Self::Top => None,
            Self::After { anchor, .. } => Some(anchor),
        }
    }
}

/// Resolve which divider the dragged block would land in for a pointer at `mouse_y`.
///
/// The candidate is the first other block whose midpoint lies below the pointer,
/// or the last other block when the pointer is below all of them. The top half of
/// the candidate selects the gap before it, the bottom half the gap after it.
/// Hovering the dragged block's own gap yields `None`.
pub fn resolve_active_divider(
    order: &[BlockId],
    dragged: &BlockId,
    mouse_y: Pixels,
    layout: &impl BlockLayout,
) -> Option<ActiveDivider> {
    let positions = order
        .iter()
        .enumerate()
        .filter(|(_, id)| *id != dragged)
        .filter_map(|(ix, id)| layout.block_bounds(id).map(|bounds| (ix, id, bounds)))
        .collect::<Vec<_>>();

    let (ix, key, bounds) = positions
        .iter()
        .find(|(_, _, bounds)| bounds.mid_y() > mouse_y)
        .or_else(|| positions.last())?;

    if mouse_y >= bounds.mid_y() {
        return Some(ActiveDivider::after((*key).clone(), *ix));
    }

    if *ix == 0 {
        return Some(ActiveDivider::Top);
    }

    let prev_ix = ix - 1;
    let prev_key = order.get(prev_ix)?;
    if prev_key == dragged {
        return None;
    }

    Some(ActiveDivider::after(prev_key.clone(), prev_ix))
}

/// Move `dragged` into the gap named by `divider`.
///
/// `divider` indexes the order *before* the move, so the dragged block is filtered out
/// of both halves before it is reinserted. `dragged` must be a member of `order`.
pub fn commit_reorder(order: &[BlockId], dragged: &BlockId, divider: &ActiveDivider) -> Vec<BlockId> {
    let split = match divider {
        ActiveDivider::Top => 0,
        ActiveDivider::After { index, .. } => index.saturating_add(1).min(order.len()),
    };

    let (before, after) = order.split_at(split);
    let mut next = Vec::with_capacity(order.len());
    next.extend(before.iter().filter(|id| *id != dragged).cloned());
    next.push(dragged.clone());
    next.extend(after.iter().filter(|id| *id != dragged).cloned());
    next
}
