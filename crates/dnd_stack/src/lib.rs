mod block;
mod divider;
mod motion;
mod order;
mod stack;
mod view;

pub use divider::Divider;
pub use motion::BlockMotion;
pub use order::{
    ActiveDivider, BlockBounds, BlockId, BlockLayout, commit_reorder, resolve_active_divider,
};
pub use stack::{BlockDragEvent, BlockRegistry, BlockSlot, BlockStack, DragPhase, StackReorder};
pub use view::{BlockRowState, DndStack, DndStackState, dnd_stack};
