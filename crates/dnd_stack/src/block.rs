use gpui::{
    AnyElement, App, Bounds, CursorStyle, Element, ElementId, Entity, GlobalElementId, Hitbox,
    HitboxBehavior, InspectorElementId, IntoElement, LayoutId, MouseButton, MouseDownEvent,
    MouseMoveEvent, MouseUpEvent, Pixels, Window,
};

use crate::order::{BlockBounds, BlockId};
use crate::stack::BlockSlot;
use crate::view::DndStackState;

/// Wraps one rendered block: records its layout bounds into the block's slot and
/// turns left-button press, drag and release into drag events on the stack.
pub(crate) struct BlockElement {
    state: Entity<DndStackState>,
    block_id: BlockId,
    slot: BlockSlot,
    child: AnyElement,
}

impl BlockElement {
    pub(crate) fn new(
        state: Entity<DndStackState>,
        block_id: BlockId,
        slot: BlockSlot,
        child: impl IntoElement,
    ) -> Self {
        Self {
            state,
            block_id,
            slot,
            child: child.into_any_element(),
        }
    }
}

impl IntoElement for BlockElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for BlockElement {
    type RequestLayoutState = ();
    type PrepaintState = Hitbox;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static std::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let child_layout_id = self.child.request_layout(window, cx);
        let mut style = gpui::Style::default();
        style.size.width = gpui::relative(1.).into();
        (window.request_layout(style, [child_layout_id], cx), ())
    }

    fn prepaint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        // The slot keeps the unshifted layout box; the drag offset lives on the child.
        self.slot
            .record_bounds(BlockBounds::new(bounds.top(), bounds.bottom()));
        self.child.prepaint(window, cx);
        window.insert_hitbox(bounds, HitboxBehavior::Normal)
    }

    fn paint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        _bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        self.child.paint(window, cx);

        let dragging = self.state.read(cx).is_dragging(&self.block_id);
        let cursor = if dragging {
            CursorStyle::ClosedHand
        } else {
            CursorStyle::OpenHand
        };
        window.set_cursor_style(cursor, prepaint);

        window.on_mouse_event({
            let state = self.state.clone();
            let hitbox = prepaint.clone();
            let block_id = self.block_id.clone();
            let motion = self.slot.motion().clone();
            move |event: &MouseDownEvent, phase, window, cx| {
                if !phase.bubble() || event.button != MouseButton::Left {
                    return;
                }
                if !hitbox.is_hovered(window) {
                    return;
                }
                state.update(cx, |this, cx| {
                    this.on_block_mouse_down(block_id.clone(), motion.clone(), event.position, cx);
                });
            }
        });

        window.on_mouse_event({
            let state = self.state.clone();
            let block_id = self.block_id.clone();
            let motion = self.slot.motion().clone();
            move |event: &MouseMoveEvent, phase, _window, cx| {
                if !phase.bubble() || event.pressed_button != Some(MouseButton::Left) {
                    return;
                }
                if !state.read(cx).is_dragging(&block_id) {
                    return;
                }
                state.update(cx, |this, cx| {
                    this.on_block_mouse_move(&block_id, &motion, event.position, cx);
                });
            }
        });

        window.on_mouse_event({
            let state = self.state.clone();
            let block_id = self.block_id.clone();
            let motion = self.slot.motion().clone();
            move |event: &MouseUpEvent, phase, _window, cx| {
                if !phase.bubble() || event.button != MouseButton::Left {
                    return;
                }
                if !state.read(cx).is_dragging(&block_id) {
                    return;
                }
                state.update(cx, |this, cx| {
                    this.on_block_mouse_up(&block_id, &motion, cx);
                });
            }
        });
    }
}
