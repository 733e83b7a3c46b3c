use std::rc::Rc;
use std::time::Duration;

use gpui::{
    AnyElement, App, Context, ElementId, Entity, FocusHandle, InteractiveElement as _,
    IntoElement, ParentElement as _, Pixels, Point, Render, RenderOnce, StyleRefinement, Styled,
    Window, div, px, rgb, white,
};
use gpui_component::{StyledExt as _, v_flex};

use crate::block::BlockElement;
use crate::divider::Divider;
use crate::motion::BlockMotion;
use crate::order::{ActiveDivider, BlockId};
use crate::stack::{BlockDragEvent, BlockStack, DragPhase, StackReorder};

const CONTEXT: &str = "DndStack";
const DEFAULT_BLOCK_HEIGHT: Pixels = px(48.);

type RenderBlock = dyn Fn(usize, &BlockId, BlockRowState, &mut Window, &mut App) -> AnyElement;

/// Create a [`DndStack`].
pub fn dnd_stack(state: &Entity<DndStackState>) -> DndStack {
    DndStack::new(state)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BlockRowState {
    pub dragging: bool,
}

#[derive(Default)]
struct DndStackCallbacks {
    on_reorder: Option<Rc<dyn Fn(&StackReorder, &[BlockId])>>,
}

/// State for a vertical stack of blocks reordered by dragging.
pub struct DndStackState {
    focus_handle: FocusHandle,
    stack: BlockStack,
    block_height: Pixels,
    divider_height: Pixels,
    drag_origin: Option<Point<Pixels>>,
    callbacks: DndStackCallbacks,
    render_block: Rc<RenderBlock>,
}

impl DndStackState {
    pub fn new(cx: &mut App) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            stack: BlockStack::default(),
            block_height: DEFAULT_BLOCK_HEIGHT,
            divider_height: crate::stack::DEFAULT_DIVIDER_HEIGHT,
            drag_origin: None,
            callbacks: DndStackCallbacks::default(),
            render_block: Rc::new(render_default_block),
        }
    }

    pub fn blocks(mut self, ids: impl IntoIterator<Item = impl Into<BlockId>>) -> Self {
        self.stack.initialize(ids);
        self
    }

    pub fn block_height(mut self, height: Pixels) -> Self {
        self.block_height = height;
        self
    }

    pub fn divider_height(mut self, height: Pixels) -> Self {
        self.divider_height = height;
        self.stack.set_divider_height(height);
        self
    }

    /// How long a dropped block takes to settle into its slot.
    pub fn snap_back_duration(mut self, duration: Duration) -> Self {
        self.stack.set_snap_back_duration(duration);
        self
    }

    /// Provide a callback invoked after a drop changed the order.
    pub fn on_reorder(mut self, on_reorder: impl Fn(&StackReorder, &[BlockId]) + 'static) -> Self {
        self.callbacks.on_reorder = Some(Rc::new(on_reorder));
        self
    }

    /// Replace all blocks. Any drag in progress is dropped without reordering.
    pub fn set_blocks(
        &mut self,
        ids: impl IntoIterator<Item = impl Into<BlockId>>,
        cx: &mut Context<Self>,
    ) {
        self.stack.initialize(ids);
        self.drag_origin = None;
        cx.notify();
    }

    pub fn order(&self) -> &[BlockId] {
        self.stack.order()
    }

    pub fn dragging(&self) -> Option<&BlockId> {
        self.stack.dragging()
    }

    pub fn active_divider(&self) -> Option<&ActiveDivider> {
        self.stack.active_divider()
    }

    pub(crate) fn is_dragging(&self, id: &BlockId) -> bool {
        self.stack.dragging() == Some(id)
    }

    pub(crate) fn on_block_mouse_down(
        &mut self,
        block_id: BlockId,
        motion: BlockMotion,
        position: Point<Pixels>,
        cx: &mut Context<Self>,
    ) {
        if self.stack.dragging().is_some() {
            return;
        }

        // Grab the block where it is drawn, even if it is still settling.
        let (offset, _) = motion.offset();
        self.drag_origin = Some(position - offset);
        self.stack.handle_drag(BlockDragEvent {
            block_id,
            motion,
            phase: DragPhase::Start,
        });
        cx.notify();
    }

    pub(crate) fn on_block_mouse_move(
        &mut self,
        block_id: &BlockId,
        motion: &BlockMotion,
        position: Point<Pixels>,
        cx: &mut Context<Self>,
    ) {
        let Some(origin) = self.drag_origin else {
            return;
        };

        motion.set_offset(position - origin);
        self.stack.handle_drag(BlockDragEvent {
            block_id: block_id.clone(),
            motion: motion.clone(),
            phase: DragPhase::Move { position },
        });
        cx.notify();
    }

    pub(crate) fn on_block_mouse_up(
        &mut self,
        block_id: &BlockId,
        motion: &BlockMotion,
        cx: &mut Context<Self>,
    ) {
        self.drag_origin = None;
        let reorder = self.stack.handle_drag(BlockDragEvent {
            block_id: block_id.clone(),
            motion: motion.clone(),
            phase: DragPhase::End,
        });
        cx.notify();

        if let Some(reorder) = reorder {
            if let Some(on_reorder) = self.callbacks.on_reorder.as_ref() {
                on_reorder(&reorder, self.stack.order());
            }
        }
    }
}

impl Render for DndStackState {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let render_block = Rc::clone(&self.render_block);
        let state_entity = cx.entity();
        let block_height = self.block_height;
        let divider_height = self.divider_height;

        let mut settling = false;
        let mut children = Vec::with_capacity(self.stack.order().len() * 2 + 1);
        children.push(
            Divider::new()
                .height(divider_height)
                .active(self.stack.is_top_divider_active())
                .into_any_element(),
        );

        for (ix, id) in self.stack.order().iter().enumerate() {
            let Some(slot) = self.stack.slot(id) else {
                continue;
            };

            let (offset, settled) = slot.motion().offset();
            settling |= !settled;

            let row_state = BlockRowState {
                dragging: self.stack.dragging() == Some(id),
            };
            let content = div()
                .relative()
                .left(offset.x)
                .top(offset.y)
                .w_full()
                .h(block_height)
                .child((render_block)(ix, id, row_state, window, cx));

            children.push(
                BlockElement::new(state_entity.clone(), id.clone(), slot.clone(), content)
                    .into_any_element(),
            );
            children.push(
                Divider::new()
                    .height(divider_height)
                    .active(self.stack.is_divider_active(id))
                    .into_any_element(),
            );
        }

        if settling {
            window.request_animation_frame();
        }

        v_flex().id("dnd-stack-state").w_full().children(children)
    }
}

fn render_default_block(
    _ix: usize,
    id: &BlockId,
    _row_state: BlockRowState,
    _window: &mut Window,
    _cx: &mut App,
) -> AnyElement {
    div()
        .size_full()
        .flex()
        .items_center()
        .px(px(8.))
        .bg(rgb(0x0000ff))
        .border_4()
        .border_color(rgb(0xff0000))
        .text_color(white())
        .text_sm()
        .child(id.clone())
        .into_any_element()
}

/// A vertical stack of blocks that can be reordered by dragging.
#[derive(IntoElement)]
pub struct DndStack {
    id: ElementId,
    state: Entity<DndStackState>,
    style: StyleRefinement,
    render_block: Option<Rc<RenderBlock>>,
}

impl DndStack {
    pub fn new(state: &Entity<DndStackState>) -> Self {
        Self {
            id: ElementId::Name(format!("dnd-stack-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_block: None,
        }
    }

    /// Replace the default block look. Dragging and drop handling stay with the stack.
    pub fn render_block(
        mut self,
        render_block: impl Fn(usize, &BlockId, BlockRowState, &mut Window, &mut App) -> AnyElement
        + 'static,
    ) -> Self {
        self.render_block = Some(Rc::new(render_block));
        self
    }
}

impl Styled for DndStack {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for DndStack {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        if let Some(render_block) = self.render_block {
            self.state
                .update(cx, |state, _| state.render_block = render_block);
        }

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .w_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
