use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::{h_flex, v_flex};
use gpui_dnd_stack::{BlockId, DndStackState, dnd_stack};

pub struct DndStackExample {
    stack: Entity<DndStackState>,
    generation: usize,
    _subscriptions: Vec<Subscription>,
}

impl DndStackExample {
    pub fn view(_window: &mut Window, cx: &mut App) -> Entity<Self> {
        let stack = cx.new(|cx| {
            DndStackState::new(cx)
                .blocks(demo_blocks(0))
                .on_reorder(|reorder, order| {
                    tracing::info!(
                        block = %reorder.block_id,
                        from = reorder.from,
                        to = reorder.to,
                        order = ?order,
                        "stack reordered"
                    );
                })
        });

        cx.new(|cx| {
            let _subscriptions = vec![cx.observe(&stack, |_, _, cx| cx.notify())];
            Self {
                stack,
                generation: 0,
                _subscriptions,
            }
        })
    }

    fn reset(&mut self, cx: &mut Context<Self>) {
        self.generation += 1;
        let blocks = demo_blocks(self.generation);
        self.stack
            .update(cx, |stack, cx| stack.set_blocks(blocks, cx));
    }
}

impl Render for DndStackExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let muted_foreground = cx.theme().muted_foreground;
        let border = cx.theme().border;
        let background = cx.theme().background;
        let state = self.stack.read(cx);
        let dragging = state
            .dragging()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<none>".to_string());
        let divider = state
            .active_divider()
            .map(|divider| format!("{divider:?}"))
            .unwrap_or_else(|| "<none>".to_string());
        let dump = state
            .order()
            .iter()
            .enumerate()
            .map(|(ix, id)| format!("{ix:02}  {id}"))
            .collect::<Vec<_>>()
            .join("\n");

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("DnD Stack"),
                    )
                    .child(div().text_sm().text_color(muted_foreground).child(
                        "Drag a block up or down. The highlighted divider shows where it will land; releasing over its own gap leaves the order unchanged.",
                    ))
                    .child(
                        div()
                            .text_sm()
                            .text_color(muted_foreground)
                            .child(format!("Dragging: {dragging}  Divider: {divider}")),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .items_start()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .gap_y_2()
                            .child(
                                h_flex()
                                    .justify_between()
                                    .child(
                                        div()
                                            .text_sm()
                                            .font_weight(FontWeight::MEDIUM)
                                            .child("Stack"),
                                    )
                                    .child(
                                        Button::new("reset")
                                            .ghost()
                                            .label("Reset")
                                            .tooltip("Replace the stack with fresh blocks")
                                            .on_click(cx.listener(|this, _, _window, cx| {
                                                this.reset(cx);
                                            })),
                                    ),
                            )
                            .child(
                                div()
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(border)
                                    .bg(background)
                                    .p(px(12.))
                                    .child(dnd_stack(&self.stack)),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (current order)"),
                            )
                            .child(
                                div()
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(border)
                                    .bg(background)
                                    .p(px(12.))
                                    .child(render_dump(dump)),
                            ),
                    ),
            )
    }
}

fn render_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn demo_blocks(generation: usize) -> Vec<BlockId> {
    ["alpha", "bravo", "charlie", "delta", "echo"]
        .iter()
        .map(|name| BlockId::from(format!("{name}-{generation}")))
        .collect()
}
