use gpui::{
    App, IntoElement, Pixels, RenderOnce, Rgba, Styled as _, Window, div,
    prelude::FluentBuilder as _, rgb,
};

use crate::stack::DEFAULT_DIVIDER_HEIGHT;

fn active_divider_color() -> Rgba {
    rgb(0x2b95d6)
}

/// Drop indicator drawn between blocks.
#[derive(IntoElement)]
pub struct Divider {
    active: bool,
    height: Pixels,
}

impl Divider {
    pub fn new() -> Self {
        Self {
            active: false,
            height: DEFAULT_DIVIDER_HEIGHT,
        }
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn height(mut self, height: Pixels) -> Self {
        self.height = height;
        self
    }
}

impl Default for Divider {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOnce for Divider {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        div()
            .w_full()
            .h(self.height)
            .flex_shrink_0()
            .when(self.active, |this| this.bg(active_divider_color()))
    }
}
