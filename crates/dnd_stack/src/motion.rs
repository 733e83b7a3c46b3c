use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gpui::{Pixels, Point, point};

use crate::order::lerp;

struct MotionState {
    start: Instant,
    from: Point<Pixels>,
    to: Point<Pixels>,
    duration: Duration,
}

impl MotionState {
    fn at_rest(offset: Point<Pixels>) -> Self {
        Self {
            start: Instant::now(),
            from: offset,
            to: offset,
            duration: Duration::ZERO,
        }
    }

    fn sample(&self, now: Instant) -> (Point<Pixels>, bool) {
        if self.from == self.to || self.duration.as_secs_f32() <= 0.0 {
            return (self.to, true);
        }

        let elapsed = now.saturating_duration_since(self.start);
        let mut t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        if t >= 1.0 {
            return (self.to, true);
        }

        t = t.clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        let value = point(
            lerp(self.from.x, self.to.x, eased),
            lerp(self.from.y, self.to.y, eased),
        );
        (value, false)
    }
}

/// Animation handle for a block's cosmetic offset.
///
/// Clones share the same state, so the stack can snap a block back while the
/// block element keeps sampling it during paint.
#[derive(Clone)]
pub struct BlockMotion {
    state: Rc<RefCell<MotionState>>,
}

impl Default for BlockMotion {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(MotionState::at_rest(Point::default()))),
        }
    }
}

impl BlockMotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `offset` without animating.
    pub fn set_offset(&self, offset: Point<Pixels>) {
        *self.state.borrow_mut() = MotionState::at_rest(offset);
    }

    /// Shift the current offset by `delta`, cancelling any running animation.
    pub fn translate(&self, delta: Point<Pixels>) {
        let (current, _) = self.sample_at(Instant::now());
        self.set_offset(current + delta);
    }

    /// Ease from the current offset to `target` over `duration`.
    pub fn start(&self, target: Point<Pixels>, duration: Duration) {
        self.start_at(target, duration, Instant::now());
    }

    pub(crate) fn start_at(&self, target: Point<Pixels>, duration: Duration, now: Instant) {
        let (current, _) = self.sample_at(now);
        *self.state.borrow_mut() = MotionState {
            start: now,
            from: current,
            to: target,
            duration,
        };
    }

    /// Current offset, and whether the animation has settled.
    pub fn offset(&self) -> (Point<Pixels>, bool) {
        self.sample_at(Instant::now())
    }

    pub(crate) fn sample_at(&self, now: Instant) -> (Point<Pixels>, bool) {
        self.state.borrow().sample(now)
    }

    pub fn target(&self) -> Point<Pixels> {
        self.state.borrow().to
    }
}

#[cfg(test)]
mod tests {
    use gpui::px;

    use super::*;

    #[test]
    fn set_offset_is_immediate() {
        let motion = BlockMotion::new();
        motion.set_offset(point(px(4.), px(-12.)));
        assert_eq!(motion.offset(), (point(px(4.), px(-12.)), true));
    }

    #[test]
    fn start_eases_to_target() {
        let motion = BlockMotion::new();
        motion.set_offset(point(px(0.), px(100.)));

        let now = Instant::now();
        motion.start_at(Point::default(), Duration::from_millis(200), now);

        let (halfway, done) = motion.sample_at(now + Duration::from_millis(100));
        assert!(!done);
        assert_eq!(halfway, point(px(0.), px(50.)));

        let (end, done) = motion.sample_at(now + Duration::from_millis(200));
        assert!(done);
        assert_eq!(end, Point::default());
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let motion = BlockMotion::new();
        motion.set_offset(point(px(10.), px(10.)));
        motion.start(Point::default(), Duration::ZERO);
        assert_eq!(motion.offset(), (Point::default(), true));
    }

    #[test]
    fn clones_share_state() {
        let motion = BlockMotion::new();
        let handle = motion.clone();
        handle.set_offset(point(px(1.), px(2.)));
        assert_eq!(motion.target(), point(px(1.), px(2.)));
    }

    #[test]
    fn translate_adds_to_resting_offset() {
        let motion = BlockMotion::new();
        motion.set_offset(point(px(3.), px(5.)));
        motion.translate(point(px(0.), px(-53.)));
        assert_eq!(motion.offset(), (point(px(3.), px(-48.)), true));
    }
}
