//! Animation: Step parameters and a value interpolator.
//!
//! The screen steps the component tree only when someone asked for a frame
//! since the previous step. Each step carries the time elapsed since the
//! last one, so animations advance by wall-clock time rather than by tick
//! count.

use crate::screen::ScreenHandle;
use std::time::Duration;

/// Parameters of one animation step.
#[derive(Debug, Clone)]
pub struct Params {
    duration: Duration,
    screen: Option<ScreenHandle>,
}

impl Params {
    /// A step covering `duration`, detached from any screen.
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            screen: None,
        }
    }

    pub(crate) const fn with_screen(duration: Duration, screen: ScreenHandle) -> Self {
        Self {
            duration,
            screen: Some(screen),
        }
    }

    /// The time this step represents.
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Ask the stepping screen for another step. No-op when detached.
    pub fn request_animation_frame(&self) {
        if let Some(screen) = &self.screen {
            screen.request_animation_frame();
        }
    }
}

/// Easing curves mapping progress in `[0, 1]` to `[0, 1]`.
pub mod easing {
    /// An easing curve.
    pub type Function = fn(f32) -> f32;

    /// Constant speed.
    pub fn linear(p: f32) -> f32 {
        p
    }

    /// Accelerating from zero velocity.
    pub fn quadratic_in(p: f32) -> f32 {
        p * p
    }

    /// Decelerating to zero velocity.
    pub fn quadratic_out(p: f32) -> f32 {
        -(p * (p - 2.0))
    }

    /// Accelerating then decelerating.
    pub fn quadratic_in_out(p: f32) -> f32 {
        if p < 0.5 {
            2.0 * p * p
        } else {
            (-2.0 * p * p) + (4.0 * p) - 1.0
        }
    }

    /// Cubic deceleration.
    pub fn cubic_out(p: f32) -> f32 {
        let f = p - 1.0;
        f * f * f + 1.0
    }

    /// Quarter sine wave.
    pub fn sine_in_out(p: f32) -> f32 {
        0.5 * (1.0 - (p * std::f32::consts::PI).cos())
    }
}

/// Moves a value from its current state to a target over a duration.
///
/// Feed it every [`Params`] the owning component receives; it asks for the
/// next frame until the target is reached.
#[derive(Debug, Clone)]
pub struct Animator {
    from: f32,
    to: f32,
    duration: Duration,
    easing: easing::Function,
    /// Signed progress in seconds; negative while the start is delayed.
    current: f64,
}

impl Animator {
    /// Animate from `from` to `to` over `duration`.
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            easing: easing::linear,
            current: 0.0,
        }
    }

    /// Use `easing` instead of a linear curve.
    #[must_use]
    pub fn with_easing(mut self, easing: easing::Function) -> Self {
        self.easing = easing;
        self
    }

    /// Hold the start value for `delay` first.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.current = -delay.as_secs_f64();
        self
    }

    /// Target value.
    pub const fn to(&self) -> f32 {
        self.to
    }

    /// Whether the target has been reached.
    pub fn is_done(&self) -> bool {
        self.current >= self.duration.as_secs_f64()
    }

    /// Advance by one step and return the value to display.
    #[allow(clippy::cast_possible_truncation)]
    pub fn on_animation(&mut self, params: &Params) -> f32 {
        self.current += params.duration().as_secs_f64();
        if self.is_done() {
            return self.to;
        }
        params.request_animation_frame();
        if self.current <= 0.0 {
            return self.from;
        }
        let progress = (self.current / self.duration.as_secs_f64()) as f32;
        self.from + (self.to - self.from) * (self.easing)(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(millis: u64) -> Params {
        Params::new(Duration::from_millis(millis))
    }

    #[test]
    fn test_easing_endpoints() {
        let curves: [easing::Function; 6] = [
            easing::linear,
            easing::quadratic_in,
            easing::quadratic_out,
            easing::quadratic_in_out,
            easing::cubic_out,
            easing::sine_in_out,
        ];
        for curve in curves {
            assert!(curve(0.0).abs() < 1e-6);
            assert!((curve(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_animator_reaches_target() {
        let mut animator = Animator::new(0.0, 10.0, Duration::from_millis(100));
        let value = animator.on_animation(&step(50));
        assert!((value - 5.0).abs() < 1e-4);
        assert!(!animator.is_done());

        assert!((animator.on_animation(&step(60)) - 10.0).abs() < f32::EPSILON);
        assert!(animator.is_done());
    }

    #[test]
    fn test_animator_delay_holds_start() {
        let mut animator =
            Animator::new(2.0, 4.0, Duration::from_millis(10)).with_delay(Duration::from_millis(20));
        assert!((animator.on_animation(&step(15)) - 2.0).abs() < f32::EPSILON);
        // Half way through once the delay is over.
        assert!((animator.on_animation(&step(10)) - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_request_frame_reaches_screen() {
        use crate::screen::ScreenShared;
        use std::sync::Arc;

        let shared = Arc::new(ScreenShared::new());
        let params = Params::with_screen(
            Duration::from_millis(1),
            ScreenHandle::from_shared(Arc::clone(&shared)),
        );
        let mut animator = Animator::new(0.0, 1.0, Duration::from_secs(1));
        animator.on_animation(&params);
        assert!(shared.animation_requested());
    }
}
