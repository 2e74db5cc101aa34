//! Timed interpolation of slice geometry and fill.
//!
//! Times are offsets from an arbitrary origin (see `visualization::Clock`) so
//! that every animation can be evaluated at any instant without a timer.

use serde::Serialize;
use std::time::Duration;

use crate::color::Rgb;
use crate::pie::Angles;

/// Cubic ease-in-out, the default easing of chart transitions
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Progress of a transition started at `started`, in `[0, 1]`
fn progress(started: Duration, duration: Duration, now: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(started);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// Reconciliation category of a rendered slice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
    Steady,
}

/// Animated change of a slice's angular extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcTween {
    pub from: Angles,
    pub to: Angles,
    pub started: Duration,
    pub duration: Duration,
}

impl ArcTween {
    /// A tween that is already at rest
    pub fn steady(angles: Angles) -> Self {
        ArcTween {
            from: angles,
            to: angles,
            started: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    /// New slice: the start angle sweeps back from the end angle
    pub fn enter(target: Angles, now: Duration, duration: Duration) -> Self {
        ArcTween {
            from: Angles::new(target.end, target.end),
            to: target,
            started: now,
            duration,
        }
    }

    /// Changed slice: both angles move from what is displayed to the target
    pub fn update(displayed: Angles, target: Angles, now: Duration, duration: Duration) -> Self {
        ArcTween {
            from: displayed,
            to: target,
            started: now,
            duration,
        }
    }

    /// Removed slice: the start angle closes in on the end angle
    pub fn exit(displayed: Angles, now: Duration, duration: Duration) -> Self {
        ArcTween {
            from: displayed,
            to: Angles::new(displayed.end, displayed.end),
            started: now,
            duration,
        }
    }

    pub fn at(&self, now: Duration) -> Angles {
        let t = ease_cubic_in_out(progress(self.started, self.duration, now));
        self.from.lerp(&self.to, t)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        progress(self.started, self.duration, now) >= 1.0
    }
}

/// Animated change of a slice's fill color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillTween {
    pub from: Rgb,
    pub to: Rgb,
    pub started: Duration,
    pub duration: Duration,
}

impl FillTween {
    pub fn steady(color: Rgb) -> Self {
        FillTween {
            from: color,
            to: color,
            started: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    /// Starts a new fade from whatever is displayed at `now`
    pub fn retarget(&self, to: Rgb, now: Duration, duration: Duration) -> Self {
        FillTween {
            from: self.at(now),
            to,
            started: now,
            duration,
        }
    }

    pub fn at(&self, now: Duration) -> Rgb {
        let t = ease_cubic_in_out(progress(self.started, self.duration, now));
        self.from.lerp(&self.to, t)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        progress(self.started, self.duration, now) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn easing_is_symmetric_and_pinned() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1e-12);
        assert_eq!(ease_cubic_in_out(2.0), 1.0);
    }

    #[test]
    fn enter_grows_from_zero_width() {
        let tween = ArcTween::enter(Angles::new(1.0, 2.0), ms(100), ms(500));
        assert_eq!(tween.at(ms(100)), Angles::new(2.0, 2.0));
        assert_eq!(tween.at(ms(350)), Angles::new(1.5, 2.0));
        assert_eq!(tween.at(ms(600)), Angles::new(1.0, 2.0));
        assert!(!tween.is_finished(ms(599)));
        assert!(tween.is_finished(ms(600)));
    }

    #[test]
    fn exit_collapses_onto_the_end_angle() {
        let tween = ArcTween::exit(Angles::new(0.0, 3.0), ms(0), ms(500));
        assert_eq!(tween.at(ms(0)), Angles::new(0.0, 3.0));
        assert_eq!(tween.at(ms(500)), Angles::new(3.0, 3.0));
    }

    #[test]
    fn update_moves_both_angles() {
        let tween = ArcTween::update(Angles::new(0.0, 1.0), Angles::new(1.0, 3.0), ms(0), ms(500));
        assert_eq!(tween.at(ms(250)), Angles::new(0.5, 2.0));
        assert_eq!(tween.at(ms(10_000)), Angles::new(1.0, 3.0));
    }

    #[test]
    fn fill_retarget_starts_from_displayed_color() {
        let fill = FillTween::steady(Rgb(0, 0, 0)).retarget(Rgb(200, 200, 200), ms(0), ms(300));
        assert_eq!(fill.at(ms(150)), Rgb(100, 100, 100));

        let back = fill.retarget(Rgb(0, 0, 0), ms(150), ms(300));
        assert_eq!(back.at(ms(150)), Rgb(100, 100, 100));
        assert_eq!(back.at(ms(450)), Rgb(0, 0, 0));
        assert!(back.is_finished(ms(450)));
    }
}
