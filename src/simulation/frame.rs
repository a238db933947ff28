//! Frame cadence and the paint seam.

/// One node's paint data for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeFrame<'a> {
    pub index: usize,
    pub id: &'a str,
    pub x: f32,
    pub y: f32,
    /// Emphasis scale factor (not the radius).
    pub scale: f32,
}

/// Receives the node positions of every emitted frame.
pub trait FrameSink {
    fn node(&mut self, frame: NodeFrame<'_>);

    /// Called once after the last node of a frame.
    fn end_frame(&mut self) {}
}

impl<F> FrameSink for F
where
    F: FnMut(NodeFrame<'_>),
{
    fn node(&mut self, frame: NodeFrame<'_>) {
        self(frame)
    }
}

/// Discards host ticks that arrive sooner than the frame interval.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FrameThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_ms: None,
        }
    }

    /// Whether a tick at `now_ms` should run. Accepting records the time.
    ///
    /// A clock that jumps backwards restarts the cadence.
    pub fn accept(&mut self, now_ms: f64) -> bool {
        if !now_ms.is_finite() {
            return false;
        }
        match self.last_ms {
            Some(last) if now_ms >= last && now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_cadence() {
        let mut throttle = FrameThrottle::new(16.0);

        assert!(throttle.accept(0.0));
        assert!(!throttle.accept(8.0));
        assert!(!throttle.accept(15.9));
        assert!(throttle.accept(16.0));
        assert!(!throttle.accept(20.0));
        assert!(throttle.accept(40.0));
    }

    #[test]
    fn test_throttle_clock_reset() {
        let mut throttle = FrameThrottle::new(16.0);
        assert!(throttle.accept(1000.0));
        assert!(throttle.accept(5.0));
        assert!(!throttle.accept(10.0));
        assert!(throttle.accept(21.0));
    }

    #[test]
    fn test_throttle_rejects_non_finite() {
        let mut throttle = FrameThrottle::new(16.0);
        assert!(!throttle.accept(f64::NAN));
        assert!(throttle.accept(0.0));
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |frame: NodeFrame<'_>| seen.push((frame.id.to_string(), frame.x));
        sink.node(NodeFrame {
            index: 0,
            id: "root",
            x: 1.0,
            y: 2.0,
            scale: 1.0,
        });
        sink.end_frame();
        assert_eq!(seen, vec![("root".to_string(), 1.0)]);
    }
}
