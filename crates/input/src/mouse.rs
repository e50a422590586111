/// Converts absolute cursor positions into look offsets.
#[derive(Debug, Clone, Default)]
pub struct MouseLook {
    last: Option<(f64, f64)>,
}

impl MouseLook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last sample so the next one is treated as the first.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Returns `(dx, dy)` with y reversed, since window coordinates grow
    /// downward. The first sample only primes the tracker.
    pub fn sample(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let offset = self
            .last
            .map(|(last_x, last_y)| ((x - last_x) as f32, (last_y - y) as f32));
        self.last = Some((x, y));
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_suppressed() {
        let mut look = MouseLook::new();
        assert_eq!(look.sample(400.0, 300.0), None);
        assert_eq!(look.sample(410.0, 290.0), Some((10.0, 10.0)));
    }

    #[test]
    fn reset_suppresses_again() {
        let mut look = MouseLook::new();
        look.sample(0.0, 0.0);
        look.sample(5.0, 5.0);
        look.reset();
        assert_eq!(look.sample(500.0, 500.0), None);
        assert_eq!(look.sample(500.0, 510.0), Some((0.0, -10.0)));
    }
}
