//! Mid/side stereo widener. Width 0 collapses to mono, 0.5 passes the
//! signal unchanged, 1 removes the mid entirely.

#[derive(Debug, Clone, Copy)]
pub struct StereoWidener {
    pub width: f64,
}

impl StereoWidener {
    pub fn new(width: f64) -> Self {
        StereoWidener {
            width: width.clamp(0.0, 1.0),
        }
    }

    pub fn process(&self, left: f64, right: f64) -> (f64, f64) {
        let mid = (left + right) / 2.0;
        let side = (right - left) / 2.0;
        let mid_gain = 2.0 * (1.0 - self.width);
        let side_gain = 2.0 * self.width;
        (
            mid * mid_gain - side * side_gain,
            mid * mid_gain + side * side_gain,
        )
    }
}
