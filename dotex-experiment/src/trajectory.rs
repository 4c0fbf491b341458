use dotex_core::Segment;

pub const DEFAULT_BOUNCES: usize = 3;
pub const DEFAULT_TOTAL_TIME: f64 = 24000.0;

/// Zig-zag path with `bounces * 2` legs of equal duration.
///
/// Even legs run left to right, odd legs right to left, and every leg drops
/// by `height / (bounces * 2)`, so the path covers the full width on each leg
/// and the full height overall.
pub fn generate_zigzag(width: f64, height: f64, bounces: usize, total_time: f64) -> Vec<Segment> {
    let legs = bounces * 2;
    let segment_height = height / legs as f64;
    let segment_time = total_time / legs as f64;

    (0..legs)
        .map(|leg| {
            let (start_x, end_x) = if leg % 2 == 0 { (0.0, width) } else { (width, 0.0) };
            Segment {
                start_x,
                start_y: segment_height * leg as f64,
                end_x,
                end_y: segment_height * (leg + 1) as f64,
                duration: segment_time,
            }
        })
        .collect()
}
