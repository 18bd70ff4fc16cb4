use crate::shared::pixel_rect::PixelRect;

/// Maps an out-of-range index back inside `[0, len)` by mirroring around
/// the edge pixels without repeating them (`gfedcb|abcdefgh|gfedcba`).
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = (len - 1) as isize;
    let period = 2 * last;
    let mut i = index.rem_euclid(period);
    if i > last {
        i = period - i;
    }
    i as usize
}

/// Sum of `at(reflect_101(i))` over the window `[start, start + k)`.
///
/// Reflect-101 repeats every `2·(len-1)` samples, so whole periods are
/// summed once and multiplied. Cost is bounded by the period, not by `k`.
fn window_sum(start: isize, k: usize, len: usize, at: impl Fn(usize) -> u128) -> u128 {
    if len <= 1 {
        return k as u128 * at(0);
    }
    let period = 2 * (len - 1);
    let full = (k / period) as u128;
    let rem = (k % period) as isize;

    let mut sum: u128 = (0..rem).map(|i| at(reflect_101(start + i, len))).sum();
    if full > 0 {
        let cycle: u128 = (0..period as isize).map(|i| at(reflect_101(i, len))).sum();
        sum += full * cycle;
    }
    sum
}

/// Apply a separable `kernel_size × kernel_size` mean filter, reusing `temp`.
///
/// The window for position `p` spans `[p - k/2, p - k/2 + k)`, with
/// reflect-101 borders. A kernel of 1 leaves the data unchanged. Any
/// kernel up to `u32::MAX` is exact: row sums fit `u64` and the 2-D sums
/// are taken in `u128`.
pub fn separable_box_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel_size: usize,
    temp: &mut Vec<u64>,
) {
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let k = kernel_size as isize;
    let anchor = (kernel_size / 2) as isize;

    temp.clear();
    temp.resize(width * height * channels, 0);

    // Horizontal pass: running window sums, data → temp
    for y in 0..height {
        let row = y * width;
        for c in 0..channels {
            let px = |x: usize| data[(row + x) * channels + c] as u128;
            let at = |x: isize| px(reflect_101(x, width));
            let mut sum = window_sum(-anchor, kernel_size, width, &px);
            temp[row * channels + c] = sum as u64;
            for x in 1..width as isize {
                sum += at(x - anchor + k - 1);
                sum -= at(x - anchor - 1);
                temp[(row + x as usize) * channels + c] = sum as u64;
            }
        }
    }

    // Vertical pass: temp → data, normalised with rounding
    let area = (kernel_size as u128) * (kernel_size as u128);
    for x in 0..width {
        for c in 0..channels {
            let px = |y: usize| temp[(y * width + x) * channels + c] as u128;
            let at = |y: isize| px(reflect_101(y, height));
            let mut sum = window_sum(-anchor, kernel_size, height, &px);
            data[x * channels + c] = mean(sum, area);
            for y in 1..height as isize {
                sum += at(y - anchor + k - 1);
                sum -= at(y - anchor - 1);
                data[(y as usize * width + x) * channels + c] = mean(sum, area);
            }
        }
    }
}

fn mean(sum: u128, area: u128) -> u8 {
    ((sum + area / 2) / area).min(255) as u8
}

/// Extract a rectangular ROI from frame data into a reusable buffer.
pub fn extract_roi(
    data: &[u8],
    frame_width: usize,
    channels: usize,
    rect: PixelRect,
    roi: &mut Vec<u8>,
) {
    let (x, y, w, h) = (rect.x as usize, rect.y as usize, rect.w as usize, rect.h as usize);
    roi.resize(w * h * channels, 0);
    for row in 0..h {
        let src_offset = ((y + row) * frame_width + x) * channels;
        let dst_offset = row * w * channels;
        roi[dst_offset..dst_offset + w * channels]
            .copy_from_slice(&data[src_offset..src_offset + w * channels]);
    }
}

/// Write a blurred ROI buffer back into frame data.
pub fn write_roi_back(
    data: &mut [u8],
    roi: &[u8],
    frame_width: usize,
    channels: usize,
    rect: PixelRect,
) {
    let (x, y, w, h) = (rect.x as usize, rect.y as usize, rect.w as usize, rect.h as usize);
    for row in 0..h {
        let dst_offset = ((y + row) * frame_width + x) * channels;
        let src_offset = row * w * channels;
        data[dst_offset..dst_offset + w * channels]
            .copy_from_slice(&roi[src_offset..src_offset + w * channels]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn blur(data: &mut [u8], w: usize, h: usize, c: usize, k: usize) {
        let mut temp = Vec::new();
        separable_box_blur(data, w, h, c, k, &mut temp);
    }

    #[rstest]
    #[case(-1, 5, 1)]
    #[case(-2, 5, 2)]
    #[case(5, 5, 3)]
    #[case(6, 5, 2)]
    #[case(0, 5, 0)]
    #[case(4, 5, 4)]
    #[case(-7, 3, 1)]
    #[case(3, 1, 0)]
    fn test_reflect_101(#[case] index: isize, #[case] len: usize, #[case] expected: usize) {
        assert_eq!(reflect_101(index, len), expected);
    }

    #[test]
    fn test_kernel_one_is_noop() {
        let mut data: Vec<u8> = (0..48).map(|v| (v * 5) as u8).collect();
        let original = data.clone();
        blur(&mut data, 4, 4, 3, 1);
        assert_eq!(data, original);
    }

    #[test]
    fn test_uniform_input_stays_uniform() {
        let mut data = vec![77u8; 10 * 6 * 3];
        blur(&mut data, 10, 6, 3, 5);
        assert!(data.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_single_channel_row_mean() {
        // 1-row image: [0, 0, 90, 0, 0] with k=3
        // x=2 window {0,90,0} horizontally; vertically reflect of a 1-row
        // image repeats the same row, so mean = 90*3 / 9 = 30
        let mut data = vec![0u8, 0, 90, 0, 0];
        blur(&mut data, 5, 1, 1, 3);
        assert_eq!(data, vec![0, 30, 30, 30, 0]);
    }

    #[test]
    fn test_even_kernel_window_is_anchored_at_half() {
        // k=2, anchor=1: window for x is [x-1, x]
        // row [0, 100, 0, 0]; reflect(-1) = 1 → x=0 sees {100, 0}
        let mut data = vec![0u8, 100, 0, 0];
        blur(&mut data, 4, 1, 1, 2);
        // vertical: 1-row, window {row0, row0} → factor 2/4
        assert_eq!(data, vec![50, 50, 50, 0]);
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let mut data = vec![0u8, 255, 0, 255];
        blur(&mut data, 2, 2, 1, 9);
        // Every output is some average of the inputs
        assert!(data.iter().all(|&v| v > 0 && v < 255));
    }

    /// Direct evaluation of the same filter, one full window per pixel.
    fn naive_blur(data: &[u8], w: usize, h: usize, k: usize) -> Vec<u8> {
        let anchor = (k / 2) as isize;
        let area = (k * k) as u64;
        let mut out = vec![0u8; data.len()];
        for y in 0..h {
            for x in 0..w {
                let mut sum = 0u64;
                for dy in 0..k as isize {
                    for dx in 0..k as isize {
                        let sy = reflect_101(y as isize - anchor + dy, h);
                        let sx = reflect_101(x as isize - anchor + dx, w);
                        sum += data[sy * w + sx] as u64;
                    }
                }
                out[y * w + x] = ((sum + area / 2) / area) as u8;
            }
        }
        out
    }

    #[rstest]
    #[case(5, 4, 3)]
    #[case(4, 3, 7)]
    #[case(3, 5, 11)]
    #[case(6, 2, 20)]
    fn test_matches_direct_window_evaluation(
        #[case] w: usize,
        #[case] h: usize,
        #[case] k: usize,
    ) {
        let original: Vec<u8> = (0..w * h).map(|i| ((i * 37 + 11) % 256) as u8).collect();
        let mut data = original.clone();
        blur(&mut data, w, h, 1, k);
        assert_eq!(data, naive_blur(&original, w, h, k));
    }

    #[rstest]
    #[case(20_000_000)]
    #[case(u32::MAX as usize)]
    fn test_huge_kernel_keeps_uniform_input(#[case] k: usize) {
        let mut data = vec![255u8; 2 * 2 * 3];
        blur(&mut data, 2, 2, 3, k);
        assert!(data.iter().all(|&v| v == 255), "got {data:?}");

        let mut data = vec![200u8; 7 * 5];
        blur(&mut data, 7, 5, 1, k);
        assert!(data.iter().all(|&v| v == 200), "got {data:?}");
    }

    #[test]
    fn test_window_sum_counts_whole_periods() {
        // [1, 2, 3] reflects as ...2 | 1 2 3 | 2 1... with period 4: {1,2,3,2}
        let values = [1u128, 2, 3];
        let at = |i: usize| values[i];
        assert_eq!(window_sum(0, 4, 3, at), 8);
        assert_eq!(window_sum(-1, 9, 3, at), 2 * 8 + 2);
        assert_eq!(window_sum(0, 6, 1, |_| 5), 30);
    }

    #[test]
    fn test_extract_and_write_back_roundtrip() {
        let data: Vec<u8> = (0..(6 * 5 * 3)).map(|v| v as u8).collect();
        let rect = PixelRect::new(1, 2, 3, 2);
        let mut roi = Vec::new();
        extract_roi(&data, 6, 3, rect, &mut roi);
        assert_eq!(roi.len(), 3 * 2 * 3);
        assert_eq!(roi[0], data[(2 * 6 + 1) * 3]);

        let mut target = vec![0u8; data.len()];
        write_roi_back(&mut target, &roi, 6, 3, rect);
        assert_eq!(target[(3 * 6 + 3) * 3 + 2], data[(3 * 6 + 3) * 3 + 2]);
        assert_eq!(target[0], 0);
    }
}
