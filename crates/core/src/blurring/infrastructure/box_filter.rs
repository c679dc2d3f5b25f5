//! Normalized box filter over interleaved 8-bit pixel buffers.
//!
//! Each output pixel is the rounded mean of the `kw × kh` neighbourhood
//! anchored at `(kw / 2, kh / 2)`. Samples outside the buffer are mirrored
//! without repeating the edge pixel (`dcb|abcd|cba`).

/// Maps an out-of-range index into `0..n` by reflect-101 mirroring.
pub(crate) fn reflect_101(i: i64, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as i64 - 1);
    let m = i.rem_euclid(period);
    if m >= n as i64 {
        (period - m) as usize
    } else {
        m as usize
    }
}

/// Box-blurs `buf` (`width × height × channels`, row-major) in place.
///
/// `sums` is scratch space reused across calls.
pub(crate) fn box_blur(
    buf: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel_w: usize,
    kernel_h: usize,
    sums: &mut Vec<u64>,
) {
    if width == 0 || height == 0 || (kernel_w <= 1 && kernel_h <= 1) {
        return;
    }
    debug_assert_eq!(buf.len(), width * height * channels);

    sums.clear();
    sums.resize(width * height * channels, 0);

    horizontal_sums(buf, sums, width, height, channels, kernel_w);

    let area = (kernel_w * kernel_h) as u64;
    let anchor = (kernel_h / 2) as i64;
    let row_len = width * channels;
    let mut column = vec![0u64; row_len];

    // Vertical pass: sliding window over the row sums, per column.
    for (i, acc) in column.iter_mut().enumerate() {
        *acc = (0..kernel_h as i64)
            .map(|k| sums[reflect_101(k - anchor, height) * row_len + i])
            .sum();
    }
    for y in 0..height {
        if y > 0 {
            let add = reflect_101(y as i64 - 1 + kernel_h as i64 - anchor, height) * row_len;
            let sub = reflect_101(y as i64 - 1 - anchor, height) * row_len;
            for (i, acc) in column.iter_mut().enumerate() {
                *acc = *acc + sums[add + i] - sums[sub + i];
            }
        }
        let out = &mut buf[y * row_len..(y + 1) * row_len];
        for (px, &acc) in out.iter_mut().zip(column.iter()) {
            *px = ((acc + area / 2) / area) as u8;
        }
    }
}

fn horizontal_sums(
    buf: &[u8],
    sums: &mut [u64],
    width: usize,
    height: usize,
    channels: usize,
    kernel_w: usize,
) {
    let anchor = (kernel_w / 2) as i64;
    let row_len = width * channels;
    let sample = |row: &[u8], x: i64, c: usize| row[reflect_101(x, width) * channels + c] as u64;

    for y in 0..height {
        let row = &buf[y * row_len..(y + 1) * row_len];
        let out = &mut sums[y * row_len..(y + 1) * row_len];
        for c in 0..channels {
            let mut acc: u64 = (0..kernel_w as i64).map(|k| sample(row, k - anchor, c)).sum();
            out[c] = acc;
            for x in 1..width {
                let xi = x as i64;
                acc = acc + sample(row, xi - 1 + kernel_w as i64 - anchor, c)
                    - sample(row, xi - 1 - anchor, c);
                out[x * channels + c] = acc;
            }
        }
    }
}
