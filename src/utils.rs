/// Exact expected number of occupied tables after `n` customers,
/// `E[K] = sum_{i=0}^{n-1} alpha / (alpha + i)`.
///
/// Grows like `alpha * ln(n)` for large `n`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn expected_tables(alpha: f64, n: usize) -> f64 {
    (0..n).map(|i| alpha / (alpha + i as f64)).sum()
}

/// Render occupancy counts as one bar row per table, scaled so the largest
/// table spans `width` glyphs.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn occupancy_bars(counts: &[usize], width: usize) -> String {
    const BAR: char = '\u{2588}'; // U+2588 FULL BLOCK
    const AXIS: char = '\u{2502}'; // U+2502 BOX DRAWINGS LIGHT VERTICAL

    let max = counts.iter().copied().max().unwrap_or(0);

    let mut out = String::new();
    for (table, &count) in counts.iter().enumerate() {
        let bar_len = if max == 0 {
            0
        } else {
            (width as f64 * count as f64 / max as f64).round() as usize
        };

        out.push_str(&format!("{table:>4} {AXIS}"));
        out.extend(std::iter::repeat(BAR).take(bar_len));
        out.push_str(&format!(" {count}\n"));
    }

    out
}
