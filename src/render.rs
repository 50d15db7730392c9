use crate::patterns::PatternSummary;
use crate::types::BarCut;

const MAX_WIDTH: f64 = 80.0;
const BAR_HEIGHT: usize = 2;

/// Draws one bar to scale, each piece boxed and labelled with its length and
/// the offcut hatched.
pub fn render_bar(bar_length: u32, bar: &BarCut) -> String {
    if bar_length == 0 {
        return String::new();
    }
    let scale = MAX_WIDTH / bar_length as f64;
    let grid_w = (bar_length as f64 * scale).round() as usize;

    let mut grid = vec![vec![' '; grid_w + 1]; BAR_HEIGHT + 1];

    draw_box(&mut grid, 0, grid_w);

    let mut offset = 0u64;
    let mut sx = 0usize;
    for &length in &bar.pieces {
        offset += length as u64;
        let ex = ((offset as f64 * scale).round() as usize).min(grid_w);
        let sw = ex.saturating_sub(sx);
        if sw == 0 {
            continue;
        }
        draw_box(&mut grid, sx, sw);

        let label: Vec<char> = length.to_string().chars().collect();
        if sw > label.len() {
            let start_x = sx + (sw - label.len()) / 2 + 1;
            for (i, &ch) in label.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw {
                    grid[1][x] = ch;
                }
            }
        }
        sx = ex;
    }

    if bar.waste > 0 {
        for x in sx + 1..grid_w {
            grid[1][x] = '/';
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

/// Tabulates patterns by use count, followed by the totals.
pub fn render_summary(bar_length: u32, summary: &PatternSummary) -> String {
    let mut out = String::new();
    let width = summary
        .patterns
        .iter()
        .map(|p| p.bars.to_string().len())
        .max()
        .unwrap_or(1);
    for p in &summary.patterns {
        let used: u64 = p.groups.iter().map(|&(l, n)| l as u64 * n as u64).sum();
        let offcut = (bar_length as u64).saturating_sub(used);
        out.push_str(&format!(
            "  {:>width$} x  [{}]  offcut {}\n",
            p.bars, p.label, offcut
        ));
    }

    let stock = bar_length as u64 * summary.total_bars as u64;
    let percent = if stock == 0 {
        0.0
    } else {
        summary.total_waste as f64 / stock as f64 * 100.0
    };
    out.push_str(&format!(
        "Summary: {} bar{} used, {} waste ({:.1}%), {} piece{} cut\n",
        summary.total_bars,
        if summary.total_bars == 1 { "" } else { "s" },
        summary.total_waste,
        percent,
        summary.total_pieces_cut,
        if summary.total_pieces_cut == 1 { "" } else { "s" },
    ));

    let leftover = summary.leftover.pieces();
    if !leftover.is_empty() {
        let items: Vec<String> = leftover.iter().map(|p| p.to_string()).collect();
        out.push_str(&format!("Not cut: {}\n", items.join(" ")));
    }
    out
}

#[allow(clippy::needless_range_loop)]
fn draw_box(grid: &mut [Vec<char>], x: usize, w: usize) {
    let rows = grid.len();
    let cols = if rows > 0 { grid[0].len() } else { return };

    for i in x..=x + w {
        if i < cols {
            for j in [0, rows - 1] {
                grid[j][i] = if grid[j][i] == '|' || grid[j][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
        }
    }

    for j in 0..rows {
        for cx in [x, x + w] {
            if cx < cols {
                grid[j][cx] = if j == 0 || j == rows - 1 || grid[j][cx] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
        }
    }
}
