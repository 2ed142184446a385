use crate::types::{PieceCount, round2};

const MAX_WIDTH: f64 = 80.0;

pub fn render_bar(stock_length: u32, pieces: &[PieceCount], kerf_width: u32) -> String {
    if stock_length == 0 {
        return String::new();
    }
    let scale = MAX_WIDTH / stock_length as f64;
    let grid_w = (stock_length as f64 * scale).round() as usize;

    let mut top = vec!['-'; grid_w + 1];
    let mut mid = vec![' '; grid_w + 1];
    mark_boundary(&mut top, &mut mid, 0);
    mark_boundary(&mut top, &mut mid, grid_w);

    let lengths = pieces
        .iter()
        .flat_map(|p| std::iter::repeat_n(p.length, p.count as usize));

    let mut offset = 0u64;
    let mut first = true;
    for length in lengths {
        if !first {
            offset += kerf_width as u64;
        }
        let sx = (offset as f64 * scale).round() as usize;
        offset += length as u64;
        let ex = ((offset as f64 * scale).round() as usize).min(grid_w);

        if !first && sx > 0 && sx < grid_w {
            // kerf sits on the boundary before this piece
            top[sx] = '+';
            mid[sx] = if kerf_width > 0 { '#' } else { '|' };
        }
        mark_boundary(&mut top, &mut mid, ex);
        draw_label(&mut mid, sx, ex, &length.to_string());
        first = false;
    }

    let end = ((offset as f64 * scale).round() as usize).min(grid_w);
    for cell in mid.iter_mut().take(grid_w).skip(end + 1) {
        *cell = '~';
    }

    let top: String = top.into_iter().collect();
    let mid: String = mid.into_iter().collect();
    format!("{top}\n{mid}\n{top}\n")
}

pub fn legend(stock_length: u32, consumed: u64, waste: u64) -> String {
    let utilization = if stock_length == 0 {
        0.0
    } else {
        round2(consumed as f64 / stock_length as f64 * 100.0)
    };
    format!("{stock_length}mm: {consumed}mm used, {waste}mm waste ({utilization:.2}%)")
}

fn mark_boundary(top: &mut [char], mid: &mut [char], x: usize) {
    if x < top.len() {
        top[x] = '+';
        if mid[x] != '#' {
            mid[x] = '|';
        }
    }
}

fn draw_label(mid: &mut [char], sx: usize, ex: usize, label: &str) {
    let label_chars: Vec<char> = label.chars().collect();
    if ex <= sx + 1 || label_chars.len() > ex - sx - 1 {
        return;
    }
    let cx = sx + (ex - sx) / 2;
    let start_x = cx.saturating_sub(label_chars.len() / 2).max(sx + 1);
    for (i, &ch) in label_chars.iter().enumerate() {
        let x = start_x + i;
        if x > sx && x < ex {
            mid[x] = ch;
        }
    }
}
