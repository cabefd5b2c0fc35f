//! Match detection: runs of 3+ equal colours in a row or column.

use crate::grid::Grid;
use crate::panel::Panel;
use std::collections::HashSet;

/// Shortest run that clears.
pub const MIN_RUN: usize = 3;

/// Colour of the panel at (col, row) if it can take part in a match.
fn effective_color(grid: &Grid, col: usize, row: usize) -> Option<u8> {
    grid.get(col, row)
        .filter(|p| p.is_matchable())
        .map(Panel::color_index)
}

/// Scan one line of cells and add every run of `MIN_RUN` or more to `out`.
fn scan_line(
    cells: impl Iterator<Item = ((usize, usize), Option<u8>)>,
    out: &mut HashSet<(usize, usize)>,
) {
    let mut run: Vec<(usize, usize)> = Vec::new();
    let mut run_color: Option<u8> = None;
    for (pos, color) in cells {
        if color.is_some() && color == run_color {
            run.push(pos);
            continue;
        }
        if run.len() >= MIN_RUN {
            out.extend(run.iter().copied());
        }
        run.clear();
        run_color = color;
        if color.is_some() {
            run.push(pos);
        }
    }
    if run.len() >= MIN_RUN {
        out.extend(run);
    }
}

/// All matched cells as (col, row), sorted by row then column.
///
/// Falling and clearing panels are invisible to the scan. A cell hit by both a
/// horizontal and a vertical run appears once. The result is empty unless it
/// holds at least `MIN_RUN` distinct cells.
pub fn find_matches(grid: &Grid) -> Vec<(usize, usize)> {
    let mut matched = HashSet::new();
    for row in 0..grid.rows() {
        scan_line(
            (0..grid.columns()).map(|col| ((col, row), effective_color(grid, col, row))),
            &mut matched,
        );
    }
    for col in 0..grid.columns() {
        scan_line(
            (0..grid.rows()).map(|row| ((col, row), effective_color(grid, col, row))),
            &mut matched,
        );
    }
    if matched.len() < MIN_RUN {
        return Vec::new();
    }
    let mut cells: Vec<(usize, usize)> = matched.into_iter().collect();
    cells.sort_by_key(|&(col, row)| (row, col));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelState;

    const A: Option<u8> = Some(0);
    const B: Option<u8> = Some(1);
    const C: Option<u8> = Some(2);
    const D: Option<u8> = Some(3);
    const E: Option<u8> = None;

    #[test]
    fn test_horizontal_run() {
        let grid = Grid::from_layout(6, 12, &[vec![A, A, A, B, C, D]]);
        assert_eq!(find_matches(&grid), vec![(0, 11), (1, 11), (2, 11)]);
    }

    #[test]
    fn test_run_at_line_end() {
        let grid = Grid::from_layout(6, 2, &[vec![B, C, D, A, A, A, A]]);
        assert_eq!(find_matches(&grid), vec![(3, 1), (4, 1), (5, 1)]);
    }

    #[test]
    fn test_vertical_run() {
        let grid = Grid::from_layout(
            3,
            4,
            &[vec![E, C, E], vec![B, C, E], vec![A, C, B], vec![B, A, A]],
        );
        assert_eq!(find_matches(&grid), vec![(1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn test_two_run_is_not_a_match() {
        let grid = Grid::from_layout(6, 3, &[vec![A, A, B, B, A, A], vec![A, A, B, B, C, C]]);
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_gap_breaks_run() {
        let grid = Grid::from_layout(6, 1, &[vec![A, A, E, A, B, B]]);
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_l_shape_shares_corner() {
        let grid = Grid::from_layout(
            3,
            3,
            &[vec![A, B, C], vec![A, C, B], vec![A, A, A]],
        );
        let cells = find_matches(&grid);
        assert_eq!(cells.len(), 5);
        assert_eq!(cells, vec![(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_falling_panels_are_invisible() {
        let mut grid = Grid::from_layout(3, 1, &[vec![A, A, A]]);
        grid.get_mut(1, 0).expect("panel").set_state(PanelState::Falling);
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_clearing_panels_are_invisible() {
        let mut grid = Grid::from_layout(4, 1, &[vec![A, A, A, A]]);
        grid.get_mut(0, 0).expect("panel").set_state(PanelState::Clearing);
        assert_eq!(find_matches(&grid), vec![(1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_swapping_panels_still_match() {
        let mut grid = Grid::from_layout(3, 1, &[vec![A, A, A]]);
        grid.get_mut(2, 0).expect("panel").set_state(PanelState::Swapping);
        assert_eq!(find_matches(&grid).len(), 3);
    }
}
