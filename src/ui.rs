//! Layout and drawing: well, upcoming row, cursor, sidebar, pause and game-over overlays.

use crate::app::Screen;
use crate::theme::Theme;
use panelrise::{Board, Cursor, PanelState, PanelView};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};

/// Terminal columns and rows per panel; 4x2 is roughly square.
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;

/// Panel symbols by colour index.
const SYMBOLS: [&str; 5] = ["♥", "★", "♣", "♦", "●"];

/// Everything one frame draws.
pub struct View<'a> {
    pub board: &'a Board,
    pub cursor: Cursor,
    pub theme: &'a Theme,
    pub screen: Screen,
    pub paused: bool,
    /// Seconds of play.
    pub elapsed: f32,
    /// Short-lived message such as a chain notice.
    pub status: Option<&'a str>,
}

/// Well size in terminal cells, border included: the grid plus the upcoming row.
fn well_size(board: &Board) -> (u16, u16) {
    let config = board.config();
    (
        config.columns as u16 * CELL_WIDTH + 2,
        (config.rows as u16 + 1) * CELL_HEIGHT + 2,
    )
}

pub fn draw(frame: &mut Frame, view: &View) {
    let area = frame.area();
    let (ww, wh) = well_size(view.board);
    let total_w = ww + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(wh),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(ww), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    draw_well(frame, view, inner[0]);
    draw_sidebar(frame, view, inner[1]);

    match view.screen {
        Screen::Playing if view.paused => draw_pause_overlay(frame, view.theme, inner[0]),
        Screen::Playing => {}
        Screen::GameOver => draw_game_over(frame, view, inner[0]),
    }
}

fn draw_well(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let board = view.board;
    let border = if board.in_danger() {
        theme.danger
    } else {
        theme.div_line
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border).bg(theme.bg))
        .title(Span::styled(" panelrise ", Style::default().fg(theme.title)));
    let well = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    for y in well.top()..well.bottom() {
        for x in well.left()..well.right() {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
        }
    }

    let rows = board.config().rows;
    let rise = rows_offset(board.rise_offset(), CELL_HEIGHT);

    for view_panel in board.panels() {
        let x = well.x as i32 + view_panel.col as i32 * CELL_WIDTH as i32
            + rows_offset(view_panel.offset_x, CELL_WIDTH);
        let y = well.y as i32 + view_panel.row as i32 * CELL_HEIGHT as i32 - rise
            + rows_offset(view_panel.offset_y, CELL_HEIGHT);
        let (fg, bg) = panel_colors(theme, &view_panel);
        draw_panel(buf, well, x, y, SYMBOLS[view_panel.color_index as usize % SYMBOLS.len()], fg, bg);
    }

    // upcoming row rises in from below the bottom edge
    let upcoming_y = well.y as i32 + rows as i32 * CELL_HEIGHT as i32 - rise;
    for (col, &color) in board.upcoming_row().iter().enumerate() {
        let x = well.x as i32 + col as i32 * CELL_WIDTH as i32;
        let bg = blend(theme.panel_color(color), theme.bg, 0.65);
        let symbol = SYMBOLS[color as usize % SYMBOLS.len()];
        draw_panel(buf, well, x, upcoming_y, symbol, theme.div_line, bg);
    }

    if view.screen == Screen::Playing {
        draw_cursor(buf, well, view.cursor, rise, theme);
    }
}

/// Whole terminal cells for a fractional offset measured in panels.
fn rows_offset(offset: f32, cells: u16) -> i32 {
    (offset * f32::from(cells)).round() as i32
}

fn panel_colors(theme: &Theme, panel: &PanelView) -> (Color, Color) {
    let base = theme.panel_color(panel.color_index);
    match panel.state {
        PanelState::Clearing if panel.clear_progress <= 0.0 => (base, Color::White),
        PanelState::Clearing => (Color::White, blend(base, theme.bg, panel.clear_progress)),
        PanelState::Falling | PanelState::Swapping | PanelState::Idle => (Color::Black, base),
    }
}

/// Draw one panel at terminal position (x, y), clipped to `clip`.
fn draw_panel(buf: &mut Buffer, clip: Rect, x: i32, y: i32, symbol: &str, fg: Color, bg: Color) {
    let style = Style::default().fg(fg).bg(bg);
    for dy in 0..CELL_HEIGHT as i32 {
        for dx in 0..CELL_WIDTH as i32 {
            let Some((cx, cy)) = clip_point(clip, x + dx, y + dy) else {
                continue;
            };
            let glyph = if dx == 1 && dy == 0 { symbol } else { " " };
            buf[(cx, cy)].set_symbol(glyph).set_style(style);
        }
    }
}

fn clip_point(clip: Rect, x: i32, y: i32) -> Option<(u16, u16)> {
    let inside = x >= i32::from(clip.left())
        && x < i32::from(clip.right())
        && y >= i32::from(clip.top())
        && y < i32::from(clip.bottom());
    inside.then_some((x as u16, y as u16))
}

/// Brackets around the two selected cells, on top of whatever is drawn there.
fn draw_cursor(buf: &mut Buffer, well: Rect, cursor: Cursor, rise: i32, theme: &Theme) {
    let x0 = well.x as i32 + cursor.x as i32 * CELL_WIDTH as i32;
    let x1 = x0 + 2 * CELL_WIDTH as i32 - 1;
    let y0 = well.y as i32 + cursor.y as i32 * CELL_HEIGHT as i32 - rise;
    for dy in 0..CELL_HEIGHT as i32 {
        for (x, glyph) in [(x0, "["), (x1, "]")] {
            if let Some(pos) = clip_point(well, x, y0 + dy) {
                buf[pos].set_symbol(glyph).set_style(
                    Style::default()
                        .fg(theme.cursor)
                        .add_modifier(Modifier::BOLD),
                );
            }
        }
    }
}

/// Linear mix of two RGB colours; `t` = 0 gives `a`.
fn blend(a: Color, b: Color, t: f32) -> Color {
    match (a, b) {
        (Color::Rgb(ar, ag, ab), Color::Rgb(br, bg, bb)) => {
            let t = t.clamp(0.0, 1.0);
            let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
            Color::Rgb(mix(ar, br), mix(ag, bg), mix(ab, bb))
        }
        _ if t >= 0.5 => b,
        _ => a,
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let board = view.board;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // stats
            Constraint::Length(4), // next row
            Constraint::Length(4), // freeze / top-out gauges
            Constraint::Length(3), // status
            Constraint::Fill(1),   // controls
        ])
        .split(area);

    let secs = view.elapsed as u64;
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(board.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Time:  ", title_style),
            Span::styled(format!("{:02}:{:02}", secs / 60, secs % 60), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Speed: ", title_style),
            Span::styled(format!("{}/10", board.speed_level()), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Rise:  ", title_style),
            Span::styled(format!("{:.1}s/row", board.rise_interval()), fg_style),
        ]),
    ];
    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    Paragraph::new(Text::from(stats))
        .block(block)
        .render(chunks[0], frame.buffer_mut());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled("Next", title_style));
    let next_inner = block.inner(chunks[1]);
    block.render(chunks[1], frame.buffer_mut());
    let spans: Vec<Span> = board
        .next_upcoming_row()
        .iter()
        .map(|&c| {
            Span::styled(
                format!(" {} ", SYMBOLS[c as usize % SYMBOLS.len()]),
                Style::default().fg(Color::Black).bg(theme.panel_color(c)),
            )
        })
        .collect();
    Paragraph::new(Line::from(spans)).render(next_inner, frame.buffer_mut());

    draw_gauges(frame, view, chunks[2]);

    if let Some(status) = view.status {
        Paragraph::new(Line::from(Span::styled(
            status,
            title_style.add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(chunks[3], frame.buffer_mut());
    }

    let controls = [
        ("←↑↓→ hjkl", "move"),
        ("Space", "swap"),
        ("f / Shift", "raise"),
        ("p", "pause"),
        ("r", "restart"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = controls
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {key:<10}"), title_style),
                Span::styled(*what, fg_style),
            ])
        })
        .collect();
    Paragraph::new(Text::from(lines)).render(chunks[4], frame.buffer_mut());
}

fn draw_gauges(frame: &mut Frame, view: &View, area: Rect) {
    let board = view.board;
    let config = board.config();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let freeze = board.chain_pause_remaining();
    let freeze_ratio = (freeze / config.large_chain_freeze).clamp(0.0, 1.0);
    Paragraph::new(Span::styled(
        "Freeze",
        Style::default().fg(view.theme.title),
    ))
    .render(rows[0], frame.buffer_mut());
    Gauge::default()
        .ratio(f64::from(freeze_ratio))
        .label(format!("{freeze:.2}s"))
        .gauge_style(Style::default().fg(view.theme.panels[3]))
        .render(rows[1], frame.buffer_mut());

    if let Some(left) = board.game_over_countdown() {
        Paragraph::new(Span::styled(
            "Top out!",
            Style::default()
                .fg(view.theme.danger)
                .add_modifier(Modifier::BOLD),
        ))
        .render(rows[2], frame.buffer_mut());
        let ratio = (left / config.game_over_hold).clamp(0.0, 1.0);
        Gauge::default()
            .ratio(f64::from(ratio))
            .label(format!("{left:.1}s"))
            .gauge_style(Style::default().fg(view.theme.danger))
            .render(rows[3], frame.buffer_mut());
    }
}

fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 22, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(theme.title),
        )),
        Line::from(Span::styled(
            " p resume  q quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = popup_rect(area, 22, 8);
    let secs = view.elapsed as u64;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(theme.danger),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", view.board.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Time: {:02}:{:02} ", secs / 60, secs % 60),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            " r restart  q quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}
