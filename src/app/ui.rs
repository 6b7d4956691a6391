use super::state::{
    AppState, Mode, INPUT_ROW_HEIGHT, METHOD_PANE_WIDTH, STATUS_BAR_HEIGHT,
};
use super::widgets::FocusableInput;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

/// Draw the whole screen: request panel (method + url + body) on the
/// left, response panel with the elapsed-time bar on the right.
pub fn render(state: &AppState, frame: &mut Frame) {
    let [request_panel, response_panel] = Layout::new(
        Direction::Horizontal,
        [Constraint::Percentage(50), Constraint::Percentage(50)],
    )
    .areas(frame.size());

    let [input_row, body_area] = Layout::new(
        Direction::Vertical,
        [Constraint::Length(INPUT_ROW_HEIGHT), Constraint::Min(0)],
    )
    .areas(request_panel);

    let [method_area, url_area] = Layout::new(
        Direction::Horizontal,
        [Constraint::Length(METHOD_PANE_WIDTH), Constraint::Min(0)],
    )
    .areas(input_row);

    let [response_area, status_area] = Layout::new(
        Direction::Vertical,
        [Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)],
    )
    .areas(response_panel);

    render_pane(
        frame,
        method_area,
        " Method ",
        state.method.render(inner_width(method_area)),
        state.mode() == Mode::EditingMethod,
    );
    render_pane(
        frame,
        url_area,
        " URL ",
        state.url.render(inner_width(url_area)),
        state.mode() == Mode::EditingUrl,
    );
    render_pane(
        frame,
        body_area,
        " Body ",
        state.body.render(inner_width(body_area)),
        state.mode() == Mode::EditingBody,
    );
    render_pane(
        frame,
        response_area,
        " Response ",
        state.response.render(inner_width(response_area)),
        state.mode() == Mode::ViewingResponse,
    );
    render_status_bar(frame, status_area, state);

    match state.mode() {
        Mode::EditingUrl => {
            let width = inner_width(url_area);
            frame.set_cursor(
                url_area.x + 1 + state.url.cursor_column(width).min(width),
                url_area.y + 1,
            );
        }
        Mode::EditingBody => {
            let (col, row) = state.body.cursor_position();
            frame.set_cursor(
                body_area.x + 1 + col.min(inner_width(body_area)),
                body_area.y + 1 + row.min(body_area.height.saturating_sub(2)),
            );
        }
        _ => {}
    }
}

fn inner_width(area: Rect) -> u16 {
    area.width.saturating_sub(2)
}

fn render_pane(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    content: ratatui::text::Text<'static>,
    focused: bool,
) {
    let mut block = Block::bordered().title(title);
    if focused {
        block = block.border_style(Style::new().fg(Color::Red));
    }
    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let elapsed = format!("{}ms", state.timer.elapsed().as_millis());
    frame.render_widget(
        Paragraph::new(elapsed).block(Block::bordered().title(" Elapsed ")),
        area,
    );
}
