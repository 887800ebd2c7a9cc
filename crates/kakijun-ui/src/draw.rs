use kakijun_config::ui::UiConfig;
use kakijun_core::render::{DIAGRAM_UNAVAILABLE, RenderedView, ResultCard, TextLine};
use kakijun_strokes::{StrokeDiagram, StrokeStyle};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::state::{DiagramPane, UiState};

const HEADING_COLOR: Color = Color::LightYellow;
const LABEL_COLOR: Color = Color::Cyan;
const ERROR_COLOR: Color = Color::LightRed;
const FOOTER_COLOR: Color = Color::DarkGray;
const LOADING: &str = "Cargando diagrama...";
const FOOTER: &str = "Enter buscar · RePág/AvPág desplazar · Esc salir";

/// Styling knobs for one frame
#[derive(Debug, Clone)]
pub struct DrawOptions {
    pub ui: UiConfig,
    pub stroke: StrokeStyle,
}

pub fn draw(frame: &mut Frame<'_>, state: &UiState, options: &DrawOptions) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_search_box(frame, state, layout[0]);

    match &state.view {
        RenderedView::Empty | RenderedView::Message(_) => {
            let lines: Vec<Line<'static>> = state.view.text_lines().iter().map(styled_line).collect();
            frame.render_widget(
                Paragraph::new(Text::from(lines))
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL).title("Resultados")),
                layout[1],
            );
        }
        RenderedView::Cards(cards) => draw_cards(frame, state, cards, layout[1], options),
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(FOOTER, Style::default().fg(FOOTER_COLOR)))),
        layout[2],
    );
}

fn draw_search_box(frame: &mut Frame<'_>, state: &UiState, area: Rect) {
    let search = Paragraph::new(state.input.as_str())
        .block(Block::default().borders(Borders::ALL).title("Buscar kanji"));
    frame.render_widget(search, area);

    let typed = Line::from(state.input.as_str()).width() as u16;
    let max_x = area.x + area.width.saturating_sub(2);
    frame.set_cursor((area.x + 1 + typed).min(max_x), area.y + 1);
}

fn draw_cards(
    frame: &mut Frame<'_>,
    state: &UiState,
    cards: &[ResultCard],
    area: Rect,
    options: &DrawOptions,
) {
    let mut y = area.y;
    let bottom = area.y + area.height;

    for (index, card) in cards.iter().enumerate().skip(state.scroll) {
        if y >= bottom {
            break;
        }

        let lines: Vec<Line<'static>> = card.text_lines().iter().skip(1).map(styled_line).collect();
        let body_height = if card.diagram.is_some() {
            (lines.len() as u16).max(options.ui.diagram_height)
        } else {
            lines.len() as u16
        };
        let height = (body_height + 2).min(bottom - y);
        let card_area = Rect::new(area.x, y, area.width, height);
        y += height;

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!(" {} ", card.character),
                Style::default().fg(HEADING_COLOR).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(card_area);
        frame.render_widget(block, card_area);

        let text_area = match &card.diagram {
            Some(mount) => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([
                        Constraint::Length(options.ui.diagram_width),
                        Constraint::Min(0),
                    ])
                    .split(inner);
                match state.panes.get(&mount.id.index) {
                    Some(pane) => draw_pane(frame, pane, columns[0], options),
                    None => draw_pane(frame, &DiagramPane::Loading, columns[0], options),
                }
                columns[1]
            }
            None => inner,
        };

        frame.render_widget(
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
            text_area,
        );
        tracing::trace!("[UI] Card {} drawn at {:?}", index, card_area);
    }
}

fn draw_pane(frame: &mut Frame<'_>, pane: &DiagramPane, area: Rect, options: &DrawOptions) {
    match pane {
        DiagramPane::Loading => {
            frame.render_widget(
                Paragraph::new(LOADING)
                    .style(Style::default().fg(FOOTER_COLOR))
                    .wrap(Wrap { trim: true }),
                area,
            );
        }
        DiagramPane::Unavailable => {
            frame.render_widget(
                Paragraph::new(DIAGRAM_UNAVAILABLE).wrap(Wrap { trim: true }),
                area,
            );
        }
        DiagramPane::Ready { diagram, offsets } => {
            let segments = diagram_segments(diagram, offsets);
            let marker = if options.stroke.width >= 4.0 {
                Marker::HalfBlock
            } else {
                Marker::Braille
            };

            let canvas = Canvas::default()
                .marker(marker)
                .x_bounds([0.0, 1.0])
                .y_bounds([0.0, 1.0])
                .paint(move |ctx| {
                    for &(x1, y1, x2, y2) in &segments {
                        ctx.draw(&CanvasLine {
                            x1,
                            y1,
                            x2,
                            y2,
                            color: Color::Reset,
                        });
                    }
                });
            frame.render_widget(canvas, area);
        }
    }
}

/// Visible line segments of a diagram in unit canvas space, y pointing up
pub fn diagram_segments(diagram: &StrokeDiagram, offsets: &[f64]) -> Vec<(f64, f64, f64, f64)> {
    let view_box = diagram.view_box();
    let step = view_box.width.max(view_box.height) / 100.0;
    let mut segments = Vec::new();

    for (stroke, offset) in diagram.strokes().iter().zip(offsets) {
        for polyline in stroke.visible_polylines(*offset, step) {
            for pair in polyline.windows(2) {
                let a = view_box.map_to(pair[0], 1.0, 1.0);
                let b = view_box.map_to(pair[1], 1.0, 1.0);
                segments.push((a.x, 1.0 - a.y, b.x, 1.0 - b.y));
            }
        }
    }

    segments
}

pub fn styled_line(line: &TextLine) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    match line {
        TextLine::Heading(text) => Line::from(Span::styled(text.clone(), bold.fg(HEADING_COLOR))),
        TextLine::Labeled { label, value } => Line::from(vec![
            Span::styled(*label, bold.fg(LABEL_COLOR)),
            Span::raw(" "),
            Span::raw(value.clone()),
        ]),
        TextLine::Section(label) => Line::from(Span::styled(*label, bold.fg(LABEL_COLOR))),
        TextLine::Message(message) if message.is_error() => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(ERROR_COLOR),
        )),
        other => Line::from(other.to_string()),
    }
}
