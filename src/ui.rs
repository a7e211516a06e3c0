pub mod progress;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Widget},
};

use crate::{
    engine::DiscContent,
    session::{Feedback, MAX_LEVEL, MIN_LEVEL},
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const DISC_WIDTH: u16 = 24;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = &self.engine;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(1), // instruction
                Constraint::Length(1), // padding
                Constraint::Length(1), // level
                Constraint::Min(5),    // disc
                Constraint::Length(1), // progress
                Constraint::Length(1), // score
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled("n-back", bold_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(Line::from(vec![
            Span::raw("Recall the letter "),
            Span::styled("n", bold_style),
            Span::raw(" levels back."),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled(format!("Level: {}.", engine.level()), bold_style),
            Span::styled(format!("  ({MIN_LEVEL}-{MAX_LEVEL})"), dim_style),
            Span::styled(format!("  letters {}", engine.alphabet()), dim_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        render_disc(self, chunks[4], buf);

        let tick = engine.tick();
        let max_ticks = engine.config().max_ticks;
        Gauge::default()
            .gauge_style(Style::default().fg(progress::band_color(progress::band(tick, max_ticks))))
            .ratio(engine.progress())
            .label(progress::label(tick, max_ticks))
            .render(chunks[5], buf);

        Paragraph::new(Span::styled(format!("Score: {}", engine.score()), bold_style))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(status.as_str(), italic_style.fg(Color::Yellow)))
                .alignment(Alignment::Center)
                .render(chunks[7], buf);
        }

        Paragraph::new(Span::styled(
            "(space) start / match   (1-9 ↑ ↓) level   (r)eset   (esc) quit",
            italic_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[8], buf);
    }
}

/// Text and colours of the stimulus disc
pub fn disc_style(content: DiscContent, feedback: Feedback, tick: u32) -> (String, Style) {
    let text = match content {
        DiscContent::Start => "START".to_string(),
        DiscContent::Stimulus(s) => s.to_string(),
        DiscContent::Score(score) => format!("Score: {score}"),
    };

    let base = Style::default().add_modifier(Modifier::BOLD);
    let style = match feedback {
        Feedback::Correct => base.fg(Color::White).bg(Color::Green),
        Feedback::Wrong => base.fg(Color::White).bg(Color::Red),
        Feedback::None if tick % 2 == 0 => base.fg(Color::Red),
        Feedback::None => base.fg(Color::Blue),
    };
    (text, style)
}

fn render_disc(app: &App, area: Rect, buf: &mut Buffer) {
    let engine = &app.engine;
    let (text, style) = disc_style(engine.disc(), engine.feedback(), engine.tick());

    let width = DISC_WIDTH.min(area.width);
    let disc_area = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .style(style);
    let inner = block.inner(disc_area);
    block.render(disc_area, buf);

    let middle = Rect {
        y: inner.y + inner.height / 2,
        height: inner.height.min(1),
        ..inner
    };
    Paragraph::new(Span::styled(text, style))
        .alignment(Alignment::Center)
        .render(middle, buf);
}
