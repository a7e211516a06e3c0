use ratatui::style::Color;

/// Where the run is, relative to its length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Early,
    Middle,
    Late,
}

/// Below a third of the run is early, above two thirds is late
pub fn band(tick: u32, max_ticks: u32) -> Band {
    let t = f64::from(tick);
    let max = f64::from(max_ticks.max(1));
    if t < 0.33 * max {
        Band::Early
    } else if t <= 0.66 * max {
        Band::Middle
    } else {
        Band::Late
    }
}

pub fn band_color(band: Band) -> Color {
    match band {
        Band::Early => Color::Green,
        Band::Middle => Color::Yellow,
        Band::Late => Color::Red,
    }
}

pub fn label(tick: u32, max_ticks: u32) -> String {
    format!("{tick}/{max_ticks}")
}
