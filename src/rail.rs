//! Timeline rail widget.
//!
//! A narrow minimap beside the roll view: the whole roll compressed into the
//! widget height, defect dots at their meter positions and an indicator line
//! for the meter currently centered in the viewport.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::models::DefectRecord;
use crate::theme::{colors, severity_color, styles};

/// Number of scale divisions drawn along the rail
const SCALE_DIVISIONS: u16 = 20;

/// Row inside the rail for a given roll meter
pub fn meter_row(meter: f64, total_meters: f64, height: u16) -> Option<u16> {
    if total_meters <= 0.0 || height == 0 {
        return None;
    }
    let fraction = (meter / total_meters).clamp(0.0, 1.0);
    let row = (fraction * (height - 1) as f64).round() as u16;
    Some(row.min(height - 1))
}

pub struct TimelineRail<'a> {
    defects: &'a [DefectRecord],
    total_meters: f64,
    /// Roll meter currently centered in the roll viewport
    center_meter: f64,
    selected: Option<u32>,
}

impl<'a> TimelineRail<'a> {
    pub fn new(
        defects: &'a [DefectRecord],
        total_meters: f64,
        center_meter: f64,
        selected: Option<u32>,
    ) -> Self {
        Self {
            defects,
            total_meters,
            center_meter,
            selected,
        }
    }
}

impl Widget for TimelineRail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Rail ")
            .title_style(styles::text_dim())
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_MEDIUM));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 4 || inner.width < 5 {
            return;
        }

        // Scale marks
        for div in 0..=SCALE_DIVISIONS {
            let meter = div as f64 * (self.total_meters / SCALE_DIVISIONS as f64);
            if let Some(row) = meter_row(meter, self.total_meters, inner.height) {
                let label = format!("{:>3.0}─", meter);
                if label.len() as u16 <= inner.width {
                    buf.set_string(inner.x, inner.y + row, &label, styles::text_hint());
                }
            }
        }

        // Defect dots
        let dot_x = inner.x + inner.width - 2;
        for defect in self.defects {
            let is_selected = self.selected == Some(defect.id);
            if defect.is_dismissed() && !is_selected {
                continue;
            }
            let Some(row) = meter_row(defect.position_meters, self.total_meters, inner.height)
            else {
                continue;
            };
            let color = if defect.is_dismissed() {
                colors::MARKER_DISMISSED
            } else {
                severity_color(defect.severity)
            };
            let mut style = Style::default().fg(color);
            if is_selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            let glyph = if is_selected { '◆' } else { '●' };
            buf[(dot_x, inner.y + row)].set_char(glyph);
            buf[(dot_x, inner.y + row)].set_style(style);
        }

        // Current-view indicator line on top of everything else
        if let Some(row) = meter_row(self.center_meter, self.total_meters, inner.height) {
            let y = inner.y + row;
            for x in inner.x..inner.x + inner.width {
                if buf[(x, y)].symbol() == " " {
                    buf[(x, y)].set_char('─');
                    buf[(x, y)].set_style(Style::default().fg(colors::RAIL_INDICATOR));
                }
            }
            let label = format!("{:.1}m", self.center_meter);
            if label.len() as u16 <= inner.width {
                buf.set_string(
                    inner.x,
                    y,
                    &label,
                    Style::default()
                        .fg(colors::BG_DARK)
                        .bg(colors::RAIL_INDICATOR)
                        .add_modifier(Modifier::BOLD),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_row_bounds() {
        assert_eq!(meter_row(0.0, 50.0, 20), Some(0));
        assert_eq!(meter_row(50.0, 50.0, 20), Some(19));
        assert_eq!(meter_row(25.0, 50.0, 21), Some(10));
        // Out-of-range meters clamp to the rail ends
        assert_eq!(meter_row(-5.0, 50.0, 20), Some(0));
        assert_eq!(meter_row(80.0, 50.0, 20), Some(19));
    }

    #[test]
    fn test_meter_row_degenerate_inputs() {
        assert_eq!(meter_row(10.0, 0.0, 20), None);
        assert_eq!(meter_row(10.0, 50.0, 0), None);
    }
}
