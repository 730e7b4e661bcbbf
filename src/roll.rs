//! Virtual roll surface.
//!
//! Generates the deterministic "print nest" grid that fills the paper with
//! placeholder content and renders the scrolling roll with defect markers
//! overlaid. Nest layout is keyed by paper coordinates so the grid stays
//! stable while the roll advances under the print head.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::models::{DefectRecord, Severity};
use crate::theme::{colors, severity_color, styles};
use crate::viewport::{ViewportMap, PIXELS_PER_ROW};

/// Grid step of the nest layout, in meters (~240px of content per slot)
pub const NEST_STEP_METERS: f64 = 1.6;
/// Vertical gap between nests, in virtual pixels
pub const NEST_GAP_PX: f64 = 20.0;
/// Blank paper trailing the last printed meter, in virtual pixels
pub const TRAIL_MARGIN_PX: f64 = 300.0;

/// Columns reserved for the meter rule on the left of the roll
const GUTTER_COLS: u16 = 6;

const BLOCK_LIGHT: char = '░';
const BLOCK_MEDIUM: char = '▒';
const EXIT_LIP: char = '▄';

/// One placeholder content block on the roll surface
#[derive(Debug, Clone, PartialEq)]
pub struct PrintNest {
    /// Top edge in virtual pixels, relative to the start of the roll
    pub top_px: f64,
    pub height_px: f64,
    /// Horizontal extent as percentages of roll width
    pub left_percent: f64,
    pub width_percent: f64,
    /// Placeholder image key; promoted nests reuse the defect's key
    pub image_index: i64,
    /// Whether this nest was widened to sit under one or more defects
    pub flagged: bool,
}

/// Deterministic pseudo-random unit value from a layout seed
fn seeded_unit(seed: f64) -> f64 {
    let x = seed.sin() * 10000.0;
    x - x.floor()
}

/// Compute the nest grid for the current simulation offset.
///
/// Slots live in paper coordinates (`meter - offset`), so a slot keeps its
/// random layout as the roll moves. Slots containing defects are promoted:
/// widened to cover every defect's lateral position, stretched across the
/// inter-nest gap when a defect falls inside it, and re-keyed to the first
/// defect's placeholder index so the detail panel shows the same content.
pub fn layout_nests(
    defects: &[DefectRecord],
    offset_meters: f64,
    total_meters: f64,
    pixels_per_meter: f64,
) -> Vec<PrintNest> {
    let total_height = total_meters * pixels_per_meter;
    let step = NEST_STEP_METERS;

    let start_p = (-offset_meters / step).floor() * step - step;
    let end_p = ((total_meters - offset_meters) / step).ceil() * step + step;

    let mut nests = Vec::new();
    let mut p = start_p;
    while p < end_p {
        let y_meters = p + offset_meters;
        let top = y_meters * pixels_per_meter;

        // Skip slots far off the roll surface
        if top < -500.0 || top > total_height + 500.0 {
            p += step;
            continue;
        }

        let seed = (p * 137.0).round();

        let mut height = step * pixels_per_meter - NEST_GAP_PX;
        height -= (seeded_unit(seed + 5.0) * 10.0).floor();

        let mut width = 50.0 + (seeded_unit(seed + 1.0) * 40.0).floor();
        let mut left = seeded_unit(seed + 2.0) * (100.0 - width);
        let mut image_index = p.floor().abs() as i64;
        let mut flagged = false;

        let in_slice: Vec<&DefectRecord> = defects
            .iter()
            .filter(|d| {
                let paper = d.position_meters - offset_meters;
                paper >= p - 0.1 && paper < p + step + 0.1
            })
            .collect();

        if !in_slice.is_empty() {
            flagged = true;

            let min_x = in_slice
                .iter()
                .map(|d| d.lateral_percent)
                .fold(f64::INFINITY, f64::min);
            let max_x = in_slice
                .iter()
                .map(|d| d.lateral_percent)
                .fold(f64::NEG_INFINITY, f64::max);

            let padding = 10.0;
            let req_left = (min_x - padding).max(0.0);
            let req_right = (max_x + padding).min(100.0);

            if left > req_left {
                left = req_left;
            }
            if left + width < req_right {
                width = req_right - left;
            }
            if left + width > 100.0 {
                width = 100.0 - left;
            }

            // A defect sitting inside the gap zone would float on blank
            // paper; stretch the nest across the gap to keep it covered.
            let max_paper = in_slice
                .iter()
                .map(|d| d.position_meters - offset_meters)
                .fold(f64::NEG_INFINITY, f64::max);
            let slot_end = p + step;
            let gap_meters = NEST_GAP_PX / pixels_per_meter;
            if max_paper > slot_end - gap_meters {
                height += NEST_GAP_PX + 10.0;
            }

            image_index = 1000 + in_slice[0].id as i64;
        }

        nests.push(PrintNest {
            top_px: top,
            height_px: height,
            left_percent: left,
            width_percent: width,
            image_index,
            flagged,
        });
        p += step;
    }

    nests
}

/// Scroll position of the roll view, in virtual pixels
#[derive(Debug, Clone, Default)]
pub struct RollState {
    pub scroll_top_px: f64,
    scroll_target_px: Option<f64>,
}

impl RollState {
    /// Manual scroll; cancels any in-flight smooth jump
    pub fn scroll_by(&mut self, delta_px: f64, max_scroll_px: f64) {
        self.scroll_target_px = None;
        self.scroll_top_px = (self.scroll_top_px + delta_px).clamp(0.0, max_scroll_px.max(0.0));
    }

    /// Begin a smooth scroll toward the given offset
    pub fn jump_to(&mut self, target_px: f64, max_scroll_px: f64) {
        self.scroll_target_px = Some(target_px.clamp(0.0, max_scroll_px.max(0.0)));
    }

    /// Whether a smooth jump is still in flight
    pub fn is_animating(&self) -> bool {
        self.scroll_target_px.is_some()
    }

    /// Ease toward the pending target; called once per frame
    pub fn tick(&mut self) {
        if let Some(target) = self.scroll_target_px {
            let diff = target - self.scroll_top_px;
            if diff.abs() < 1.0 {
                self.scroll_top_px = target;
                self.scroll_target_px = None;
            } else {
                self.scroll_top_px += diff * 0.25;
            }
        }
    }
}

/// Total height of the scrollable surface in virtual pixels
pub fn surface_px(total_meters: f64, map: &ViewportMap) -> f64 {
    map.meter_to_pixel(total_meters) + TRAIL_MARGIN_PX
}

/// Largest valid scroll offset for the given viewport
pub fn max_scroll_px(total_meters: f64, viewport_px: f64, map: &ViewportMap) -> f64 {
    (surface_px(total_meters, map) - viewport_px).max(0.0)
}

/// The scrolling roll widget
pub struct RollWidget<'a> {
    defects: &'a [DefectRecord],
    state: &'a RollState,
    map: &'a ViewportMap,
    total_meters: f64,
    offset_meters: f64,
    selected: Option<u32>,
    bulk_selected: &'a [u32],
    animation_frame: u64,
}

impl<'a> RollWidget<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        defects: &'a [DefectRecord],
        state: &'a RollState,
        map: &'a ViewportMap,
        total_meters: f64,
        offset_meters: f64,
        selected: Option<u32>,
        bulk_selected: &'a [u32],
        animation_frame: u64,
    ) -> Self {
        Self {
            defects,
            state,
            map,
            total_meters,
            offset_meters,
            selected,
            bulk_selected,
            animation_frame,
        }
    }

    /// Terminal row for an absolute virtual pixel, if visible
    fn row_for_px(&self, px: f64, height: u16) -> Option<u16> {
        let row = ((px - self.state.scroll_top_px) / PIXELS_PER_ROW).floor();
        if row >= 0.0 && row < height as f64 {
            Some(row as u16)
        } else {
            None
        }
    }

    fn render_header(&self, inner: Rect, buf: &mut Buffer) {
        let header_rows =
            (self.map.start_offset_px() / PIXELS_PER_ROW).ceil().max(0.0) as i64;

        for hr in 0..header_rows {
            let px = hr as f64 * PIXELS_PER_ROW;
            let Some(row) = self.row_for_px(px, inner.height) else {
                continue;
            };
            let y = inner.y + row;

            for x in inner.x..inner.x + inner.width {
                buf[(x, y)].set_char(' ');
                buf[(x, y)].set_style(Style::default().bg(colors::MACHINE_BG));
            }

            if hr == 1 {
                let brand = "H P   L A T E X   3 0 0 0";
                let x = inner.x + inner.width.saturating_sub(brand.len() as u16) / 2;
                buf.set_string(
                    x,
                    y,
                    brand,
                    Style::default()
                        .fg(colors::MACHINE_BRAND)
                        .bg(colors::MACHINE_BG)
                        .add_modifier(Modifier::BOLD),
                );
            } else if hr == 2 {
                let ready = "[ READY ]";
                let x = (inner.x + inner.width).saturating_sub(ready.len() as u16 + 2);
                buf.set_string(
                    x,
                    y,
                    ready,
                    Style::default().fg(colors::GREEN).bg(colors::MACHINE_BG),
                );
            } else if hr == header_rows - 1 {
                // Mechanical exit lip where the paper leaves the press
                for x in inner.x..inner.x + inner.width {
                    buf[(x, y)].set_char(EXIT_LIP);
                    buf[(x, y)].set_style(Style::default().fg(colors::MACHINE_LIP));
                }
            }
        }
    }

    fn render_meter_rule(&self, inner: Rect, buf: &mut Buffer) {
        let last_meter = self.total_meters.ceil() as i64;
        for meter in 0..=last_meter {
            let px = self.map.meter_to_pixel(meter as f64);
            if let Some(row) = self.row_for_px(px, inner.height) {
                let label = format!("{:>3}m┤", meter);
                buf.set_string(inner.x, inner.y + row, &label, styles::text_hint());
            }
        }
    }

    fn render_nests(&self, inner: Rect, buf: &mut Buffer, roll_x: u16, roll_width: u16) {
        let nests = layout_nests(
            self.defects,
            self.offset_meters,
            self.total_meters,
            self.map.pixels_per_meter(),
        );

        for nest in &nests {
            let abs_top = self.map.start_offset_px() + nest.top_px;
            let abs_bottom = abs_top + nest.height_px;

            let first_row =
                ((abs_top - self.state.scroll_top_px) / PIXELS_PER_ROW).ceil().max(0.0) as i64;
            let last_row =
                (((abs_bottom - self.state.scroll_top_px) / PIXELS_PER_ROW).floor() as i64)
                    .min(inner.height as i64 - 1);

            if last_row < first_row {
                continue;
            }

            let x0 = roll_x + (nest.left_percent / 100.0 * roll_width as f64) as u16;
            let cols = ((nest.width_percent / 100.0 * roll_width as f64) as u16).max(1);
            let (fill, style) = if nest.flagged {
                (BLOCK_MEDIUM, Style::default().fg(colors::NEST_FLAGGED))
            } else {
                (BLOCK_LIGHT, Style::default().fg(colors::NEST))
            };

            for row in first_row..=last_row {
                // Never paint into the machine header zone
                let row_px = self.state.scroll_top_px + row as f64 * PIXELS_PER_ROW;
                if row_px < self.map.start_offset_px() {
                    continue;
                }
                let y = inner.y + row as u16;
                for x in x0..(x0 + cols).min(roll_x + roll_width) {
                    if buf[(x, y)].symbol() == " " {
                        buf[(x, y)].set_char(fill);
                        buf[(x, y)].set_style(style);
                    }
                }
            }

            if let Some(row) = self.row_for_px(abs_top + PIXELS_PER_ROW, inner.height) {
                let label = format!("#{}", nest.image_index);
                if x0 + label.len() as u16 <= roll_x + roll_width {
                    buf.set_string(x0, inner.y + row, &label, styles::text_hint());
                }
            }
        }
    }

    fn render_markers(&self, inner: Rect, buf: &mut Buffer, roll_x: u16, roll_width: u16) {
        for defect in self.defects {
            let is_selected = self.selected == Some(defect.id);
            let in_bulk = self.bulk_selected.contains(&defect.id);
            if defect.is_dismissed() && !is_selected && !in_bulk {
                continue;
            }

            let px = self.map.meter_to_pixel(defect.position_meters);
            let Some(row) = self.row_for_px(px, inner.height) else {
                continue;
            };
            let y = inner.y + row;
            let x = roll_x + (defect.lateral_percent / 100.0 * roll_width as f64) as u16;

            let color = if defect.is_dismissed() {
                colors::MARKER_DISMISSED
            } else {
                severity_color(defect.severity)
            };

            // Selected markers pulse; the rest sit still
            let glyph = if is_selected {
                if (self.animation_frame / 4) % 2 == 0 {
                    '◉'
                } else {
                    '●'
                }
            } else if defect.is_dismissed() {
                '○'
            } else {
                '●'
            };

            let mut style = Style::default().fg(color);
            if is_selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            buf[(x.min(inner.x + inner.width - 1), y)].set_char(glyph);
            buf[(x.min(inner.x + inner.width - 1), y)].set_style(style);

            let label = format!("{}{}", defect.kind.glyph(), defect.id);
            if x + 1 + label.len() as u16 <= roll_x + roll_width {
                let label_style = if is_selected {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                } else {
                    styles::text_dim()
                };
                buf.set_string(x + 1, y, &label, label_style);
            }

            if in_bulk && x > roll_x {
                buf.set_string(x - 1, y, "▸", Style::default().fg(colors::BLUE));
            }
        }
    }

    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let legend_y = area.y + area.height - 1;
        let mut x = area.x + 2;

        let items = [
            ('●', "Critical", severity_color(Severity::Critical)),
            ('●', "High", severity_color(Severity::High)),
            ('●', "Medium", severity_color(Severity::Medium)),
            ('●', "Low", severity_color(Severity::Low)),
            ('○', "Dismissed", colors::MARKER_DISMISSED),
        ];

        for (icon, label, color) in items {
            if x + label.len() as u16 + 4 > area.x + area.width {
                break;
            }
            buf.set_string(x, legend_y, icon.to_string(), Style::default().fg(color));
            x += 1;
            buf.set_string(x, legend_y, label, styles::text_hint());
            x += label.len() as u16 + 2;
        }
    }
}

impl Widget for RollWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Live Roll ")
            .title_style(styles::title_accent())
            .borders(Borders::ALL)
            .border_style(styles::border())
            .style(Style::default().bg(colors::PAPER_BG));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < GUTTER_COLS + 10 || inner.height < 4 {
            return;
        }

        let roll_x = inner.x + GUTTER_COLS;
        let roll_width = inner.width - GUTTER_COLS;

        self.render_meter_rule(inner, buf);
        self.render_nests(inner, buf, roll_x, roll_width);
        self.render_markers(inner, buf, roll_x, roll_width);
        self.render_header(inner, buf);
        self.render_legend(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefectKind, DefectOrigin, DefectStatus, Severity};
    use crate::viewport::HEADER_OFFSET_PX;

    fn defect(id: u32, meter: f64, lateral: f64) -> DefectRecord {
        DefectRecord {
            id,
            kind: DefectKind::Banding,
            severity: Severity::Medium,
            detected_at: "10:00".to_string(),
            position_meters: meter,
            lateral_percent: lateral,
            status: DefectStatus::Active,
            origin: DefectOrigin::Machine,
            delta_e: None,
            waste_cost: None,
            waste_meters: None,
            dismiss_reason: None,
            operator_id: None,
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let defects = vec![defect(1, 10.0, 40.0), defect(2, 23.5, 70.0)];
        let a = layout_nests(&defects, 2.4, 50.0, 150.0);
        let b = layout_nests(&defects, 2.4, 50.0, 150.0);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_nests_cover_roll_surface() {
        let nests = layout_nests(&[], 0.0, 50.0, 150.0);
        // Every retained slot is within the render buffer zone
        for nest in &nests {
            assert!(nest.top_px >= -500.0);
            assert!(nest.top_px <= 50.0 * 150.0 + 500.0);
            assert!(nest.width_percent >= 50.0 && nest.width_percent < 90.0 + 1.0);
            assert!(nest.left_percent >= 0.0);
            assert!(nest.left_percent + nest.width_percent <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn test_promoted_nest_covers_defect() {
        // Lateral 95% sits outside any random nest; promotion must stretch
        // the slot to reach it.
        let defects = vec![defect(3, 10.0, 95.0)];
        let nests = layout_nests(&defects, 0.0, 50.0, 150.0);

        let promoted: Vec<&PrintNest> = nests.iter().filter(|n| n.flagged).collect();
        assert!(!promoted.is_empty());
        assert!(promoted.iter().any(|n| {
            n.left_percent <= 95.0 && n.left_percent + n.width_percent >= 95.0
        }));
    }

    #[test]
    fn test_promoted_nest_uses_defect_image_key() {
        let defects = vec![defect(7, 8.0, 50.0)];
        let nests = layout_nests(&defects, 0.0, 50.0, 150.0);
        assert!(nests.iter().any(|n| n.flagged && n.image_index == 1007));
    }

    #[test]
    fn test_layout_stable_under_offset() {
        // A slot's randomized shape is keyed by its paper coordinate, so the
        // same slot keeps its width as the roll advances.
        let a = layout_nests(&[], 0.0, 50.0, 150.0);
        let b = layout_nests(&[], NEST_STEP_METERS, 50.0 + NEST_STEP_METERS, 150.0);

        // Slot p=0 appears in both runs, shifted down one step
        let in_a = a
            .iter()
            .find(|n| (n.top_px - 0.0).abs() < 1e-6)
            .expect("slot p=0 in first layout");
        let in_b = b
            .iter()
            .find(|n| (n.top_px - NEST_STEP_METERS * 150.0).abs() < 1e-6)
            .expect("slot p=0 in second layout");
        assert!((in_a.width_percent - in_b.width_percent).abs() < 1e-9);
        assert!((in_a.left_percent - in_b.left_percent).abs() < 1e-9);
        assert_eq!(in_a.image_index, in_b.image_index);
    }

    #[test]
    fn test_scroll_state_clamps_and_eases() {
        let mut state = RollState::default();
        state.scroll_by(-100.0, 5000.0);
        assert_eq!(state.scroll_top_px, 0.0);

        state.scroll_by(10_000.0, 5000.0);
        assert_eq!(state.scroll_top_px, 5000.0);

        state.jump_to(0.0, 5000.0);
        assert!(state.is_animating());
        while state.is_animating() {
            state.tick();
        }
        assert_eq!(state.scroll_top_px, 0.0);
    }

    #[test]
    fn test_surface_and_max_scroll() {
        let map = ViewportMap::default();
        let surface = surface_px(50.0, &map);
        assert!((surface - (HEADER_OFFSET_PX + 50.0 * 150.0 + TRAIL_MARGIN_PX)).abs() < 1e-9);

        assert_eq!(max_scroll_px(50.0, surface + 100.0, &map), 0.0);
        assert!((max_scroll_px(50.0, 600.0, &map) - (surface - 600.0)).abs() < 1e-9);
    }
}
