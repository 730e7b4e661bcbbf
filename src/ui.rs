//! UI rendering module.
//!
//! All ratatui drawing lives here: the tab bar, the top bar, the five
//! content views, the log pane and the overlay modals. Rendering only reads
//! the App state; every mutation goes through key handling in `app.rs`.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, DismissField, FilterMode, LogLevel, SettingsRow, View, OPERATORS};
use crate::models::{DefectRecord, Severity, AVAILABLE_MACHINES, TRAINING_MODULES};
use crate::rail::TimelineRail;
use crate::roll::RollWidget;
use crate::theme::{colors, machine_status_color, severity_color, styles};

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let bg_block = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Length(3), // Top bar
            Constraint::Min(10),   // Main content
            Constraint::Length(5), // Log area
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_top_bar(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_logs(frame, app, chunks[3]);

    // Overlays
    if app.dismiss_form.is_some() {
        render_dismiss_modal(frame, app, area);
    }
    if app.snapshot_open {
        render_snapshot_modal(frame, app, area);
    }
    if app.alert.is_some() {
        render_alert_popup(frame, app, area);
    }
    if app.show_help {
        render_help_overlay(frame, area);
    }
}

/// Render the tab bar
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::all()
        .iter()
        .map(|view| {
            let style = if *view == app.view {
                styles::tab_active()
            } else {
                styles::tab_inactive()
            };
            Line::from(Span::styled(format!(" {} ", view.name()), style))
        })
        .collect();

    let selected = View::all().iter().position(|v| *v == app.view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" Roll Monitor ")
                .title_style(styles::title())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(Style::default().bg(colors::BG_MEDIUM)),
        )
        .select(selected)
        .style(styles::text())
        .highlight_style(styles::tab_active())
        .divider(Span::styled(" | ", styles::border_dim()));

    frame.render_widget(tabs, area);
}

/// Render the top bar: machine, job, press state and live totals
fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_dim())
        .style(Style::default().bg(colors::BG_MEDIUM));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let state_style = match app.job.state_label() {
        "PRINTING" => styles::success().add_modifier(Modifier::BOLD),
        "PAUSED" => styles::warning().add_modifier(Modifier::BOLD),
        _ => styles::error().add_modifier(Modifier::BOLD),
    };

    let left = Line::from(vec![
        Span::styled(
            app.job.machine_name.clone(),
            styles::title(),
        ),
        Span::styled(format!("  ID: {}", app.job.machine_id), styles::text_dim()),
        Span::styled(format!("  Job: {}", app.job.job_name), styles::text_dim()),
    ]);
    frame.render_widget(Paragraph::new(left), inner);

    let right = Line::from(vec![
        Span::styled(format!("[{}] ", app.job.state_label()), state_style),
        Span::styled(
            format!(
                "{:.1}m / {:.0}m  ",
                app.job.current_meter, app.job.total_length_meters
            ),
            styles::text(),
        ),
        Span::styled(format!("{:.0} m/min  ", app.job.print_speed), styles::text_dim()),
        Span::styled(
            format!("Waste: €{:.2}  ", app.sim.total_waste_cost()),
            Style::default().fg(colors::ORANGE),
        ),
        Span::styled(app.quality_profile.label(), styles::text_hint()),
    ]);
    frame.render_widget(
        Paragraph::new(right).alignment(Alignment::Right),
        inner,
    );
}

/// Render the main content area based on active view
fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::ActiveJob => render_active_job(frame, app, area),
        View::Dashboard => render_dashboard(frame, app, area),
        View::Reports => render_reports(frame, app, area),
        View::Training => render_training(frame, app, area),
        View::Settings => render_settings(frame, app, area),
    }
}

// ============================================
// Active job view
// ============================================

fn render_active_job(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(40),    // Roll
            Constraint::Length(10), // Timeline rail
            Constraint::Length(44), // Defect panel
        ])
        .split(area);

    let roll = RollWidget::new(
        app.sim.defects(),
        &app.roll,
        &app.viewport,
        app.sim.total_roll_meters(),
        app.sim.distance_meters(),
        app.selected_defect,
        &app.bulk_selected,
        app.frame_count,
    );
    frame.render_widget(roll, chunks[0]);

    let rail = TimelineRail::new(
        app.sim.defects(),
        app.sim.total_roll_meters(),
        app.center_meter,
        app.selected_defect,
    );
    frame.render_widget(rail, chunks[1]);

    let selected = app
        .selected_defect
        .and_then(|id| app.sim.defect(id));
    match selected {
        Some(defect) => render_defect_detail(frame, app, defect, chunks[2]),
        None => render_defect_list(frame, app, chunks[2]),
    }
}

fn render_defect_list(frame: &mut Frame, app: &App, area: Rect) {
    let ids = app.filtered_active_ids();
    let count = app.sim.active_count();

    let block = Block::default()
        .title(format!(" Detected Defects ({count}) "))
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_style(styles::border())
        .style(Style::default().bg(colors::BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filter line
            Constraint::Length(1), // Bulk line
            Constraint::Min(3),    // List
        ])
        .split(inner);

    let filter_line = Line::from(vec![
        Span::styled("Filter: ", styles::text_dim()),
        Span::styled(
            app.filter.name(),
            if app.filter == FilterMode::CriticalOnly {
                styles::error().add_modifier(Modifier::BOLD)
            } else {
                styles::info()
            },
        ),
        Span::styled("  (f to toggle)", styles::text_hint()),
    ]);
    frame.render_widget(Paragraph::new(filter_line), chunks[0]);

    let bulk_line = if app.bulk_selected.is_empty() {
        Line::from(Span::styled(
            "x: mark  a: mark all  j/k: select",
            styles::text_hint(),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                format!("{} marked", app.bulk_selected.len()),
                styles::info(),
            ),
            Span::styled("  d: ignore marked  a: clear", styles::text_hint()),
        ])
    };
    frame.render_widget(Paragraph::new(bulk_line), chunks[1]);

    if ids.is_empty() {
        let empty = Paragraph::new("No active defects found.")
            .style(styles::text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(empty, chunks[2]);
        return;
    }

    let items: Vec<ListItem> = ids
        .iter()
        .filter_map(|id| app.sim.defect(*id))
        .map(|defect| defect_list_item(app, defect))
        .collect();

    let list = List::new(items).style(styles::text());
    frame.render_widget(list, chunks[2]);
}

fn defect_list_item<'a>(app: &App, defect: &'a DefectRecord) -> ListItem<'a> {
    let is_selected = app.selected_defect == Some(defect.id);
    let is_marked = app.bulk_selected.contains(&defect.id);

    let row_style = if is_selected {
        styles::selected()
    } else {
        styles::text()
    };

    let marker = if is_marked { "▸" } else { " " };
    let content = Line::from(vec![
        Span::styled(marker, styles::info()),
        Span::styled("● ", Style::default().fg(severity_color(defect.severity))),
        Span::styled(format!("#{:<3}", defect.id), row_style),
        Span::styled(format!("{:<24}", truncate(defect.kind.label(), 24)), row_style),
        Span::styled(
            format!("{:>6.1}m ", defect.position_meters),
            if is_selected { row_style } else { styles::text_dim() },
        ),
        Span::styled(
            defect.detected_at.clone(),
            if is_selected { row_style } else { styles::text_hint() },
        ),
    ]);
    ListItem::new(content)
}

fn render_defect_detail(frame: &mut Frame, app: &App, defect: &DefectRecord, area: Rect) {
    let block = Block::default()
        .title(format!(" Defect #{} ", defect.id))
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .style(Style::default().bg(colors::BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            defect.kind.label(),
            Style::default()
                .fg(colors::FG_PRIMARY)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(vec![
            Span::styled(
                format!(" {} ", defect.severity.label().to_uppercase()),
                Style::default()
                    .fg(colors::BG_DARK)
                    .bg(severity_color(defect.severity))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", defect.status.label()),
                match defect.status {
                    crate::models::DefectStatus::Active => styles::info(),
                    crate::models::DefectStatus::Dismissed => styles::text_dim(),
                    crate::models::DefectStatus::Reported => styles::success(),
                },
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Detected: ", styles::text_dim()),
            Span::styled(defect.detected_at.clone(), styles::text()),
            Span::styled("   Position: ", styles::text_dim()),
            Span::styled(format!("{:.1}m", defect.position_meters), styles::text()),
        ]),
        Line::from(vec![
            Span::styled("Lateral:  ", styles::text_dim()),
            Span::styled(format!("{:.0}% across", defect.lateral_percent), styles::text()),
            Span::styled("   Origin: ", styles::text_dim()),
            Span::styled(defect.origin.label(), styles::text()),
        ]),
    ];

    if let Some(delta_e) = defect.delta_e {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "RIP / Color Data",
            styles::title(),
        )));
        lines.push(Line::from(vec![
            Span::styled("  Target profile: ", styles::text_dim()),
            Span::styled("Coated_Fogra39", styles::text()),
        ]));
        let over = delta_e > app.thresholds.delta_e;
        lines.push(Line::from(vec![
            Span::styled("  Measured ΔE: ", styles::text_dim()),
            Span::styled(
                format!("{delta_e:.1}"),
                if over { styles::error() } else { styles::text() },
            ),
            Span::styled(
                format!("  (tolerance {:.1})", app.thresholds.delta_e),
                styles::text_hint(),
            ),
        ]));
    }

    if let (Some(cost), Some(meters)) = (defect.waste_cost, defect.waste_meters) {
        lines.push(Line::from(vec![
            Span::styled("Est. waste: ", styles::text_dim()),
            Span::styled(
                format!("{meters:.1}m · €{cost:.2}"),
                Style::default().fg(colors::ORANGE),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Probable Causes", styles::warning())));
    for cause in defect.kind.probable_causes() {
        lines.push(Line::from(Span::styled(format!("  • {cause}"), styles::text())));
    }
    lines.push(Line::from(Span::styled("Recommended Actions", styles::info())));
    for action in defect.kind.corrective_actions() {
        lines.push(Line::from(Span::styled(format!("  • {action}"), styles::text())));
    }

    if defect.is_dismissed() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Ignored: ", styles::text_dim()),
            Span::styled(
                defect.dismiss_reason.clone().unwrap_or_default(),
                styles::text(),
            ),
            Span::styled(
                format!(" ({})", defect.operator_id.clone().unwrap_or_default()),
                styles::text_hint(),
            ),
        ]));
    }

    lines.push(Line::from(""));
    let actions = if defect.is_dismissed() {
        "u: restore  v: snapshot  Esc: back"
    } else {
        "d: ignore  r: report  v: snapshot  Esc: back"
    };
    lines.push(Line::from(Span::styled(actions, styles::text_hint())));
    if defect.severity == Severity::Critical && !defect.is_dismissed() {
        lines.push(Line::from(Span::styled(
            "s: STOP PRESS",
            styles::error().add_modifier(Modifier::BOLD),
        )));
    }

    let detail = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(detail, inner);
}

// ============================================
// Dashboard view
// ============================================

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // KPI cards
            Constraint::Min(6),    // Machine grid
        ])
        .split(area);

    render_kpi_cards(frame, app, chunks[0]);
    render_machine_grid(frame, app, chunks[1]);
}

fn render_kpi_cards(frame: &mut Frame, app: &App, area: Rect) {
    struct Card {
        title: &'static str,
        value: String,
        subtitle: String,
        color: Color,
    }

    let mut cards: Vec<Card> = Vec::new();
    if app.widgets.efficiency {
        cards.push(Card {
            title: "PRODUCTION EFFICIENCY",
            value: "92%".to_string(),
            subtitle: "↑ 2.4% vs last week".to_string(),
            color: colors::GREEN,
        });
    }
    if app.widgets.active_jobs {
        cards.push(Card {
            title: "ACTIVE JOBS",
            value: "3".to_string(),
            subtitle: "5 jobs queued".to_string(),
            color: colors::BLUE,
        });
    }
    if app.widgets.defects {
        cards.push(Card {
            title: "ACTIVE DEFECTS",
            value: app.sim.active_count().to_string(),
            subtitle: format!("{:.1}m printed this epoch", app.sim.distance_meters()),
            color: colors::ORANGE,
        });
    }
    if app.widgets.cost {
        cards.push(Card {
            title: "EST. WASTE COST",
            value: format!("€{:.0}", app.sim.total_waste_cost()),
            subtitle: "Today's accumulation".to_string(),
            color: colors::YELLOW,
        });
    }

    if cards.is_empty() {
        let hint = Paragraph::new("All dashboard cards hidden — re-enable them in Settings.")
            .style(styles::text_dim())
            .alignment(Alignment::Center);
        frame.render_widget(hint, area);
        return;
    }

    let constraints: Vec<Constraint> = cards
        .iter()
        .map(|_| Constraint::Ratio(1, cards.len() as u32))
        .collect();
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, slot) in cards.iter().zip(slots.iter()) {
        let block = Block::default()
            .title(format!(" {} ", card.title))
            .title_style(styles::text_hint())
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_MEDIUM));
        let inner = block.inner(*slot);
        frame.render_widget(block, *slot);

        let lines = vec![
            Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(card.color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(card.subtitle.clone(), styles::text_hint())),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn render_machine_grid(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = AVAILABLE_MACHINES
        .iter()
        .enumerate()
        .map(|(i, machine)| {
            let is_selected = i == app.machine_selected;
            let is_current = machine.id == app.job.machine_id;
            let row_style = if is_selected {
                styles::selected()
            } else {
                styles::text()
            };

            let content = Line::from(vec![
                Span::styled("⬤ ", Style::default().fg(machine_status_color(machine.status))),
                Span::styled(format!("{:<24}", machine.name), row_style),
                Span::styled(format!("{:<12}", machine.id), if is_selected { row_style } else { styles::text_dim() }),
                Span::styled(
                    format!("{:<8}", machine.status.label()),
                    if is_selected {
                        row_style
                    } else {
                        Style::default().fg(machine_status_color(machine.status))
                    },
                ),
                Span::styled(if is_current { "◀ monitoring" } else { "" }, styles::info()),
            ]);
            ListItem::new(content)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Machine Status — Enter to monitor ")
            .title_style(styles::title_accent())
            .borders(Borders::ALL)
            .border_style(styles::border())
            .style(Style::default().bg(colors::BG_DARK)),
    );
    frame.render_widget(list, area);
}

// ============================================
// Reports view
// ============================================

fn render_reports(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Material Waste Report ")
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_style(styles::border())
        .style(Style::default().bg(colors::BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stat cards
            Constraint::Min(4),    // Breakdown
        ])
        .split(inner);

    let breakdown = app.waste_by_kind();
    let top_cause = breakdown
        .first()
        .map(|(kind, _, _)| kind.label())
        .unwrap_or("—");

    let stats = [
        (
            "TOTAL WASTE LENGTH",
            format!("{:.1} m", app.sim.total_waste_meters()),
            colors::ORANGE,
        ),
        (
            "ESTIMATED COST",
            format!("€{:.2}", app.sim.total_waste_cost()),
            colors::RED,
        ),
        ("TOP DEFECT CAUSE", top_cause.to_string(), colors::BLUE),
    ];

    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);

    for ((title, value, color), slot) in stats.iter().zip(slots.iter()) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(styles::text_hint())
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_MEDIUM));
        let inner = block.inner(*slot);
        frame.render_widget(block, *slot);
        frame.render_widget(
            Paragraph::new(Span::styled(
                value.clone(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            inner,
        );
    }

    // Per-kind breakdown with proportional bars
    let max_count = breakdown.iter().map(|(_, n, _)| *n).max().unwrap_or(1);
    let lines: Vec<Line> = if breakdown.is_empty() {
        vec![Line::from(Span::styled(
            "No active defects contributing to waste.",
            styles::text_dim(),
        ))]
    } else {
        breakdown
            .iter()
            .map(|(kind, count, cost)| {
                let bar_len = (count * 20 / max_count).max(1);
                Line::from(vec![
                    Span::styled(format!("{:<26}", truncate(kind.label(), 26)), styles::text()),
                    Span::styled("█".repeat(bar_len), Style::default().fg(colors::ORANGE)),
                    Span::styled(
                        format!(" {count} · €{cost:.2}"),
                        styles::text_dim(),
                    ),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines), chunks[1]);
}

// ============================================
// Training view
// ============================================

fn render_training(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(area);

    let items: Vec<ListItem> = TRAINING_MODULES
        .iter()
        .enumerate()
        .map(|(i, module)| {
            let style = if i == app.training_selected {
                styles::selected()
            } else {
                styles::text()
            };
            ListItem::new(Line::from(Span::styled(module.title, style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Defect Library ")
            .title_style(styles::title_accent())
            .borders(Borders::ALL)
            .border_style(styles::border())
            .style(Style::default().bg(colors::BG_DARK)),
    );
    frame.render_widget(list, chunks[0]);

    let module = &TRAINING_MODULES[app.training_selected % TRAINING_MODULES.len()];
    let block = Block::default()
        .title(format!(" {} ", module.title))
        .title_style(styles::title())
        .borders(Borders::ALL)
        .border_style(styles::border_dim())
        .style(Style::default().bg(colors::BG_DARK));
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Reference frame #{}", module.image_index),
            styles::text_hint(),
        )),
        Line::from(""),
        Line::from(Span::styled(module.description, styles::text())),
        Line::from(""),
        Line::from(Span::styled("Common Causes", styles::warning())),
    ];
    for cause in module.kind.probable_causes() {
        lines.push(Line::from(Span::styled(format!("  • {cause}"), styles::text())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Prevention", styles::info())));
    lines.push(Line::from(Span::styled(format!("  {}", module.prevention), styles::text())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Fix", styles::success())));
    lines.push(Line::from(Span::styled(format!("  {}", module.fix), styles::text())));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ============================================
// Settings view
// ============================================

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Settings ")
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_style(styles::border())
        .style(Style::default().bg(colors::BG_DARK));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = SettingsRow::all();
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let is_selected = i == app.settings_selected;
            let style = if is_selected {
                styles::selected()
            } else {
                styles::text()
            };
            let value = match row {
                SettingsRow::Profile => app.quality_profile.label().to_string(),
                SettingsRow::DeltaE => format!("{:.1}", app.thresholds.delta_e),
                SettingsRow::MinDefectSize => {
                    format!("{:.1} mm", app.thresholds.min_defect_size_mm)
                }
                SettingsRow::HighSeverity => {
                    format!("{}% match", app.thresholds.high_severity_percentage)
                }
                SettingsRow::WidgetEfficiency => checkbox(app.widgets.efficiency),
                SettingsRow::WidgetActiveJobs => checkbox(app.widgets.active_jobs),
                SettingsRow::WidgetDefects => checkbox(app.widgets.defects),
                SettingsRow::WidgetCost => checkbox(app.widgets.cost),
            };
            let value_style = if is_selected {
                style
            } else {
                styles::info()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<32}", row.label()), style),
                Span::styled(value, value_style),
                Span::styled(
                    if is_selected { "   ◀ h/l ▶" } else { "" },
                    styles::text_hint(),
                ),
            ]))
        })
        .collect();

    let list = List::new(items);
    frame.render_widget(list, inner);
}

fn checkbox(value: bool) -> String {
    if value { "[x]".to_string() } else { "[ ]".to_string() }
}

// ============================================
// Log pane
// ============================================

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let (prefix, color) = match entry.level {
                LogLevel::Info => ("i", colors::BLUE),
                LogLevel::Success => ("+", colors::GREEN),
                LogLevel::Warning => ("!", colors::YELLOW),
                LogLevel::Error => ("x", colors::RED),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("[{prefix}] "), Style::default().fg(color)),
                Span::styled(&entry.message, styles::text_dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" System Log ")
            .title_style(Style::default().fg(colors::FG_DIM))
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_DARK)),
    );

    frame.render_widget(list, area);
}

// ============================================
// Overlays
// ============================================

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn render_dismiss_modal(frame: &mut Frame, app: &App, area: Rect) {
    let form = match &app.dismiss_form {
        Some(f) => f,
        None => return,
    };

    let popup_area = centered_rect(54, 15, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Ignore Defect? ")
        .title_style(styles::warning().add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .style(Style::default().bg(colors::BG_MEDIUM));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Message
            Constraint::Length(3), // Reason
            Constraint::Length(3), // Operator
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Buttons
            Constraint::Length(1), // Error
        ])
        .margin(1)
        .split(inner);

    let targets = match form.target_ids.as_slice() {
        [id] => format!("defect #{id}"),
        many => format!("{} defects", many.len()),
    };
    let message = Paragraph::new(format!(
        "Provide a reason for ignoring {targets}. This action will be logged."
    ))
    .style(styles::text_dim())
    .wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    render_text_field(
        frame,
        "Reason:",
        &form.reason,
        form.current_field() == DismissField::Reason,
        chunks[1],
    );

    let (op_id, op_name) = OPERATORS[form.operator_idx % OPERATORS.len()];
    render_selector_field(
        frame,
        "Operator:",
        &format!("{op_id} ({op_name})"),
        form.current_field() == DismissField::Operator,
        chunks[2],
    );

    render_form_buttons(
        frame,
        form.current_field() == DismissField::Submit,
        form.current_field() == DismissField::Cancel,
        chunks[4],
    );

    if let Some(ref error) = form.error {
        let error_text = Paragraph::new(error.as_str())
            .style(styles::error())
            .alignment(Alignment::Center);
        frame.render_widget(error_text, chunks[5]);
    }
}

/// Render a text input field
fn render_text_field(frame: &mut Frame, label: &str, value: &str, is_focused: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(11), Constraint::Min(10)])
        .split(area);

    let label_text = Paragraph::new(label)
        .style(styles::form_label())
        .alignment(Alignment::Right);
    frame.render_widget(label_text, chunks[0]);

    let input_style = if is_focused {
        styles::form_input_focused()
    } else {
        styles::form_input()
    };
    let cursor = if is_focused { "█" } else { "" };
    let input = Paragraph::new(format!(" {value}{cursor}"))
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).border_style(
            if is_focused {
                styles::border_focused()
            } else {
                styles::border_dim()
            },
        ));
    frame.render_widget(input, chunks[1]);
}

/// Render a selector/dropdown field
fn render_selector_field(
    frame: &mut Frame,
    label: &str,
    value: &str,
    is_focused: bool,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(11), Constraint::Min(10)])
        .split(area);

    let label_text = Paragraph::new(label)
        .style(styles::form_label())
        .alignment(Alignment::Right);
    frame.render_widget(label_text, chunks[0]);

    let input_style = if is_focused {
        styles::form_input_focused()
    } else {
        styles::form_input()
    };
    let arrows = if is_focused { " ▲▼" } else { " ▼" };
    let input = Paragraph::new(format!(" {value}{arrows}"))
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).border_style(
            if is_focused {
                styles::border_focused()
            } else {
                styles::border_dim()
            },
        ));
    frame.render_widget(input, chunks[1]);
}

/// Render form buttons
fn render_form_buttons(frame: &mut Frame, submit_focused: bool, cancel_focused: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Length(20),
            Constraint::Length(2),
            Constraint::Length(12),
            Constraint::Percentage(20),
        ])
        .split(area);

    let submit_style = if submit_focused {
        styles::button_danger()
    } else {
        styles::button()
    };
    let submit_btn = Paragraph::new(" [ Confirm Ignore ] ")
        .style(submit_style)
        .alignment(Alignment::Center);
    frame.render_widget(submit_btn, chunks[1]);

    let cancel_style = if cancel_focused {
        styles::button_focused()
    } else {
        styles::button()
    };
    let cancel_btn = Paragraph::new(" [ Cancel ] ")
        .style(cancel_style)
        .alignment(Alignment::Center);
    frame.render_widget(cancel_btn, chunks[3]);
}

fn render_snapshot_modal(frame: &mut Frame, app: &App, area: Rect) {
    let defect = match app.selected_defect.and_then(|id| app.sim.defect(id)) {
        Some(d) => d,
        None => return,
    };

    let popup_area = centered_rect(64, 20, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" Defect #{} — Camera Frame ", defect.id))
        .title_style(styles::title())
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .style(Style::default().bg(colors::BG_MEDIUM));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.height < 5 {
        return;
    }

    // Dithered placeholder standing in for the stock photo keyed by the
    // defect's image index
    let shades = ['░', '▒', '▓'];
    let buf = frame.buffer_mut();
    for row in 0..inner.height.saturating_sub(3) {
        for col in 0..inner.width {
            let seed = defect.image_index() as f64 * 0.37
                + row as f64 * 12.9898
                + col as f64 * 78.233;
            let unit = (seed.sin() * 10000.0).fract().abs();
            let shade = shades[(unit * shades.len() as f64) as usize % shades.len()];
            let pos = (inner.x + col, inner.y + row);
            buf[pos].set_char(shade);
            buf[pos].set_style(Style::default().fg(colors::NEST));
        }
    }

    let info_y = inner.y + inner.height - 3;
    let info = Line::from(vec![
        Span::styled(format!("frame #{}  ", defect.image_index()), styles::text_hint()),
        Span::styled(
            defect.kind.label(),
            Style::default().fg(severity_color(defect.severity)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  {:.1}m", defect.severity.label(), defect.position_meters),
            styles::text(),
        ),
        Span::styled(
            if defect.is_dismissed() { "  [IGNORED]" } else { "" },
            styles::text_dim(),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(info),
        Rect::new(inner.x + 1, info_y, inner.width.saturating_sub(2), 1),
    );

    let hint = Paragraph::new("Esc/v: close")
        .style(styles::text_hint())
        .alignment(Alignment::Center);
    frame.render_widget(
        hint,
        Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
    );
}

fn render_alert_popup(frame: &mut Frame, app: &App, area: Rect) {
    let popup = match &app.alert {
        Some(p) => p,
        None => return,
    };

    let popup_width = (area.width * 60 / 100).clamp(30, 60);
    let popup_area = centered_rect(popup_width, 7, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", popup.title))
        .title_style(
            Style::default()
                .fg(Color::White)
                .bg(colors::SEVERITY_CRITICAL)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SEVERITY_CRITICAL))
        .style(Style::default().bg(Color::Rgb(0x2A, 0x18, 0x18)));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = Paragraph::new(popup.message.as_str())
        .style(styles::text())
        .wrap(Wrap { trim: true });
    frame.render_widget(text, inner);

    let hint = Paragraph::new("Press ESC or ENTER to dismiss")
        .style(styles::text_hint())
        .alignment(Alignment::Center);
    let hint_area = Rect::new(
        popup_area.x,
        popup_area.y + popup_area.height - 1,
        popup_area.width,
        1,
    );
    frame.render_widget(hint, hint_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(58, 24, area);
    frame.render_widget(Clear, popup_area);

    let section = |label: &'static str| {
        Line::from(Span::styled(
            label,
            Style::default().fg(colors::PURPLE).add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<16}"), Style::default().fg(colors::BLUE)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().fg(colors::BLUE).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Global"),
        entry("Tab/Shift+Tab", "Switch views"),
        entry("Space", "Pause / resume printing"),
        entry("s", "Stop the press"),
        entry("q", "Quit"),
        Line::from(""),
        section("Active Job"),
        entry("j/k", "Select next/previous defect"),
        entry("Enter", "Center the roll on the selection"),
        entry("Up/Down/PgUp/PgDn", "Scroll the roll"),
        entry("g/G", "Jump to roll start/end"),
        entry("d", "Ignore selection (with reason)"),
        entry("r / u", "Report / restore selection"),
        entry("v", "View camera snapshot"),
        entry("x / a", "Mark defect / mark all"),
        entry("f", "Toggle Critical-only filter"),
        Line::from(""),
        section("Other Views"),
        entry("j/k + Enter", "Pick machine / training module"),
        entry("h/l", "Adjust the focused setting"),
        Line::from(""),
        Line::from(Span::styled("Press ESC to close", styles::text_hint())),
    ];

    let help = Paragraph::new(help_text).block(
        Block::default()
            .title(" Help ")
            .title_style(styles::title())
            .borders(Borders::ALL)
            .border_style(styles::border_focused())
            .style(Style::default().bg(colors::BG_MEDIUM)),
    );
    frame.render_widget(help, popup_area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() > max {
        format!("{}…", &text[..max.saturating_sub(1)])
    } else {
        text.to_string()
    }
}
