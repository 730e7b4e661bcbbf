//! Application state and event handling.
//!
//! This module implements the Elm Architecture pattern: a single App struct
//! owns every piece of UI and simulation state. Key events and clock ticks
//! mutate it, the renderer only reads it.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::AppConfig;
use crate::models::{
    DashboardWidgets, DefectKind, DefectRecord, JobStatus, QualityProfile, Severity,
    ThresholdConfig, AVAILABLE_MACHINES, TRAINING_MODULES,
};
use crate::roll::{self, RollState};
use crate::sim::{RollSimulation, SimCommand, TickOutcome};
use crate::viewport::{ViewportMap, PIXELS_PER_ROW};

/// Operators that can sign off a dismissal
pub const OPERATORS: &[(&str, &str)] = &[
    ("OP-001", "John D."),
    ("OP-002", "Sarah M."),
    ("ADMIN", "Administrator"),
];

/// Rows of chrome around the main content: tabs, top bar, log pane, borders
const CHROME_ROWS: u16 = 3 + 3 + 5 + 2;

/// Active view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    Dashboard,
    #[default]
    ActiveJob,
    Reports,
    Training,
    Settings,
}

impl View {
    pub fn all() -> &'static [View] {
        &[
            View::Dashboard,
            View::ActiveJob,
            View::Reports,
            View::Training,
            View::Settings,
        ]
    }

    pub fn next(&self) -> Self {
        match self {
            View::Dashboard => View::ActiveJob,
            View::ActiveJob => View::Reports,
            View::Reports => View::Training,
            View::Training => View::Settings,
            View::Settings => View::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            View::Dashboard => View::Settings,
            View::ActiveJob => View::Dashboard,
            View::Reports => View::ActiveJob,
            View::Training => View::Reports,
            View::Settings => View::Training,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::ActiveJob => "Active Job",
            View::Reports => "Reports",
            View::Training => "Training",
            View::Settings => "Settings",
        }
    }
}

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// The dismiss-confirmation form is open
    Dismissing,
}

/// Defect list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    CriticalOnly,
}

impl FilterMode {
    pub fn toggle(&self) -> Self {
        match self {
            FilterMode::All => FilterMode::CriticalOnly,
            FilterMode::CriticalOnly => FilterMode::All,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::CriticalOnly => "Critical only",
        }
    }
}

/// Fields of the dismiss-confirmation form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissField {
    Reason,
    Operator,
    Submit,
    Cancel,
}

impl DismissField {
    pub fn all() -> &'static [DismissField] {
        &[
            DismissField::Reason,
            DismissField::Operator,
            DismissField::Submit,
            DismissField::Cancel,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DismissField::Reason => "Reason",
            DismissField::Operator => "Operator",
            DismissField::Submit => "Confirm Ignore",
            DismissField::Cancel => "Cancel",
        }
    }
}

/// State of the dismiss-confirmation form
#[derive(Debug, Clone)]
pub struct DismissForm {
    /// Defects to dismiss on confirm (single selection or a bulk set)
    pub target_ids: Vec<u32>,
    pub reason: String,
    pub operator_idx: usize,
    pub focused_field: usize,
    pub error: Option<String>,
}

impl DismissForm {
    pub fn new(target_ids: Vec<u32>) -> Self {
        Self {
            target_ids,
            reason: String::new(),
            operator_idx: 0,
            focused_field: 0,
            error: None,
        }
    }

    pub fn current_field(&self) -> DismissField {
        DismissField::all()[self.focused_field]
    }

    pub fn next_field(&mut self) {
        self.focused_field = (self.focused_field + 1) % DismissField::all().len();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self
            .focused_field
            .checked_sub(1)
            .unwrap_or(DismissField::all().len() - 1);
    }

    pub fn operator_id(&self) -> &'static str {
        OPERATORS[self.operator_idx % OPERATORS.len()].0
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.reason.trim().len() <= 3 {
            return Err("Reason must be longer than 3 characters");
        }
        Ok(())
    }
}

/// Transient alert popup (critical defect detected)
#[derive(Debug, Clone)]
pub struct AlertPopup {
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
    pub auto_dismiss: Option<Duration>,
}

impl AlertPopup {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
            auto_dismiss: Some(Duration::from_secs(5)),
        }
    }

    pub fn should_dismiss(&self) -> bool {
        if let Some(duration) = self.auto_dismiss {
            self.shown_at.elapsed() > duration
        } else {
            false
        }
    }
}

/// Log entry for the message area
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: Instant,
    pub message: String,
    pub level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            timestamp: Instant::now(),
            message: message.into(),
            level: LogLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            timestamp: Instant::now(),
            message: message.into(),
            level: LogLevel::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            timestamp: Instant::now(),
            message: message.into(),
            level: LogLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            timestamp: Instant::now(),
            message: message.into(),
            level: LogLevel::Error,
        }
    }
}

/// Rows of the settings view, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsRow {
    Profile,
    DeltaE,
    MinDefectSize,
    HighSeverity,
    WidgetEfficiency,
    WidgetActiveJobs,
    WidgetDefects,
    WidgetCost,
}

impl SettingsRow {
    pub fn all() -> &'static [SettingsRow] {
        &[
            SettingsRow::Profile,
            SettingsRow::DeltaE,
            SettingsRow::MinDefectSize,
            SettingsRow::HighSeverity,
            SettingsRow::WidgetEfficiency,
            SettingsRow::WidgetActiveJobs,
            SettingsRow::WidgetDefects,
            SettingsRow::WidgetCost,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsRow::Profile => "Quality Profile",
            SettingsRow::DeltaE => "Delta-E Tolerance",
            SettingsRow::MinDefectSize => "Min Defect Size",
            SettingsRow::HighSeverity => "High Severity Trigger",
            SettingsRow::WidgetEfficiency => "Show: Production Efficiency",
            SettingsRow::WidgetActiveJobs => "Show: Active Jobs",
            SettingsRow::WidgetDefects => "Show: Total Defects",
            SettingsRow::WidgetCost => "Show: Cost Estimation",
        }
    }
}

/// Main application state
#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub input_mode: InputMode,

    /// The simulation context: defects, distances, spawn state
    pub sim: RollSimulation,
    pub job: JobStatus,
    pub thresholds: ThresholdConfig,
    pub quality_profile: QualityProfile,
    pub widgets: DashboardWidgets,

    /// Fixed scroll geometry
    pub viewport: ViewportMap,
    /// Scroll position of the roll view
    pub roll: RollState,
    /// Roll meter centered in the viewport, refreshed every frame
    pub center_meter: f64,
    /// Visible roll height in virtual pixels, refreshed every frame
    pub viewport_px: f64,

    pub selected_defect: Option<u32>,
    pub bulk_selected: Vec<u32>,
    pub filter: FilterMode,

    pub dismiss_form: Option<DismissForm>,
    pub snapshot_open: bool,
    pub alert: Option<AlertPopup>,

    pub logs: Vec<LogEntry>,
    max_logs: usize,

    pub machine_selected: usize,
    pub training_selected: usize,
    pub settings_selected: usize,

    pub show_help: bool,
    pub frame_count: u64,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let viewport = ViewportMap::new(config.pixels_per_meter, config.start_offset_px)?;
        let seed = config.seed.unwrap_or_else(rand::random);

        let mut job = JobStatus::default();
        if let Some(name) = &config.job_name {
            job.job_name = name.clone();
        }
        job.current_meter = 0.0;

        let mut app = Self {
            should_quit: false,
            view: View::ActiveJob,
            input_mode: InputMode::Normal,
            sim: RollSimulation::new(seed),
            job,
            thresholds: ThresholdConfig::default(),
            quality_profile: QualityProfile::default(),
            widgets: DashboardWidgets::default(),
            viewport,
            roll: RollState::default(),
            center_meter: 0.0,
            viewport_px: 600.0,
            selected_defect: None,
            bulk_selected: Vec::new(),
            filter: FilterMode::All,
            dismiss_form: None,
            snapshot_open: false,
            alert: None,
            logs: Vec::new(),
            max_logs: 100,
            machine_selected: 0,
            training_selected: 0,
            settings_selected: 0,
            show_help: false,
            frame_count: 0,
        };

        app.log(LogEntry::info("Roll monitor initialized"));
        app.log(LogEntry::info(format!("Simulation seed: {seed}")));
        let job_name = app.job.job_name.clone();
        app.log(LogEntry::info(format!("Monitoring job {job_name}")));
        Ok(app)
    }

    /// Add a log entry
    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    // ============================================
    // Per-frame updates
    // ============================================

    /// Update animations and derived read-model values (called every frame)
    pub fn tick(&mut self, _width: u16, height: u16) {
        self.frame_count = self.frame_count.wrapping_add(1);

        let roll_rows = height.saturating_sub(CHROME_ROWS);
        self.viewport_px = roll_rows as f64 * PIXELS_PER_ROW;

        self.roll.tick();
        self.center_meter = self
            .viewport
            .meter_at_center(self.roll.scroll_top_px, self.viewport_px);

        if let Some(ref alert) = self.alert {
            if alert.should_dismiss() {
                self.alert = None;
            }
        }
    }

    /// Handle one clock tick from the worker. Ticks are also gated here so a
    /// message racing a pause keystroke cannot advance a paused job.
    pub fn handle_sim_tick(&mut self) {
        if !self.job.is_advancing() {
            return;
        }

        match self.sim.advance(Local::now().time()) {
            TickOutcome::Reset => {
                self.log(LogEntry::warning(
                    "Travel ceiling reached; simulation epoch reset",
                ));
                // Seed defects survive the reset, spawned ids do not
                if let Some(id) = self.selected_defect {
                    if self.sim.defect(id).is_none() {
                        self.selected_defect = None;
                        self.snapshot_open = false;
                    }
                }
                let sim = &self.sim;
                self.bulk_selected.retain(|id| sim.defect(*id).is_some());
            }
            TickOutcome::Advanced { spawned } => {
                if let Some(id) = spawned {
                    if let Some(defect) = self.sim.defect(id) {
                        let kind = defect.kind;
                        let severity = defect.severity;
                        self.log(LogEntry::info(format!(
                            "Defect #{id} detected: {kind} ({severity})"
                        )));
                        if severity == Severity::Critical {
                            self.alert = Some(AlertPopup::new(
                                "Critical Defect",
                                format!(
                                    "Defect #{id} ({kind}) detected at the print head. \
                                     Review immediately or stop the press."
                                ),
                            ));
                        }
                    }
                }
            }
        }
        self.job.current_meter = self.sim.distance_meters();
    }

    // ============================================
    // Selection & scrolling
    // ============================================

    /// Active defect ids matching the current filter, ordered by meter
    pub fn filtered_active_ids(&self) -> Vec<u32> {
        let mut defects: Vec<&DefectRecord> = self
            .sim
            .active_defects()
            .filter(|d| match self.filter {
                FilterMode::All => true,
                FilterMode::CriticalOnly => d.severity.is_high_or_critical(),
            })
            .collect();
        defects.sort_by(|a, b| {
            a.position_meters
                .partial_cmp(&b.position_meters)
                .unwrap_or(Ordering::Equal)
        });
        defects.iter().map(|d| d.id).collect()
    }

    fn select_next_defect(&mut self) {
        let ids = self.filtered_active_ids();
        if ids.is_empty() {
            self.selected_defect = None;
            return;
        }
        let next = match self.selected_defect.and_then(|id| ids.iter().position(|i| *i == id)) {
            Some(pos) if pos + 1 < ids.len() => ids[pos + 1],
            Some(_) => ids[0],
            None => ids[0],
        };
        self.selected_defect = Some(next);
        self.jump_to_selected();
    }

    fn select_previous_defect(&mut self) {
        let ids = self.filtered_active_ids();
        if ids.is_empty() {
            self.selected_defect = None;
            return;
        }
        let prev = match self.selected_defect.and_then(|id| ids.iter().position(|i| *i == id)) {
            Some(0) => ids[ids.len() - 1],
            Some(pos) => ids[pos - 1],
            None => ids[0],
        };
        self.selected_defect = Some(prev);
        self.jump_to_selected();
    }

    fn max_scroll(&self) -> f64 {
        roll::max_scroll_px(self.sim.total_roll_meters(), self.viewport_px, &self.viewport)
    }

    /// Smooth-scroll the roll so the given meter lands at viewport center
    pub fn jump_to_meter(&mut self, meter: f64) {
        let target = self
            .viewport
            .scroll_target_for_meter(meter, self.viewport_px);
        self.roll.jump_to(target, self.max_scroll());
    }

    fn jump_to_selected(&mut self) {
        if let Some(id) = self.selected_defect {
            if let Some(defect) = self.sim.defect(id) {
                let meter = defect.position_meters;
                self.jump_to_meter(meter);
            }
        }
    }

    /// Select a defect (from the list or the rail) and scroll to it
    pub fn select_defect(&mut self, id: u32) {
        if self.sim.defect(id).is_some() {
            self.selected_defect = Some(id);
            if self.view != View::ActiveJob {
                self.view = View::ActiveJob;
            }
            self.jump_to_selected();
        }
    }

    // ============================================
    // Operator actions
    // ============================================

    fn open_dismiss_form(&mut self) {
        let targets: Vec<u32> = if !self.bulk_selected.is_empty() {
            self.bulk_selected.clone()
        } else if let Some(id) = self.selected_defect {
            vec![id]
        } else {
            self.log(LogEntry::warning("No defect selected to ignore"));
            return;
        };
        self.dismiss_form = Some(DismissForm::new(targets));
        self.input_mode = InputMode::Dismissing;
    }

    fn close_dismiss_form(&mut self) {
        self.dismiss_form = None;
        self.input_mode = InputMode::Normal;
    }

    fn submit_dismiss_form(&mut self) {
        let Some(form) = self.dismiss_form.as_ref() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let validation = form.validate();
        let reason = form.reason.trim().to_string();
        let operator = form.operator_id();
        let targets = form.target_ids.clone();

        if let Err(message) = validation {
            if let Some(form) = self.dismiss_form.as_mut() {
                form.error = Some(message.to_string());
            }
            return;
        }
        for id in &targets {
            self.sim.dismiss(*id, &reason, operator);
        }
        self.log(LogEntry::success(match targets.as_slice() {
            [id] => format!("Defect #{id} ignored by {operator}: {reason}"),
            many => format!("{} defects ignored by {operator}: {reason}", many.len()),
        }));

        self.bulk_selected.retain(|id| !targets.contains(id));
        self.snapshot_open = false;
        self.close_dismiss_form();
    }

    fn report_selected(&mut self) {
        if let Some(id) = self.selected_defect {
            if self.sim.defect(id).is_some() {
                self.sim.report(id);
                self.log(LogEntry::success(format!("Defect #{id} reported to RIP log")));
            }
        }
    }

    fn restore_selected(&mut self) {
        if let Some(id) = self.selected_defect {
            if self.sim.defect(id).map(|d| d.is_dismissed()).unwrap_or(false) {
                self.sim.restore(id);
                self.log(LogEntry::info(format!("Defect #{id} restored to active list")));
            }
        }
    }

    fn toggle_bulk_selected(&mut self) {
        if let Some(id) = self.selected_defect {
            if let Some(pos) = self.bulk_selected.iter().position(|i| *i == id) {
                self.bulk_selected.remove(pos);
            } else {
                self.bulk_selected.push(id);
            }
        }
    }

    fn toggle_select_all(&mut self) {
        let ids = self.filtered_active_ids();
        if self.bulk_selected.len() == ids.len() && !ids.is_empty() {
            self.bulk_selected.clear();
        } else {
            self.bulk_selected = ids;
        }
    }

    fn toggle_pause(&mut self) -> Option<SimCommand> {
        if !self.job.is_printing {
            self.log(LogEntry::warning("Press is stopped; cannot pause"));
            return None;
        }
        self.job.is_paused = !self.job.is_paused;
        self.log(if self.job.is_paused {
            LogEntry::warning("Job paused")
        } else {
            LogEntry::success("Job resumed")
        });
        Some(SimCommand::SetRunning(self.job.is_advancing()))
    }

    fn stop_press(&mut self) -> Option<SimCommand> {
        if !self.job.is_printing {
            return None;
        }
        self.job.is_printing = false;
        self.job.is_paused = false;
        self.log(LogEntry::error("Press stopped by operator"));
        Some(SimCommand::SetRunning(false))
    }

    /// Live waste breakdown per defect kind: (kind, count, cost)
    pub fn waste_by_kind(&self) -> Vec<(DefectKind, usize, f64)> {
        let mut rows: Vec<(DefectKind, usize, f64)> = Vec::new();
        for defect in self.sim.active_defects() {
            let cost = defect.waste_cost.unwrap_or(0.0);
            if let Some(row) = rows.iter_mut().find(|(kind, _, _)| *kind == defect.kind) {
                row.1 += 1;
                row.2 += cost;
            } else {
                rows.push((defect.kind, 1, cost));
            }
        }
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }

    // ============================================
    // Key handling
    // ============================================

    /// Handle key events; returns a command for the clock worker when the
    /// printing state changed or the app is shutting down.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SimCommand> {
        // Alert popup eats the next dismissal key
        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                self.alert = None;
            }
            return None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                self.show_help = false;
            }
            return None;
        }

        if self.snapshot_open {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('v') | KeyCode::Char('q')
            ) {
                self.snapshot_open = false;
            }
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Dismissing => {
                self.handle_dismiss_key(key);
                None
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<SimCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return Some(SimCommand::Shutdown);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Some(SimCommand::Shutdown);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return None;
            }
            KeyCode::Tab => {
                self.view = self.view.next();
                return None;
            }
            KeyCode::BackTab => {
                self.view = self.view.previous();
                return None;
            }
            KeyCode::Char(' ') => {
                return self.toggle_pause();
            }
            KeyCode::Char('s') => {
                return self.stop_press();
            }
            _ => {}
        }

        match self.view {
            View::ActiveJob => self.handle_active_job_key(key),
            View::Dashboard => self.handle_dashboard_key(key),
            View::Training => self.handle_training_key(key),
            View::Settings => self.handle_settings_key(key),
            View::Reports => {}
        }

        None
    }

    fn handle_active_job_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') => self.select_next_defect(),
            KeyCode::Char('k') => self.select_previous_defect(),
            KeyCode::Enter => self.jump_to_selected(),
            KeyCode::Esc => {
                self.selected_defect = None;
            }
            KeyCode::Char('d') => self.open_dismiss_form(),
            KeyCode::Char('r') => self.report_selected(),
            KeyCode::Char('u') => self.restore_selected(),
            KeyCode::Char('v') => {
                self.snapshot_open = self.selected_defect.is_some();
            }
            KeyCode::Char('x') => self.toggle_bulk_selected(),
            KeyCode::Char('a') => self.toggle_select_all(),
            KeyCode::Char('f') => {
                self.filter = self.filter.toggle();
                let name = self.filter.name();
                self.log(LogEntry::info(format!("Defect filter: {name}")));
            }
            KeyCode::Up => {
                let max = self.max_scroll();
                self.roll.scroll_by(-PIXELS_PER_ROW, max);
            }
            KeyCode::Down => {
                let max = self.max_scroll();
                self.roll.scroll_by(PIXELS_PER_ROW, max);
            }
            KeyCode::PageUp => {
                let max = self.max_scroll();
                let page = self.viewport_px;
                self.roll.scroll_by(-page, max);
            }
            KeyCode::PageDown => {
                let max = self.max_scroll();
                let page = self.viewport_px;
                self.roll.scroll_by(page, max);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                let max = self.max_scroll();
                self.roll.jump_to(0.0, max);
            }
            KeyCode::Char('G') | KeyCode::End => {
                let max = self.max_scroll();
                self.roll.jump_to(max, max);
            }
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        let total = AVAILABLE_MACHINES.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.machine_selected = (self.machine_selected + 1) % total;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.machine_selected = self
                    .machine_selected
                    .checked_sub(1)
                    .unwrap_or(total - 1);
            }
            KeyCode::Enter => {
                let machine = AVAILABLE_MACHINES[self.machine_selected];
                self.job.machine_id = machine.id.to_string();
                self.job.machine_name = machine.name.to_string();
                self.view = View::ActiveJob;
                self.log(LogEntry::info(format!("Switched to machine {}", machine.name)));
            }
            _ => {}
        }
    }

    fn handle_training_key(&mut self, key: KeyEvent) {
        let total = TRAINING_MODULES.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.training_selected = (self.training_selected + 1) % total;
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.training_selected = self
                    .training_selected
                    .checked_sub(1)
                    .unwrap_or(total - 1);
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let rows = SettingsRow::all();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.settings_selected = (self.settings_selected + 1) % rows.len();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.settings_selected = self
                    .settings_selected
                    .checked_sub(1)
                    .unwrap_or(rows.len() - 1);
            }
            KeyCode::Char('h') | KeyCode::Left => self.adjust_setting(-1),
            KeyCode::Char('l') | KeyCode::Right => self.adjust_setting(1),
            KeyCode::Enter => self.adjust_setting(1),
            _ => {}
        }
    }

    /// Nudge the focused settings row; widget rows toggle regardless of sign
    fn adjust_setting(&mut self, direction: i32) {
        let row = SettingsRow::all()[self.settings_selected];
        match row {
            SettingsRow::Profile => {
                self.quality_profile = if direction >= 0 {
                    self.quality_profile.next()
                } else {
                    self.quality_profile.previous()
                };
                let label = self.quality_profile.label();
                self.log(LogEntry::info(format!("Quality profile: {label}")));
            }
            SettingsRow::DeltaE => {
                self.thresholds.delta_e =
                    (self.thresholds.delta_e + 0.1 * direction as f64).clamp(0.5, 6.0);
                self.thresholds.delta_e = (self.thresholds.delta_e * 10.0).round() / 10.0;
            }
            SettingsRow::MinDefectSize => {
                self.thresholds.min_defect_size_mm =
                    (self.thresholds.min_defect_size_mm + 0.1 * direction as f64).clamp(0.1, 5.0);
                self.thresholds.min_defect_size_mm =
                    (self.thresholds.min_defect_size_mm * 10.0).round() / 10.0;
            }
            SettingsRow::HighSeverity => {
                let value = self.thresholds.high_severity_percentage as i32 + direction;
                self.thresholds.high_severity_percentage = value.clamp(50, 100) as u8;
            }
            SettingsRow::WidgetEfficiency => self.widgets.efficiency = !self.widgets.efficiency,
            SettingsRow::WidgetActiveJobs => self.widgets.active_jobs = !self.widgets.active_jobs,
            SettingsRow::WidgetDefects => self.widgets.defects = !self.widgets.defects,
            SettingsRow::WidgetCost => self.widgets.cost = !self.widgets.cost,
        }
    }

    fn handle_dismiss_key(&mut self, key: KeyEvent) {
        if self.dismiss_form.is_none() {
            self.input_mode = InputMode::Normal;
            return;
        }

        match key.code {
            KeyCode::Esc => self.close_dismiss_form(),
            KeyCode::Tab => {
                if let Some(form) = &mut self.dismiss_form {
                    form.next_field();
                }
            }
            KeyCode::BackTab => {
                if let Some(form) = &mut self.dismiss_form {
                    form.prev_field();
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = &mut self.dismiss_form {
                    if form.current_field() == DismissField::Reason {
                        form.reason.pop();
                    }
                }
            }
            KeyCode::Up => {
                if let Some(form) = &mut self.dismiss_form {
                    if form.current_field() == DismissField::Operator {
                        form.operator_idx = form
                            .operator_idx
                            .checked_sub(1)
                            .unwrap_or(OPERATORS.len() - 1);
                    }
                }
            }
            KeyCode::Down => {
                if let Some(form) = &mut self.dismiss_form {
                    if form.current_field() == DismissField::Operator {
                        form.operator_idx = (form.operator_idx + 1) % OPERATORS.len();
                    }
                }
            }
            KeyCode::Enter => {
                let field = self.dismiss_form.as_ref().map(|f| f.current_field());
                match field {
                    Some(DismissField::Reason) | Some(DismissField::Operator) => {
                        if let Some(form) = &mut self.dismiss_form {
                            form.next_field();
                        }
                    }
                    Some(DismissField::Submit) => self.submit_dismiss_form(),
                    Some(DismissField::Cancel) => self.close_dismiss_form(),
                    None => {}
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = &mut self.dismiss_form {
                    if form.current_field() == DismissField::Reason {
                        form.reason.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    /// Status bar text for the bottom of the top bar
    pub fn status_text(&self) -> String {
        format!(
            "{} | {} | ?: Help | Space: Pause | s: Stop | q: Quit",
            self.job.state_label(),
            self.view.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::STEP_METERS;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let config = AppConfig {
            seed: Some(7),
            ..AppConfig::default()
        };
        App::new(&config).unwrap()
    }

    #[test]
    fn test_selection_walks_defects_by_meter() {
        let mut app = test_app();
        // Seed defects ordered by meter: 5, 4, 3, 2, 1
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected_defect, Some(5));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected_defect, Some(4));
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected_defect, Some(5));
        // Wraps at the ends
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.selected_defect, Some(1));
    }

    #[test]
    fn test_critical_filter_narrows_selection() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.filter, FilterMode::CriticalOnly);
        // Only defect 3 (High) passes the filter in the seed set
        assert_eq!(app.filtered_active_ids(), vec![3]);
    }

    #[test]
    fn test_jump_centers_selected_defect() {
        let mut app = test_app();
        app.viewport_px = 600.0;
        app.select_defect(3); // 22m

        while app.roll.is_animating() {
            app.roll.tick();
        }
        assert!((app.roll.scroll_top_px - 3128.0).abs() < 1e-6);
        let center = app
            .viewport
            .meter_at_center(app.roll.scroll_top_px, app.viewport_px);
        assert!((center - 22.0).abs() < 1e-6);
    }

    #[test]
    fn test_pause_gates_simulation_ticks() {
        let mut app = test_app();
        let cmd = app.handle_key(key(KeyCode::Char(' ')));
        assert!(matches!(cmd, Some(SimCommand::SetRunning(false))));
        assert!(app.job.is_paused);

        let before = app.sim.distance_meters();
        app.handle_sim_tick();
        assert_eq!(app.sim.distance_meters(), before);

        let cmd = app.handle_key(key(KeyCode::Char(' ')));
        assert!(matches!(cmd, Some(SimCommand::SetRunning(true))));
        app.handle_sim_tick();
        assert!((app.sim.distance_meters() - (before + STEP_METERS)).abs() < 1e-9);
    }

    #[test]
    fn test_stop_halts_job_and_clock() {
        let mut app = test_app();
        let cmd = app.handle_key(key(KeyCode::Char('s')));
        assert!(matches!(cmd, Some(SimCommand::SetRunning(false))));
        assert!(!app.job.is_printing);
        assert_eq!(app.job.state_label(), "STOPPED");

        // Pausing a stopped press is refused
        assert!(app.handle_key(key(KeyCode::Char(' '))).is_none());
    }

    #[test]
    fn test_dismiss_form_flow() {
        let mut app = test_app();
        app.select_defect(3);
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.input_mode, InputMode::Dismissing);

        for c in "False positive".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        // Reason -> Operator -> Submit
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Down)); // OP-002
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input_mode, InputMode::Normal);
        let defect = app.sim.defect(3).unwrap();
        assert!(defect.is_dismissed());
        assert_eq!(defect.dismiss_reason.as_deref(), Some("False positive"));
        assert_eq!(defect.operator_id.as_deref(), Some("OP-002"));
    }

    #[test]
    fn test_dismiss_form_rejects_short_reason() {
        let mut app = test_app();
        app.select_defect(1);
        app.handle_key(key(KeyCode::Char('d')));

        for c in "ok".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter)); // -> Operator
        app.handle_key(key(KeyCode::Enter)); // -> Submit
        app.handle_key(key(KeyCode::Enter)); // submit attempt

        assert_eq!(app.input_mode, InputMode::Dismissing);
        assert!(app.dismiss_form.as_ref().unwrap().error.is_some());
        assert!(app.sim.defect(1).unwrap().is_active());
    }

    #[test]
    fn test_bulk_dismiss() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('a'))); // select all
        assert_eq!(app.bulk_selected.len(), 5);

        app.handle_key(key(KeyCode::Char('d')));
        for c in "Test pattern sheet".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.sim.active_count(), 0);
        assert!(app.bulk_selected.is_empty());
    }

    #[test]
    fn test_restore_after_dismiss() {
        let mut app = test_app();
        app.sim.dismiss(2, "Smudge on lens", "ADMIN");
        app.selected_defect = Some(2);
        app.handle_key(key(KeyCode::Char('u')));
        assert!(app.sim.defect(2).unwrap().is_active());
    }

    #[test]
    fn test_settings_adjustments_clamp() {
        let mut app = test_app();
        app.view = View::Settings;
        app.settings_selected = 1; // Delta-E
        for _ in 0..100 {
            app.handle_key(key(KeyCode::Char('l')));
        }
        assert!((app.thresholds.delta_e - 6.0).abs() < 1e-9);
        for _ in 0..100 {
            app.handle_key(key(KeyCode::Char('h')));
        }
        assert!((app.thresholds.delta_e - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_machine_switch_returns_to_active_job() {
        let mut app = test_app();
        app.view = View::Dashboard;
        app.handle_key(key(KeyCode::Char('j')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.view, View::ActiveJob);
        assert_eq!(app.job.machine_id, "LATEX-02");
    }

    #[test]
    fn test_invalid_viewport_config_rejected() {
        let config = AppConfig {
            pixels_per_meter: 0.0,
            ..AppConfig::default()
        };
        assert!(App::new(&config).is_err());
    }
}
