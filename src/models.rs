//! Domain models for the roll monitoring console.
//!
//! Defect records, job status and settings mirror what a real inspection
//! backend would deliver; in this demo they are synthesized client-side by
//! the simulation loop.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Defect severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    /// Whether this severity passes the "Critical only" list filter
    pub fn is_high_or_critical(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Closed set of defect categories the inspection pipeline can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefectKind {
    Banding,
    NozzleDropout,
    HeadStrike,
    MediaCrease,
    SubstrateContamination,
    InkAdhesion,
    Registration,
    GradientStepping,
    Smears,
    Grain,
    InkDrop,
    Scratch,
    Misregistration,
}

impl DefectKind {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            DefectKind::Banding => "Banding",
            DefectKind::NozzleDropout => "Nozzle drop-out",
            DefectKind::HeadStrike => "Head strikes/scratches",
            DefectKind::MediaCrease => "Media wrinkles/creases",
            DefectKind::SubstrateContamination => "Substrate contamination",
            DefectKind::InkAdhesion => "Ink adhesion issues",
            DefectKind::Registration => "Registration errors",
            DefectKind::GradientStepping => "Gradient stepping",
            DefectKind::Smears => "Ink Smears",
            DefectKind::Grain => "Grain/Noise",
            DefectKind::InkDrop => "Ink Drop",
            DefectKind::Scratch => "Scratch",
            DefectKind::Misregistration => "Misregistration",
        }
    }

    /// Short marker glyph for the roll overlay
    pub fn glyph(&self) -> char {
        match self {
            DefectKind::Banding => '≡',
            DefectKind::NozzleDropout => '¦',
            DefectKind::HeadStrike | DefectKind::Scratch => '/',
            DefectKind::MediaCrease => '≈',
            DefectKind::SubstrateContamination => '¤',
            DefectKind::InkAdhesion => '□',
            DefectKind::Registration | DefectKind::Misregistration => '±',
            DefectKind::GradientStepping => '▤',
            DefectKind::Smears => '~',
            DefectKind::Grain => '∴',
            DefectKind::InkDrop => '•',
        }
    }

    /// Probable root causes, shown in the detail panel and training view
    pub fn probable_causes(&self) -> &'static [&'static str] {
        match self {
            DefectKind::Banding => &[
                "Clogged printhead nozzles",
                "Media feed calibration off",
                "Low vacuum pressure",
            ],
            DefectKind::NozzleDropout => &[
                "Dried ink in nozzle plate",
                "Air ingestion in ink line",
            ],
            DefectKind::HeadStrike | DefectKind::Scratch => &[
                "Media curling at edges",
                "Printhead height too low",
                "Debris on media surface",
            ],
            DefectKind::MediaCrease => &[
                "Media not secured on vacuum zone",
                "Tension mismatch between spindles",
            ],
            DefectKind::SubstrateContamination => &[
                "Dust on unwinder",
                "Fingerprints during loading",
            ],
            DefectKind::InkAdhesion => &[
                "Curing temperature too low",
                "Incompatible media coating",
            ],
            DefectKind::Registration | DefectKind::Misregistration => &[
                "Media advance drift",
                "Carriage encoder misread",
            ],
            DefectKind::GradientStepping => &[
                "Insufficient pass count",
                "Color profile mismatch",
            ],
            DefectKind::Smears => &[
                "Media curling at edges",
                "Printhead height too low",
                "Media not secured on vacuum zone",
            ],
            DefectKind::Grain => &[
                "Pass count too low",
                "Curing temperature too high",
                "Expired ink",
            ],
            DefectKind::InkDrop => &[
                "Ink condensation on carriage",
                "Head plate overdue for cleaning",
            ],
        }
    }

    /// Recommended corrective actions
    pub fn corrective_actions(&self) -> &'static [&'static str] {
        match self {
            DefectKind::Banding => &[
                "Perform a hard clean on printheads 1 & 2",
                "Recalibrate media advance",
            ],
            DefectKind::NozzleDropout => &[
                "Run nozzle check pattern",
                "Purge and recirculate ink",
            ],
            DefectKind::HeadStrike | DefectKind::Scratch => &[
                "Cancel job immediately",
                "Clean printhead plate manually",
                "Raise carriage height",
            ],
            DefectKind::MediaCrease => &[
                "Reload media straight",
                "Increase vacuum strength",
            ],
            DefectKind::SubstrateContamination => &[
                "Wipe substrate before rewind",
                "Inspect unwinder rollers",
            ],
            DefectKind::InkAdhesion => &[
                "Raise curing temperature by 5°C",
                "Verify media preset",
            ],
            DefectKind::Registration | DefectKind::Misregistration => &[
                "Recalibrate bidirectional alignment",
                "Check encoder strip for ink mist",
            ],
            DefectKind::GradientStepping => &[
                "Increase pass count to 8 or higher",
                "Re-rip with 16-bit gradients",
            ],
            DefectKind::Smears => &[
                "Cancel job immediately",
                "Clean printhead plate manually",
                "Raise carriage height",
            ],
            DefectKind::Grain => &[
                "Increase pass count to 8 or higher",
                "Lower curing temperature by 5°C",
            ],
            DefectKind::InkDrop => &[
                "Clean capping station",
                "Replace wiper blade",
            ],
        }
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lifecycle status of a defect record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DefectStatus {
    #[default]
    Active,
    Dismissed,
    Reported,
}

impl DefectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DefectStatus::Active => "Active",
            DefectStatus::Dismissed => "Dismissed",
            DefectStatus::Reported => "Reported",
        }
    }
}

/// Where the defect was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DefectOrigin {
    #[default]
    Machine,
    File,
}

impl DefectOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            DefectOrigin::Machine => "Machine",
            DefectOrigin::File => "File",
        }
    }
}

/// A detected (synthetic) defect on the roll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectRecord {
    pub id: u32,
    pub kind: DefectKind,
    pub severity: Severity,
    /// Wall-clock detection time, HH:MM
    pub detected_at: String,
    /// Distance from the print head in meters; advances with the roll
    pub position_meters: f64,
    /// Fixed lateral position across roll width, 0-100 percent
    pub lateral_percent: f64,
    pub status: DefectStatus,
    pub origin: DefectOrigin,
    /// Measured color deviation, when the RIP reported one
    pub delta_e: Option<f64>,
    /// Estimated waste cost in euros
    pub waste_cost: Option<f64>,
    /// Estimated wasted length in meters
    pub waste_meters: Option<f64>,
    pub dismiss_reason: Option<String>,
    pub operator_id: Option<String>,
}

impl DefectRecord {
    pub fn is_active(&self) -> bool {
        self.status == DefectStatus::Active
    }

    pub fn is_dismissed(&self) -> bool {
        self.status == DefectStatus::Dismissed
    }

    /// Placeholder image index used by the snapshot modal and nest layout
    pub fn image_index(&self) -> i64 {
        1000 + self.id as i64
    }
}

// ============================================
// Job status & machines
// ============================================

/// Live state of the print job shown in the top bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub is_printing: bool,
    pub is_paused: bool,
    pub job_name: String,
    pub job_id: String,
    pub machine_id: String,
    pub machine_name: String,
    pub total_length_meters: f64,
    pub current_meter: f64,
    /// Print speed in m/min
    pub print_speed: f64,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            is_printing: true,
            is_paused: false,
            job_name: "Campaign_Summer_2025_XL_Banner".to_string(),
            job_id: "JOB-7741".to_string(),
            machine_id: "LATEX-01".to_string(),
            machine_name: "HP Latex R2000 Plus".to_string(),
            total_length_meters: 150.0,
            current_meter: 42.5,
            print_speed: 18.0,
        }
    }
}

impl JobStatus {
    /// Whether the simulation clock should be advancing
    pub fn is_advancing(&self) -> bool {
        self.is_printing && !self.is_paused
    }

    pub fn state_label(&self) -> &'static str {
        if !self.is_printing {
            "STOPPED"
        } else if self.is_paused {
            "PAUSED"
        } else {
            "PRINTING"
        }
    }
}

/// Machine status on the production floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    Idle,
    Running,
    Paused,
    Error,
}

impl MachineStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MachineStatus::Idle => "idle",
            MachineStatus::Running => "running",
            MachineStatus::Paused => "paused",
            MachineStatus::Error => "error",
        }
    }
}

/// A press on the production floor
#[derive(Debug, Clone, Copy)]
pub struct Machine {
    pub id: &'static str,
    pub name: &'static str,
    pub status: MachineStatus,
}

/// Machines offered in the dashboard grid and the top-bar selector
pub const AVAILABLE_MACHINES: &[Machine] = &[
    Machine { id: "LATEX-01", name: "HP Latex R2000 Plus", status: MachineStatus::Running },
    Machine { id: "LATEX-02", name: "HP Latex 3600", status: MachineStatus::Idle },
    Machine { id: "STITCH-01", name: "HP Stitch S1000", status: MachineStatus::Paused },
    Machine { id: "INDIGO-01", name: "HP Indigo 15K", status: MachineStatus::Error },
];

// ============================================
// Settings
// ============================================

/// Print quality profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityProfile {
    #[default]
    HighQuality1200,
    Standard600,
    Draft300,
    EcoMode,
}

impl QualityProfile {
    pub fn label(&self) -> &'static str {
        match self {
            QualityProfile::HighQuality1200 => "High Quality (1200dpi)",
            QualityProfile::Standard600 => "Standard (600dpi)",
            QualityProfile::Draft300 => "Draft (300dpi)",
            QualityProfile::EcoMode => "Eco Mode",
        }
    }

    /// Cycle to the next profile
    pub fn next(&self) -> Self {
        match self {
            QualityProfile::HighQuality1200 => QualityProfile::Standard600,
            QualityProfile::Standard600 => QualityProfile::Draft300,
            QualityProfile::Draft300 => QualityProfile::EcoMode,
            QualityProfile::EcoMode => QualityProfile::HighQuality1200,
        }
    }

    /// Cycle to the previous profile
    pub fn previous(&self) -> Self {
        match self {
            QualityProfile::HighQuality1200 => QualityProfile::EcoMode,
            QualityProfile::Standard600 => QualityProfile::HighQuality1200,
            QualityProfile::Draft300 => QualityProfile::Standard600,
            QualityProfile::EcoMode => QualityProfile::Draft300,
        }
    }
}

impl std::fmt::Display for QualityProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Detection thresholds, adjustable in the settings view
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Delta-E tolerance before a color deviation is flagged
    pub delta_e: f64,
    /// Minimum defect size in millimeters
    pub min_defect_size_mm: f64,
    /// Match confidence (percent) required to auto-classify as high severity
    pub high_severity_percentage: u8,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            delta_e: 2.0,
            min_defect_size_mm: 1.0,
            high_severity_percentage: 85,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.5..=6.0).contains(&self.delta_e) {
            return Err("Delta-E tolerance must be between 0.5 and 6.0");
        }
        if !(0.1..=5.0).contains(&self.min_defect_size_mm) {
            return Err("Minimum defect size must be between 0.1 and 5.0 mm");
        }
        if !(50..=100).contains(&self.high_severity_percentage) {
            return Err("High severity trigger must be between 50 and 100 percent");
        }
        Ok(())
    }
}

/// Which KPI cards the dashboard shows
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DashboardWidgets {
    pub efficiency: bool,
    pub active_jobs: bool,
    pub defects: bool,
    pub cost: bool,
}

impl Default for DashboardWidgets {
    fn default() -> Self {
        Self {
            efficiency: true,
            active_jobs: true,
            defects: true,
            cost: true,
        }
    }
}

// ============================================
// Training content
// ============================================

/// One module of the operator training view
#[derive(Debug, Clone, Copy)]
pub struct TrainingModule {
    pub title: &'static str,
    pub kind: DefectKind,
    pub description: &'static str,
    pub prevention: &'static str,
    pub fix: &'static str,
    pub image_index: i64,
}

pub const TRAINING_MODULES: &[TrainingModule] = &[
    TrainingModule {
        title: "Banding Issues",
        kind: DefectKind::Banding,
        description: "Horizontal or vertical lines appearing across the print, often caused by nozzle clogs or feed issues.",
        prevention: "Run daily nozzle checks and ensure media is loaded straight.",
        fix: "Perform a hard clean on printheads 1 & 2. Recalibrate media advance.",
        image_index: 1050,
    },
    TrainingModule {
        title: "Ink Smears / Head Crash",
        kind: DefectKind::Smears,
        description: "Patches of wet ink or drag marks caused by the printhead physically touching the media.",
        prevention: "Use edge holders for rigid media. Increase vacuum strength.",
        fix: "Cancel job immediately. Clean printhead plate manually. Raise carriage height.",
        image_index: 1051,
    },
    TrainingModule {
        title: "Graininess / Noise",
        kind: DefectKind::Grain,
        description: "Print appears speckled or grainy, lacking smoothness in solid colors.",
        prevention: "Select \"High Quality\" profile for photographic prints.",
        fix: "Increase pass count to 8 or higher. Lower curing temperature by 5°C.",
        image_index: 1052,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Critical.label(), "Critical");
        assert!(Severity::Critical.is_high_or_critical());
        assert!(Severity::High.is_high_or_critical());
        assert!(!Severity::Medium.is_high_or_critical());
        assert!(!Severity::Low.is_high_or_critical());
    }

    #[test]
    fn test_kind_guidance_non_empty() {
        let kinds = [
            DefectKind::Banding,
            DefectKind::NozzleDropout,
            DefectKind::HeadStrike,
            DefectKind::MediaCrease,
            DefectKind::SubstrateContamination,
            DefectKind::InkAdhesion,
            DefectKind::Registration,
            DefectKind::GradientStepping,
            DefectKind::Smears,
            DefectKind::Grain,
            DefectKind::InkDrop,
            DefectKind::Scratch,
            DefectKind::Misregistration,
        ];
        for kind in kinds {
            assert!(!kind.probable_causes().is_empty(), "{} has no causes", kind);
            assert!(!kind.corrective_actions().is_empty(), "{} has no actions", kind);
        }
    }

    #[test]
    fn test_quality_profile_cycle() {
        let mut profile = QualityProfile::HighQuality1200;
        for _ in 0..4 {
            profile = profile.next();
        }
        assert_eq!(profile, QualityProfile::HighQuality1200);
        assert_eq!(profile.next().previous(), profile);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(ThresholdConfig::default().validate().is_ok());

        let mut bad = ThresholdConfig::default();
        bad.delta_e = 9.5;
        assert!(bad.validate().is_err());

        bad = ThresholdConfig::default();
        bad.high_severity_percentage = 30;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_job_status_gating() {
        let mut job = JobStatus::default();
        assert!(job.is_advancing());
        assert_eq!(job.state_label(), "PRINTING");

        job.is_paused = true;
        assert!(!job.is_advancing());
        assert_eq!(job.state_label(), "PAUSED");

        job.is_printing = false;
        job.is_paused = false;
        assert!(!job.is_advancing());
        assert_eq!(job.state_label(), "STOPPED");
    }

    #[test]
    fn test_defect_image_index() {
        let defect = DefectRecord {
            id: 7,
            kind: DefectKind::Banding,
            severity: Severity::Medium,
            detected_at: "10:32".to_string(),
            position_meters: 12.0,
            lateral_percent: 40.0,
            status: DefectStatus::Active,
            origin: DefectOrigin::Machine,
            delta_e: None,
            waste_cost: None,
            waste_meters: None,
            dismiss_reason: None,
            operator_id: None,
        };
        assert_eq!(defect.image_index(), 1007);
        assert!(defect.is_active());
    }
}
