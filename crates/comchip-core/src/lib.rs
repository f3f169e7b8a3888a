//! COMChip core library: battery-status frame validation and decoding.
//!
//! This crate implements the protocol side of the `comchip` CLI: a checksum
//! engine, a frame parser (layout/reader/parser) and a batch layer that turns
//! labelled hex inputs into a deterministic decode report. Everything here is
//! byte-oriented and side-effect free; transports and presentation (volt
//! conversion, flag wording) belong to callers.
//!
//! Invariants:
//! - A `DecodedStatus` only exists for frames that passed every check.
//! - Checks run in a fixed order: length, sync, command id, checksum.
//! - Report records keep the order of their inputs.
//!
//! Version française (résumé):
//! Cette crate valide et décode les trames d'état batterie COMChip : somme de
//! contrôle, parseur (layout/reader/parser) et rapport déterministe. Aucune
//! E/S ; la présentation (volts, libellés) reste chez l'appelant.
//!
//! # Examples
//! ```
//! use comchip_core::{Variant, decode, parse_hex_frame};
//!
//! let frame = parse_hex_frame("55 81 40 96 FE 00 A8")?;
//! let status = decode(&frame, &Variant::Extended.layout())?;
//! assert!(status.under_voltage);
//! assert_eq!(status.voltage, 38654);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod checksum;
mod frame;
mod input;

pub use analysis::{FrameInput, decode_inputs};
pub use checksum::{compute_checksum, verify_checksum};
pub use frame::decode;
pub use frame::error::{FrameError, LayoutError};
pub use frame::layout::{FrameLayout, STATUS_RESPONSE_CID, SYNC_SENTINEL, StatusBits, Variant};
pub use frame::parser::DecodedStatus;
pub use input::{HexError, format_hex, parse_hex_frame};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the caller does not stamp the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Outcome of decoding a batch of frames, in input order.
///
/// # Examples
/// ```
/// use comchip_core::{Variant, make_stub_report};
///
/// let report = make_stub_report(Variant::Compact.name(), Variant::Compact.layout());
/// assert_eq!(report.report_version, comchip_core::REPORT_VERSION);
/// assert!(report.frames.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    /// Preset name, or `custom` for a user layout.
    pub layout_name: String,
    /// Layout every frame was checked against.
    pub layout: FrameLayout,
    pub summary: ReportSummary,
    pub frames: Vec<FrameRecord>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Frame counts for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub frames_total: u64,
    pub frames_valid: u64,
    pub frames_rejected: u64,
}

/// One input frame and what became of it.
///
/// Exactly one of `status` and `error` is set.
///
/// # Examples
/// ```
/// use comchip_core::{FrameIssue, FrameRecord};
///
/// let record = FrameRecord {
///     source: "arg:1".to_string(),
///     bytes: "55 81".to_string(),
///     status: None,
///     error: Some(FrameIssue {
///         kind: "length_mismatch".to_string(),
///         message: "invalid frame length: expected 7 bytes, got 2".to_string(),
///     }),
/// };
/// assert!(!record.is_valid());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Where the frame came from (`arg:N` or `path:line`).
    pub source: String,
    /// Parsed bytes as uppercase hex, or the raw text when it was not hex.
    pub bytes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DecodedStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FrameIssue>,
}

impl FrameRecord {
    pub fn is_valid(&self) -> bool {
        self.status.is_some()
    }
}

/// Rejection reason recorded in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameIssue {
    /// Stable identifier (e.g. `checksum_mismatch`, `invalid_hex`).
    pub kind: String,
    /// Human-readable message including the diagnostic values.
    pub message: String,
}

impl From<FrameError> for FrameIssue {
    fn from(err: FrameError) -> Self {
        FrameIssue {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<HexError> for FrameIssue {
    fn from(err: HexError) -> Self {
        FrameIssue {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Build an empty report for `layout`.
pub fn make_stub_report(layout_name: &str, layout: FrameLayout) -> DecodeReport {
    DecodeReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "comchip".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        layout_name: layout_name.to_string(),
        layout,
        summary: ReportSummary::default(),
        frames: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_omits_missing_outcome_fields() {
        let record = FrameRecord {
            source: "arg:1".to_string(),
            bytes: "55 81 00 96 FE E8".to_string(),
            status: Some(DecodedStatus {
                command_id: 0x81,
                voltage: 38654,
                has_error: false,
                under_voltage: false,
                supported: true,
                discharge_allowed: None,
                secondary_status: None,
            }),
            error: None,
        };

        let value = serde_json::to_value(&record).expect("record json");
        assert!(value.get("error").is_none());
        let status = value.get("status").expect("status");
        assert_eq!(status["voltage"], 38654);
        assert!(status.get("discharge_allowed").is_none());
        assert!(status.get("secondary_status").is_none());
    }

    #[test]
    fn issue_from_frame_error_uses_stable_kind() {
        let issue = FrameIssue::from(FrameError::ChecksumMismatch {
            calculated: 0xE8,
            received: 0x3F,
        });
        assert_eq!(issue.kind, "checksum_mismatch");
        assert_eq!(
            issue.message,
            "checksum mismatch: calculated 0xE8, received 0x3F"
        );
    }

    #[test]
    fn stub_report_carries_layout() {
        let report = make_stub_report("compact", Variant::Compact.layout());
        let value = serde_json::to_value(&report).expect("report json");
        assert_eq!(value["layout_name"], "compact");
        assert_eq!(value["layout"]["frame_len"], 6);
        assert_eq!(value["summary"]["frames_total"], 0);
    }

    #[test]
    fn layout_constants_are_reexported_at_root() {
        assert_eq!(crate::SYNC_SENTINEL, 0x55);
        assert_eq!(crate::STATUS_RESPONSE_CID, 0x81);
        let bits: crate::StatusBits = Variant::Compact.layout().status;
        assert_eq!(bits.error, 0x80);
    }
}
