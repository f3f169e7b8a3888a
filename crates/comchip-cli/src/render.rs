//! Human-readable rendering of decode reports.

use std::fmt::{self, Write as _};

use comchip_core::{DecodeReport, DecodedStatus, FrameRecord};

const MILLIVOLTS_PER_VOLT: u16 = 1000;

pub fn render_report(report: &DecodeReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for record in &report.frames {
        render_record(&mut out, record)?;
    }
    let summary = &report.summary;
    writeln!(
        out,
        "{} frames: {} valid, {} rejected (layout: {})",
        summary.frames_total, summary.frames_valid, summary.frames_rejected, report.layout_name
    )?;
    Ok(out)
}

fn render_record(out: &mut String, record: &FrameRecord) -> fmt::Result {
    writeln!(out, "{}  {}", record.source, record.bytes)?;
    match (&record.status, &record.error) {
        (Some(status), _) => render_status(out, status),
        (None, Some(issue)) => writeln!(out, "  rejected: {}", issue.message),
        (None, None) => writeln!(out, "  rejected"),
    }
}

fn render_status(out: &mut String, status: &DecodedStatus) -> fmt::Result {
    writeln!(out, "  checksum valid (command id 0x{:02X})", status.command_id)?;
    if let Some(allowed) = status.discharge_allowed {
        let line = if allowed {
            "battery can be discharged"
        } else {
            "battery cannot be discharged"
        };
        writeln!(out, "  {}", line)?;
    }
    writeln!(
        out,
        "  {}",
        if status.supported {
            "battery is supported"
        } else {
            "battery NOT supported"
        }
    )?;
    writeln!(
        out,
        "  {}",
        if status.voltage_ok() {
            "battery voltage is OK"
        } else {
            "battery under voltage"
        }
    )?;
    writeln!(
        out,
        "  {}",
        if status.has_error {
            "battery has error"
        } else {
            "battery has NO error"
        }
    )?;
    if let Some(secondary) = status.secondary_status {
        writeln!(out, "  secondary status: 0x{:02X}", secondary)?;
    }

    // Voltage is only shown for a supported battery without error.
    if status.supported && !status.has_error {
        writeln!(
            out,
            "  voltage: {} mV ({} V)",
            status.voltage,
            status.voltage / MILLIVOLTS_PER_VOLT
        )
    } else {
        writeln!(out, "  voltage: not shown (battery not supported or has error)")
    }
}

#[cfg(test)]
mod tests {
    use comchip_core::{FrameInput, FrameRecord, Variant, decode_inputs, make_stub_report};

    use super::render_report;

    #[test]
    fn renders_status_and_rejections() {
        let inputs = vec![
            FrameInput::new("arg:1", "55 81 00 96 FE E8"),
            FrameInput::new("arg:2", "55 81 00 96 FE 3F"),
        ];
        let report = decode_inputs(inputs, &Variant::Compact.layout(), "compact");
        let text = render_report(&report).unwrap();

        assert!(text.contains("arg:1  55 81 00 96 FE E8"));
        assert!(text.contains("battery can be discharged"));
        assert!(text.contains("voltage: 38654 mV (38 V)"));
        assert!(text.contains("rejected: checksum mismatch: calculated 0xE8, received 0x3F"));
        assert!(text.contains("2 frames: 1 valid, 1 rejected (layout: compact)"));
    }

    #[test]
    fn hides_voltage_for_faulted_battery() {
        let inputs = vec![FrameInput::new("arg:1", "55 81 E1 96 FE 07")];
        let report = decode_inputs(inputs, &Variant::Compact.layout(), "compact");
        let text = render_report(&report).unwrap();

        assert!(text.contains("battery NOT supported"));
        assert!(text.contains("battery under voltage"));
        assert!(text.contains("battery has error"));
        assert!(text.contains("voltage: not shown"));
        assert!(!text.contains("mV"));
    }

    #[test]
    fn renders_every_record_shape() {
        let inputs = vec![FrameInput::new("arg:1", "55 81 00 96 FE 00 E8")];
        let mut report = decode_inputs(inputs, &Variant::Extended.layout(), "extended");
        report.frames.push(FrameRecord {
            source: "arg:2".to_string(),
            bytes: "55".to_string(),
            status: None,
            error: None,
        });
        let text = render_report(&report).unwrap();

        assert!(text.contains("checksum valid (command id 0x81)"));
        assert!(text.contains("secondary status: 0x00"));
        assert!(text.contains("arg:2  55\n  rejected\n"));
        assert!(text.ends_with("(layout: extended)\n"));

        let empty = make_stub_report("compact", Variant::Compact.layout());
        assert_eq!(
            render_report(&empty).unwrap(),
            "0 frames: 0 valid, 0 rejected (layout: compact)\n"
        );
    }
}
