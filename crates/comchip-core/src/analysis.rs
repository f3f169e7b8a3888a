use crate::frame::decode;
use crate::frame::layout::FrameLayout;
use crate::input::{format_hex, parse_hex_frame};
use crate::{DecodeReport, FrameIssue, FrameRecord, make_stub_report};

/// One labelled line of hex text awaiting decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInput {
    pub source: String,
    pub text: String,
}

impl FrameInput {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// Split fixture text into inputs, one frame per line.
    ///
    /// Anything after `#` is a comment; blank lines are skipped. Sources are
    /// labelled `{label}:{line}` with 1-based line numbers.
    pub fn from_lines(label: &str, text: &str) -> Vec<FrameInput> {
        text.lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let content = line.split('#').next().unwrap_or("").trim();
                if content.is_empty() {
                    None
                } else {
                    Some(FrameInput::new(format!("{label}:{}", index + 1), content))
                }
            })
            .collect()
    }
}

/// Decode every input against `layout` and collect the outcomes.
///
/// Inputs are independent: one rejected frame never affects the next.
///
/// # Examples
/// ```
/// use comchip_core::{FrameInput, Variant, decode_inputs};
///
/// let inputs = vec![
///     FrameInput::new("arg:1", "55 81 00 96 FE E8"),
///     FrameInput::new("arg:2", "55 81 00 96 FE 3F"),
/// ];
/// let report = decode_inputs(inputs, &Variant::Compact.layout(), "compact");
/// assert_eq!(report.summary.frames_valid, 1);
/// assert_eq!(report.summary.frames_rejected, 1);
/// ```
pub fn decode_inputs<I>(inputs: I, layout: &FrameLayout, layout_name: &str) -> DecodeReport
where
    I: IntoIterator<Item = FrameInput>,
{
    let mut report = make_stub_report(layout_name, layout.clone());
    for input in inputs {
        let record = decode_input(input, layout);
        report.summary.frames_total += 1;
        if record.is_valid() {
            report.summary.frames_valid += 1;
        } else {
            report.summary.frames_rejected += 1;
        }
        report.frames.push(record);
    }
    report
}

fn decode_input(input: FrameInput, layout: &FrameLayout) -> FrameRecord {
    let bytes = match parse_hex_frame(&input.text) {
        Ok(bytes) => bytes,
        Err(err) => {
            return FrameRecord {
                source: input.source,
                bytes: input.text.trim().to_string(),
                status: None,
                error: Some(FrameIssue::from(err)),
            };
        }
    };

    let (status, error) = match decode(&bytes, layout) {
        Ok(status) => (Some(status), None),
        Err(err) => (None, Some(FrameIssue::from(err))),
    };
    FrameRecord {
        source: input.source,
        bytes: format_hex(&bytes),
        status,
        error,
    }
}
