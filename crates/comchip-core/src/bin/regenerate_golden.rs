use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use comchip_core::{FrameInput, Variant, decode_inputs};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() || !path.join("frames.txt").exists() {
            continue;
        }
        regenerate_one(&path)?;
    }

    Ok(())
}

fn regenerate_one(case: &Path) -> Result<(), String> {
    let variant_path = case.join("variant.txt");
    let variant: Variant = fs::read_to_string(&variant_path)
        .map_err(|err| format!("failed to read {}: {}", variant_path.display(), err))?
        .trim()
        .parse()?;
    let frames_path = case.join("frames.txt");
    let frames = fs::read_to_string(&frames_path)
        .map_err(|err| format!("failed to read {}: {}", frames_path.display(), err))?;

    let inputs = FrameInput::from_lines("frames.txt", &frames);
    let report = decode_inputs(inputs, &variant.layout(), variant.name());
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    let output = case.join("expected_report.json");
    fs::write(&output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
