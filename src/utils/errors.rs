//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

use crate::display::DisplayError;
use crate::names::NameStoreError;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    let display_error = error.chain().find_map(|e| e.downcast_ref::<DisplayError>());
    let names_error = error.chain().find_map(|e| e.downcast_ref::<NameStoreError>());
    let error_msg = error.to_string();

    match (display_error, names_error) {
        (Some(e @ DisplayError::QueryFailure { .. }), _) => format_enumeration_error(&mut output, e),
        (Some(DisplayError::NoOutputsAvailable), _) => format_no_outputs_error(&mut output),
        (
            Some(
                e @ (DisplayError::DeviceNameUnresolved(_)
                | DisplayError::ModeQueryFailure { .. }
                | DisplayError::ApplyFailure { .. }),
            ),
            _,
        ) => format_rotation_error(&mut output, e),
        (Some(e @ (DisplayError::InvalidIdentityKey(_) | DisplayError::InvalidDegrees(_))), _) => {
            format_input_error(&mut output, e)
        }
        (None, Some(e)) => format_names_error(&mut output, e),
        _ if error_msg.contains("fixture") => format_fixture_error(&mut output),
        _ if error_msg.contains("config") => format_config_error(&mut output),
        _ => format_generic_error(&mut output, &error_msg),
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: display-anchor -vv list"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Compare against a fixture: display-anchor --fixture topology.toml list"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_enumeration_error(output: &mut String, error: &DisplayError) {
    writeln!(output, "Display Enumeration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The display configuration could not be queried.").ok();
    writeln!(output, "  {}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Running in a session without a console display").ok();
    writeln!(output, "     → Services and some remote sessions see no outputs").ok();
    writeln!(output, "     → Run from an interactive desktop session").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Graphics driver is being reset or updated").ok();
    writeln!(output, "     → Wait a few seconds and retry").ok();
}

fn format_no_outputs_error(output: &mut String) {
    writeln!(output, "No Display Outputs").ok();
    writeln!(output).ok();
    writeln!(output, "Enumeration succeeded but reported no active output.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Check that at least one monitor is connected and enabled").ok();
    writeln!(output, "  → Run 'display-anchor list' to see the current topology").ok();
}

fn format_rotation_error(output: &mut String, error: &DisplayError) {
    writeln!(output, "Display Rotation Error").ok();
    writeln!(output).ok();
    writeln!(output, "  {}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. The driver does not support this orientation").ok();
    writeln!(output, "     → Try rotating from the system display settings").ok();
    writeln!(output).ok();
    writeln!(output, "  2. The output was detached while rotating").ok();
    writeln!(output, "     → Run 'display-anchor list' and retry with a current key").ok();
}

fn format_input_error(output: &mut String, error: &DisplayError) {
    writeln!(output, "Invalid Argument").ok();
    writeln!(output).ok();
    writeln!(output, "  {}", error).ok();
    writeln!(output).ok();
    writeln!(output, "  → Output keys look like 0000000000012A4F-4").ok();
    writeln!(output, "  → Rotations are multiples of 90 degrees (e.g. 90, -90, 180)").ok();
}

fn format_names_error(output: &mut String, error: &NameStoreError) {
    writeln!(output, "Name Store Error").ok();
    writeln!(output).ok();
    writeln!(output, "  {}", error).ok();
    writeln!(output).ok();
    writeln!(output, "  → The store is a JSON object of key → name pairs").ok();
    writeln!(output, "  → Fix or delete the file, or set [names] store_path").ok();
}

fn format_fixture_error(output: &mut String) {
    writeln!(output, "Fixture Topology Error").ok();
    writeln!(output).ok();
    writeln!(output, "The --fixture file could not be loaded.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Each [[output]] needs adapter_id, output_id, width and height").ok();
    writeln!(output, "  → Orientation values: landscape, portrait, landscape-flipped, portrait-flipped").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Invalid value").ok();
    writeln!(output, "     → logging.format: pretty, compact or json").ok();
    writeln!(output, "     → placement.default_margin: zero or more").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Error").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}
