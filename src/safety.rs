//! Safety checks for output files.
//!
//! The binary can write results and stats to files next to the search pages
//! it reads; these checks stop it from overwriting an input page.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output must have the required extension (e.g., "json", "txt")
/// - Output cannot be the same as any of the input pages
///
/// # Arguments
/// * `output` - The output path that will be created/overwritten
/// * `required_extension` - Extension the output filename must carry
/// * `source_paths` - Input pages that must not match the output
pub fn validate_output_path(
    output: &Path,
    required_extension: &str,
    source_paths: &[&Path],
) -> Result<()> {
    let has_extension = output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(required_extension))
        .unwrap_or(false);
    if !has_extension {
        bail!(
            "Safety check failed: output file '{}' must have a .{} extension",
            output.display(),
            required_extension
        );
    }

    for source in source_paths {
        if same_file(output, source) {
            bail!(
                "Safety check failed: output '{}' cannot be the same as input '{}'",
                output.display(),
                source.display()
            );
        }
    }

    Ok(())
}

/// Validates several outputs at once: each must pass
/// [`validate_output_path`], and no two may be the same file.
///
/// # Arguments
/// * `outputs` - Output paths paired with their required extension
/// * `source_paths` - Input pages that must not match any output
pub fn validate_output_paths(outputs: &[(&Path, &str)], source_paths: &[&Path]) -> Result<()> {
    for (i, (output, extension)) in outputs.iter().enumerate() {
        validate_output_path(output, extension, source_paths)?;

        for (other, _) in &outputs[i + 1..] {
            if same_file(output, other) {
                bail!(
                    "Safety check failed: outputs '{}' and '{}' are the same file",
                    output.display(),
                    other.display()
                );
            }
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    a == b
        || matches!(
            (a.canonicalize(), b.canonicalize()),
            (Ok(a), Ok(b)) if a == b
        )
}
