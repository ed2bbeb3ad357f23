//! CLI output formatting: human table (default) or machine-readable JSON
//! (`--json`). Named and structured after the teacher's `cli_output.rs`.

use crate::pipeline::{timings_as_millis, InferOutput};

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    dependencies: Vec<String>,
    unresolved: &'a [String],
    warnings: &'a [String],
    timings_ms: std::collections::BTreeMap<String, f64>,
}

pub fn render_json(output: &InferOutput) -> String {
    let report = JsonReport {
        dependencies: output.dependencies.iter().map(ToString::to_string).collect(),
        unresolved: &output.unresolved,
        warnings: &output.warnings,
        timings_ms: timings_as_millis(&output.timings),
    };
    serde_json::to_string_pretty(&report).expect("report serializes without error")
}

pub fn print_plain(output: &InferOutput, verbose: bool, show_unresolved: bool) {
    if output.dependencies.is_empty() {
        println!("No third-party dependencies found.");
    } else {
        println!("Dependencies ({}):", output.dependencies.len());
        for dep in &output.dependencies {
            println!("  {dep}");
        }
    }

    if (show_unresolved || verbose) && !output.unresolved.is_empty() {
        println!("\nUnresolved ({}):", output.unresolved.len());
        for name in &output.unresolved {
            println!("  {name}");
        }
    }

    if verbose && !output.warnings.is_empty() {
        println!("\nWarnings ({}):", output.warnings.len());
        for warning in &output.warnings {
            println!("  {warning}");
        }
    }

    if verbose {
        println!("\nTimings:");
        for (stage, millis) in timings_as_millis(&output.timings) {
            println!("  {stage:10} {millis:.1}ms");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dependency, DistributionName};

    fn sample_output() -> InferOutput {
        InferOutput {
            dependencies: vec![Dependency::new(DistributionName::normalize("requests").unwrap())],
            unresolved: vec!["mystery_module".to_string()],
            warnings: vec!["[absent] mystery_module: no spelling variant exists".to_string()],
            timings: [("scan".to_string(), std::time::Duration::from_millis(5))].into_iter().collect(),
        }
    }

    #[test]
    fn test_render_json_contains_dependency() {
        let json = render_json(&sample_output());
        assert!(json.contains("requests"));
        assert!(json.contains("mystery_module"));
    }

    #[test]
    fn test_print_plain_does_not_panic() {
        print_plain(&sample_output(), true, true);
        print_plain(&sample_output(), false, false);
    }
}
