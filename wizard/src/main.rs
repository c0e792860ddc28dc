use std::path::PathBuf;

/// Value of `--name=value`, if the flag is present with a non-empty value.
fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    args.iter()
        .find_map(|a| a.strip_prefix(prefix.as_str()))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: lead-wizard [--industry=<trade name>] [--config=<path>] [--tui-smoke[=<step>]]");
        println!("  --industry    Prefill the industry from a trade name, e.g. \"Roofers\"");
        println!("  --config      TOML config file (LEAD_WIZARD_* env vars override it)");
        println!("  --tui-smoke   Render one frame of identity|contact|details|uploads|success and exit");
        return;
    }

    let config_path = flag_value(&args, "--config").map(PathBuf::from);

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific step and exits 0.
    if args
        .iter()
        .any(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        lead_wizard::run_tui_smoke(config_path, flag_value(&args, "--tui-smoke"));
        return;
    }

    lead_wizard::run_tui(config_path, flag_value(&args, "--industry"));
}
