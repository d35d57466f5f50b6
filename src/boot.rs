use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::{AppConfig, STATIC_DIR, TEMPLATE_DIR};

/// Required directories that will be created if missing
const REQUIRED_DIRS: &[&str] = &[
    "website",
    "website/static",
    "website/static/css",
    "website/templates",
    "website/templates/admin",
    "website/templates/public",
];

/// Templates the server cannot run without
const CRITICAL_TEMPLATES: &[&str] = &[
    "base.html.tera",
    "public/index.html.tera",
    "public/contact.html.tera",
    "admin/login.html.tera",
    "admin/dashboard.html.tera",
];

/// Stylesheets; pages still render without them
const CRITICAL_STATIC: &[&str] = &["css/site.css", "css/admin.css"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BootReport {
    pub warnings: u32,
    pub errors: u32,
}

/// Run all boot checks. Call this before Rocket launches.
/// Aborts the process if anything critical is missing.
pub fn run(config: &AppConfig) {
    info!("Boot check starting...");

    let report = check(config, Path::new("."));

    if report.errors > 0 {
        error!(
            "Boot check FAILED: {} error(s), {} warning(s). Aborting.",
            report.errors, report.warnings
        );
        process::exit(1);
    }

    if report.warnings > 0 {
        warn!(
            "Boot check passed with {} warning(s). Some features may not work correctly.",
            report.warnings
        );
    } else {
        info!("Boot check passed. All systems go.");
    }
}

/// Creates missing directories under `root` and counts what is wrong.
/// The database and upload paths from `config` are used as given.
pub fn check(config: &AppConfig, root: &Path) -> BootReport {
    let mut report = BootReport::default();

    // ── 1. Directories ─────────────────────────────────
    let db_dir = config
        .database_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);

    let mut dirs: Vec<_> = REQUIRED_DIRS.iter().map(|d| root.join(d)).collect();
    dirs.push(config.upload_dir.clone());
    dirs.extend(db_dir.clone());

    for path in &dirs {
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", path.display()),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", path.display(), e);
                    report.errors += 1;
                }
            }
        }
    }

    // ── 2. Critical templates ──────────────────────────
    for file in CRITICAL_TEMPLATES {
        let path = root.join(TEMPLATE_DIR).join(file);
        if !path.exists() {
            error!("  MISSING critical template: {}", path.display());
            report.errors += 1;
        }
    }

    // ── 3. Static assets ───────────────────────────────
    for file in CRITICAL_STATIC {
        let path = root.join(STATIC_DIR).join(file);
        if !path.exists() {
            warn!("  Missing static asset: {} (pages will be unstyled)", path.display());
            report.warnings += 1;
        }
    }

    // ── 4. Database directory writable ─────────────────
    if let Some(dir) = db_dir.filter(|d| d.exists()) {
        if let Err(e) = probe_write(&dir) {
            error!("  Database directory not writable: {}", e);
            report.errors += 1;
        }
    }

    // ── 5. Uploads directory writable ──────────────────
    if config.upload_dir.exists() {
        if let Err(e) = probe_write(&config.upload_dir) {
            warn!("  Uploads directory not writable: {} (image uploads will fail)", e);
            report.warnings += 1;
        }
    }

    // ── 6. Rocket.toml exists ──────────────────────────
    if !root.join("Rocket.toml").exists() {
        warn!("  Rocket.toml not found, using default config");
        report.warnings += 1;
    }

    report
}

fn probe_write(dir: &Path) -> std::io::Result<()> {
    let test_file = dir.join(".write_test");
    fs::write(&test_file, "test")?;
    let _ = fs::remove_file(&test_file);
    Ok(())
}
