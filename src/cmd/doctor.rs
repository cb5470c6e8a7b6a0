//! `forgesync doctor` — check system requirements and configuration.

use std::process::Command;

use anyhow::Result;
use serde::Serialize;

use crate::config::FileConfig;
use crate::format::OutputFormat;

#[derive(Serialize)]
struct DoctorEnvelope {
    checks: Vec<DoctorCheck>,
    all_ok: bool,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<String>,
}

fn print_check(check: &DoctorCheck) {
    let prefix = match check.status.as_str() {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "fail" => "[FAIL]",
        _ => "[???]",
    };
    println!("{} {}", prefix, check.message);
    if let Some(fix) = &check.fix {
        println!("       {fix}");
    }
}

/// Check system requirements and configuration
pub fn run(format: Option<OutputFormat>) -> Result<()> {
    let format = OutputFormat::resolve(format);
    let mut checks = Vec::new();

    // git is required for everything.
    checks.push(check_tool(
        "git",
        true,
        "https://git-scm.com/downloads",
    ));

    // The tag utility is optional — tagging degrades to log warnings.
    checks.push(check_tool(
        "tag",
        false,
        "https://github.com/jdberry/tag (mirrored directories stay untagged without it)",
    ));

    checks.push(check_token());
    checks.push(check_base_dir());

    let all_ok = checks.iter().all(|c| c.status == "ok");

    match format {
        OutputFormat::Json => {
            let envelope = DoctorEnvelope { checks, all_ok };
            println!("{}", format.serialize(&envelope)?);
        }
        OutputFormat::Text | OutputFormat::Pretty => {
            println!("forgesync doctor");
            println!("================");
            println!();

            for check in &checks {
                print_check(check);
            }

            println!();
            if all_ok {
                println!("All checks passed!");
            } else {
                println!("Some checks failed. See above for details.");
            }
        }
    }

    Ok(())
}

fn check_tool(name: &str, required: bool, install_url: &str) -> DoctorCheck {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            let version = version.lines().next().unwrap_or("unknown").trim().to_owned();
            DoctorCheck {
                name: name.to_owned(),
                status: "ok".to_owned(),
                message: format!("{name}: {version}"),
                fix: None,
            }
        }
        Ok(_) => DoctorCheck {
            name: name.to_owned(),
            status: if required { "fail" } else { "warn" }.to_owned(),
            message: format!("{name}: found but returned error"),
            fix: Some(format!("Install: {install_url}")),
        },
        Err(_) => DoctorCheck {
            name: name.to_owned(),
            status: if required { "fail" } else { "warn" }.to_owned(),
            message: format!("{name}: not found"),
            fix: Some(format!("Install: {install_url}")),
        },
    }
}

fn check_token() -> DoctorCheck {
    let set = std::env::var("GITHUB_TOKEN").is_ok_and(|token| !token.trim().is_empty());
    if set {
        DoctorCheck {
            name: "token".to_owned(),
            status: "ok".to_owned(),
            message: "GITHUB_TOKEN: set".to_owned(),
            fix: None,
        }
    } else {
        DoctorCheck {
            name: "token".to_owned(),
            status: "warn".to_owned(),
            message: "GITHUB_TOKEN: not set".to_owned(),
            fix: Some("clone and sync need a token: export GITHUB_TOKEN=... or pass --token".to_owned()),
        }
    }
}

fn check_base_dir() -> DoctorCheck {
    let configured = FileConfig::load()
        .ok()
        .and_then(|file| file.base_dir)
        .or_else(|| dirs::home_dir().map(|home| home.join("forgesync")));

    match configured {
        Some(dir) if dir.is_dir() => DoctorCheck {
            name: "base-dir".to_owned(),
            status: "ok".to_owned(),
            message: format!("base dir: {}", dir.display()),
            fix: None,
        },
        Some(dir) => DoctorCheck {
            name: "base-dir".to_owned(),
            status: "ok".to_owned(),
            message: format!("base dir: {} (created on first clone)", dir.display()),
            fix: None,
        },
        None => DoctorCheck {
            name: "base-dir".to_owned(),
            status: "warn".to_owned(),
            message: "base dir: cannot determine a home directory".to_owned(),
            fix: Some("pass --base-dir or set base_dir in .forgesync.toml".to_owned()),
        },
    }
}
