use anyhow::{Result, anyhow};
use log::warn;
use pico_args::Arguments;
use std::{env, path::PathBuf};

use pinchframe::config::{ConfigState, Profile};
use pinchframe::geometry::Point;
use pinchframe::replay;
use pinchframe::vector::VectorClassifier;

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("replay") => {
            let pretty = pargs.contains("--pretty");
            let profile_name: Option<String> = pargs.opt_value_from_str("--profile")?;
            let profile_file: Option<String> = pargs.opt_value_from_str("--profile-file")?;
            let trace_path: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: pinchframe replay <trace.json> [--profile <name>]"))?;

            let profile = resolve_profile(profile_name.as_deref(), profile_file.map(PathBuf::from))?;
            let trace = replay::load_trace(&PathBuf::from(&trace_path))?;
            let report = replay::replay(&trace, &profile);

            if pretty {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for rec in &report.records {
                    println!("{}", serde_json::to_string(rec)?);
                }
                println!(
                    "{}",
                    serde_json::to_string(&serde_json::json!({ "transform": report.transform }))?
                );
            }
            Ok(())
        }

        Some("classify") => {
            // usage: pinchframe classify x0 y0 x1 y1 x0' y0' x1' y1'
            let mut v = [0.0f64; 8];
            for slot in v.iter_mut() {
                *slot = pargs.free_from_str().map_err(|_| {
                    anyhow!("usage: pinchframe classify x0 y0 x1 y1 x0' y0' x1' y1'")
                })?;
            }
            let profile = resolve_profile(None, None)?;
            let previous = [Point::new(v[0], v[1]), Point::new(v[2], v[3])];
            let current = [Point::new(v[4], v[5]), Point::new(v[6], v[7])];
            let out = VectorClassifier::new(&profile.classifier).classify(&previous, &current)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }

        Some("list") => {
            let cfg = ConfigState::load_or_install_default()?;
            for name in cfg.list_profiles() {
                let mark = if name == cfg.active_name { "*" } else { " " };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: pinchframe use <profile_name>"))?;
            let mut cfg = ConfigState::load_or_install_default()?;
            cfg.set_active(&name)?;
            println!("ok: active profile is '{}'", cfg.active_name);
            Ok(())
        }

        Some("show") => {
            let cfg = ConfigState::load_or_install_default()?;
            println!("{}", serde_json::to_string_pretty(&cfg.report())?);
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

/// Explicit file first, then a named profile, then the active one. Falls
/// back to the built-in profile when no config directory is usable.
fn resolve_profile(name: Option<&str>, file: Option<PathBuf>) -> Result<Profile> {
    if let Some(path) = file {
        return Profile::from_file(&path);
    }
    match ConfigState::load_or_install_default() {
        Ok(cfg) => match name {
            Some(n) => cfg.load_profile(n),
            None => Ok(cfg.profile),
        },
        Err(e) if name.is_none() => {
            warn!("config unavailable ({e}); using built-in profile");
            Profile::builtin()
        }
        Err(e) => Err(e),
    }
}

fn print_help() {
    println!(
        r#"pinchframe — multi-touch gesture to transform engine

USAGE:
  pinchframe help [command]                      Show general or command-specific help
  pinchframe replay <trace.json> [--pretty]      Replay a touch trace and print snapshots
         [--profile <name> | --profile-file <path>]
  pinchframe classify x0 y0 x1 y1 x0' y0' x1' y1'  Classify how a touch pair changed
  pinchframe list                                List profiles
  pinchframe use <name>                          Switch active profile
  pinchframe show                                Show config paths and active profile

TIPS:
  - Profiles: ~/.config/pinchframe/profiles
  - Active profile pointer: ~/.config/pinchframe/active
  - RUST_LOG=debug shows rejected scale/drag candidates
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "replay" => println!(
            "usage: pinchframe replay <trace.json> [--profile <name> | --profile-file <path>] [--pretty]\nFeeds start/move/end samples through the engine; prints one JSON record per sample."
        ),
        "classify" => println!(
            "usage: pinchframe classify x0 y0 x1 y1 x0' y0' x1' y1'\nPrints small/direction and scale ratios between two touch pairs."
        ),
        "list" => {
            println!("usage: pinchframe list\nLists available profiles; marks active with '*'.")
        }
        "use" => {
            println!("usage: pinchframe use <name>\nSwitches active profile to <name>.")
        }
        "show" => println!("usage: pinchframe show\nPrints config paths and the active profile."),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
