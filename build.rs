//! Build-time hints for locating FFmpeg on Windows.
//!
//! `ffmpeg-sys-next` (pulled in by `ffmpeg-next`) finds FFmpeg through
//! `FFMPEG_DIR` or pkg-config. Neither is usual on Windows, so point users at
//! a vcpkg install when one is present.

use std::env;
use std::path::PathBuf;

const WATCHED_VARIABLES: &[&str] = &["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn warn(message: &str) {
    println!("cargo:warning={message}");
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let targets_windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !targets_windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        warn("framezip needs FFmpeg: set FFMPEG_DIR, or install FFmpeg with vcpkg and set VCPKG_ROOT.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let install_dir: PathBuf = [vcpkg_root.as_str(), "installed", triplet.as_str()].iter().collect();

    if !install_dir.exists() {
        warn(&format!(
            "VCPKG_ROOT is set but {} does not exist; install ffmpeg:{triplet} with vcpkg.",
            install_dir.display()
        ));
        return;
    }

    warn(&format!(
        "Found FFmpeg under {0}; set FFMPEG_DIR={0} to use it explicitly.",
        install_dir.display()
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("Set VCPKGRS_DYNAMIC=1 when linking a dynamic vcpkg FFmpeg build.");
    }
}
