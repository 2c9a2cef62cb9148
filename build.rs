//! Surfaces FFmpeg discovery problems before `ffmpeg-sys-next` fails with a
//! less helpful linker error.

use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if let Some(ffmpeg_dir) = env::var_os("FFMPEG_DIR").map(PathBuf::from) {
        check_ffmpeg_dir(&ffmpeg_dir);
        return;
    }

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        suggest_vcpkg_install();
    }
}

fn check_ffmpeg_dir(ffmpeg_dir: &Path) {
    if !ffmpeg_dir.join("include").join("libavformat").exists() {
        println!(
            "cargo:warning=FFMPEG_DIR={} does not contain include/libavformat; vidsheet needs the FFmpeg development headers.",
            ffmpeg_dir.display(),
        );
    }
}

fn suggest_vcpkg_install() {
    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=FFMPEG_DIR is not set. On Windows, install FFmpeg through vcpkg and point FFMPEG_DIR at it."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = Path::new(&vcpkg_root).join("installed").join(&triplet);

    if !candidate.exists() {
        println!(
            "cargo:warning=No vcpkg FFmpeg install found at {}.",
            candidate.display(),
        );
        return;
    }

    println!(
        "cargo:warning=Found vcpkg FFmpeg at {0}. Set FFMPEG_DIR={0} to use it.",
        candidate.display(),
    );
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        println!("cargo:warning=Set VCPKGRS_DYNAMIC=1 for dynamic vcpkg FFmpeg builds.");
    }
}
