use anyhow::Result;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::{RunConfig, Tool};

/// Concrete backend after auto-resolution. Never `Auto` at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTool {
    Magick,
    Ffmpeg,
}

impl ResolvedTool {
    pub fn program(self) -> &'static str {
        match self {
            ResolvedTool::Magick => "magick",
            ResolvedTool::Ffmpeg => "ffmpeg",
        }
    }
}

/// Check whether an external tool is reachable on this host.
fn probe(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Pick the backend to use for this run, or fail when it is not installed.
pub fn select(config: &RunConfig) -> Result<ResolvedTool> {
    let tool = select_with(config.tool, probe)?;
    if config.verbose {
        crate::logger!("Using {} for conversion", tool.program());
    }
    Ok(tool)
}

/// Selection rules: auto prefers ffmpeg over magick; an explicitly requested
/// tool never falls back to the other one. Only backends that can affect the
/// decision are probed.
fn select_with(tool: Tool, probe: impl Fn(&str) -> bool) -> Result<ResolvedTool> {
    match tool {
        Tool::Magick if probe("magick") => Ok(ResolvedTool::Magick),
        Tool::Magick => anyhow::bail!("magick requested but not found in PATH"),
        Tool::Ffmpeg if probe("ffmpeg") => Ok(ResolvedTool::Ffmpeg),
        Tool::Ffmpeg => anyhow::bail!("ffmpeg requested but not found in PATH"),
        Tool::Auto if probe("ffmpeg") => Ok(ResolvedTool::Ffmpeg),
        Tool::Auto if probe("magick") => Ok(ResolvedTool::Magick),
        Tool::Auto => anyhow::bail!("neither ffmpeg nor magick found in PATH"),
    }
}

/// Translate the 1-100 quality scale to ffmpeg's inverted 0-51 CRF scale.
/// Truncates 51 - q/2 toward zero: 100 -> 1, 65 -> 18, 1 -> 50.
pub fn ffmpeg_quality(quality: u8) -> u8 {
    (((102 - u32::from(quality)) / 2).clamp(0, 51)) as u8
}

fn magick_args(source: &Path, dest: &Path, quality: u8) -> Vec<String> {
    vec![
        source.to_string_lossy().to_string(),
        "-quality".to_string(),
        quality.to_string(),
        dest.to_string_lossy().to_string(),
    ]
}

fn ffmpeg_args(source: &Path, dest: &Path, quality: u8, verbose: bool) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        if verbose { "info" } else { "error" }.to_string(),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        "scale=iw:ih".to_string(),
        "-c:v".to_string(),
        "libx265".to_string(),
        "-crf".to_string(),
        ffmpeg_quality(quality).to_string(),
        "-tag:v".to_string(),
        "hvc1".to_string(),
        dest.to_string_lossy().to_string(),
    ]
}

/// Run one encode through the selected backend. The backend writes `dest`
/// directly; there is no temp-file staging.
pub fn convert(
    tool: ResolvedTool,
    source: &Path,
    dest: &Path,
    quality: u8,
    verbose: bool,
) -> Result<(), String> {
    let args = match tool {
        ResolvedTool::Magick => magick_args(source, dest, quality),
        ResolvedTool::Ffmpeg => ffmpeg_args(source, dest, quality, verbose),
    };

    let output = Command::new(tool.program())
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to run {}: {}", tool.program(), e))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        let detail = stderr.trim();
        return Err(if detail.is_empty() {
            format!("{} exited with {}", tool.program(), output.status)
        } else {
            format!("{} exited with {}: {}", tool.program(), output.status, detail)
        });
    }

    if verbose && !stderr.trim().is_empty() {
        crate::logger!("{}", stderr.trim_end());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffmpeg_quality_known_points() {
        assert_eq!(ffmpeg_quality(100), 1);
        assert_eq!(ffmpeg_quality(65), 18);
        assert_eq!(ffmpeg_quality(1), 50);
    }

    #[test]
    fn ffmpeg_quality_full_range() {
        for q in 1..=100u8 {
            let crf = ffmpeg_quality(q);
            assert!(crf <= 51, "q={} gave crf={}", q, crf);
            // trunc(51 - q/2) over the real numbers
            assert_eq!(u32::from(crf), (102 - u32::from(q)) / 2);
        }
    }

    fn host_with(magick: bool, ffmpeg: bool) -> impl Fn(&str) -> bool {
        move |name| match name {
            "magick" => magick,
            "ffmpeg" => ffmpeg,
            _ => false,
        }
    }

    #[test]
    fn auto_prefers_ffmpeg() {
        assert_eq!(
            select_with(Tool::Auto, host_with(true, true)).unwrap(),
            ResolvedTool::Ffmpeg
        );
        assert_eq!(
            select_with(Tool::Auto, host_with(true, false)).unwrap(),
            ResolvedTool::Magick
        );
        assert!(select_with(Tool::Auto, host_with(false, false)).is_err());
    }

    #[test]
    fn explicit_tool_never_falls_back() {
        assert!(select_with(Tool::Magick, host_with(false, true)).is_err());
        assert!(select_with(Tool::Ffmpeg, host_with(true, false)).is_err());
        assert_eq!(
            select_with(Tool::Magick, host_with(true, true)).unwrap(),
            ResolvedTool::Magick
        );
    }

    #[test]
    fn only_relevant_backends_are_probed() {
        use std::cell::RefCell;

        let probed = RefCell::new(Vec::new());
        let tool = select_with(Tool::Magick, |name| {
            probed.borrow_mut().push(name.to_string());
            true
        })
        .unwrap();
        assert_eq!(tool, ResolvedTool::Magick);
        assert_eq!(*probed.borrow(), vec!["magick"]);

        probed.borrow_mut().clear();
        let tool = select_with(Tool::Auto, |name| {
            probed.borrow_mut().push(name.to_string());
            name == "ffmpeg"
        })
        .unwrap();
        assert_eq!(tool, ResolvedTool::Ffmpeg);
        assert_eq!(*probed.borrow(), vec!["ffmpeg"]);
    }

    #[test]
    fn magick_args_pass_quality_through() {
        let args = magick_args(Path::new("a.png"), Path::new("a.heic"), 80);
        assert_eq!(args, vec!["a.png", "-quality", "80", "a.heic"]);
    }

    #[test]
    fn ffmpeg_args_encode_a_single_heic_frame() {
        let args = ffmpeg_args(Path::new("a.png"), Path::new("a.heic"), 65, false);
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx265".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"18".to_string()));
        assert!(args.contains(&"-frames:v".to_string()));
        assert!(args.contains(&"scale=iw:ih".to_string()));
        assert!(args.contains(&"hvc1".to_string()));
        assert_eq!(args.last(), Some(&"a.heic".to_string()));
    }

    #[test]
    fn ffmpeg_log_level_follows_verbosity() {
        let quiet = ffmpeg_args(Path::new("a.png"), Path::new("a.heic"), 65, false);
        assert!(quiet.contains(&"error".to_string()));
        let verbose = ffmpeg_args(Path::new("a.png"), Path::new("a.heic"), 65, true);
        assert!(verbose.contains(&"info".to_string()));
    }
}
