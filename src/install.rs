//! OCM CLI installer: platform detection, release lookup, download, and
//! placement on an install path.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::output::OutputContext;
use crate::probe::ToolProbe;

/// GitHub release metadata endpoint for the OCM CLI.
pub const RELEASE_API_URL: &str =
    "https://api.github.com/repos/open-component-model/ocm/releases/latest";

/// Cap on the downloaded binary size.
const MAX_DOWNLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// One release asset as published on the metadata endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name.
    pub name: String,
    /// Direct download URL.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Latest published release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag, e.g. `v0.23.0`.
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Published assets.
    pub assets: Vec<ReleaseAsset>,
}

/// Abstraction over the release backend, enabling test doubles.
pub trait ReleaseSource {
    /// Fetch the latest published release.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be fetched or parsed.
    fn latest(&self) -> Result<Release>;

    /// Download `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or write fails.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Production source using the GitHub releases API.
pub struct GithubReleaseSource;

impl ReleaseSource for GithubReleaseSource {
    fn latest(&self) -> Result<Release> {
        let response = ureq::get(RELEASE_API_URL)
            .timeout(std::time::Duration::from_secs(10))
            .call()
            .context("failed to fetch release metadata")?;
        let release: Release = response
            .into_json()
            .context("failed to parse release metadata")?;
        Ok(release)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = ureq::get(url)
            .call()
            .context("failed to download release asset")?;
        let mut data = Vec::new();
        response
            .into_reader()
            .take(MAX_DOWNLOAD_BYTES)
            .read_to_end(&mut data)
            .context("failed to read release asset")?;
        std::fs::write(dest, &data)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        Ok(())
    }
}

/// Host platform resolved to the release asset naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// OS tag: `linux`, `darwin`, or `windows`.
    pub os: &'static str,
    /// Architecture tag: `amd64` or `arm64`.
    pub arch: &'static str,
}

/// Detect the host platform.
///
/// # Errors
///
/// Returns an error for any OS/architecture outside the supported matrix;
/// this is a hard failure with no fallback.
pub fn detect_platform() -> Result<Platform> {
    detect_platform_from(std::env::consts::OS, std::env::consts::ARCH)
}

fn detect_platform_from(os: &str, arch: &str) -> Result<Platform> {
    let os = match os {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        other => anyhow::bail!("unsupported operating system: {other}"),
    };
    let arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => anyhow::bail!("unsupported architecture: {other}"),
    };
    Ok(Platform { os, arch })
}

/// Select the release asset matching `ocm-{tag}-{os}-{arch}[.exe]`.
#[must_use]
pub fn select_asset(release: &Release, platform: Platform) -> Option<ReleaseAsset> {
    let mut wanted = format!("ocm-{}-{}-{}", release.tag, platform.os, platform.arch);
    if platform.os == "windows" {
        wanted.push_str(".exe");
    }
    release
        .assets
        .iter()
        .find(|a| a.name.contains(&wanted))
        .cloned()
}

/// Choose the install directory.
///
/// On unix-like hosts, prefer user-local bin directories that are already
/// on PATH and writable, falling back to `~/.local/bin`. On windows, use
/// `~\bin`.
#[must_use]
pub fn install_dir(platform: Platform) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    if platform.os == "windows" {
        return home.join("bin");
    }

    let path_dirs: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();

    let preferred = [
        home.join(".local").join("bin"),
        home.join("bin"),
        PathBuf::from("/usr/local/bin"),
    ];

    for dir in &preferred {
        if path_dirs.contains(dir) && is_writable(dir) {
            return dir.clone();
        }
    }

    home.join(".local").join("bin")
}

fn is_writable(dir: &Path) -> bool {
    std::fs::metadata(dir)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Installs the OCM CLI for the host platform.
pub struct OcmInstaller<'a, P: ToolProbe, S: ReleaseSource> {
    probe: &'a P,
    source: &'a S,
    ctx: &'a OutputContext,
    dry_run: bool,
}

impl<'a, P: ToolProbe, S: ReleaseSource> OcmInstaller<'a, P, S> {
    pub fn new(probe: &'a P, source: &'a S, ctx: &'a OutputContext, dry_run: bool) -> Self {
        Self {
            probe,
            source,
            ctx,
            dry_run,
        }
    }

    /// Ensure the `ocm` binary is present, installing it when absent.
    ///
    /// Idempotent: succeeds immediately when the tool already resolves.
    /// Every failing step logs its reason and reports `false`; a partial
    /// download may remain in scratch space and is not rolled back.
    pub fn ensure_installed(&self) -> bool {
        if self.probe.exists("ocm") {
            self.ctx.success("OCM CLI is already installed");
            return true;
        }

        self.ctx.info("Installing OCM CLI...");

        let platform = match detect_platform() {
            Ok(platform) => platform,
            Err(e) => {
                self.ctx.error(&e.to_string());
                return false;
            }
        };

        let release = match self.source.latest() {
            Ok(release) => release,
            Err(e) => {
                self.ctx.error(&format!("Failed to fetch OCM release: {e}"));
                return false;
            }
        };

        let Some(asset) = select_asset(&release, platform) else {
            self.ctx.error(&format!(
                "No suitable OCM CLI binary found for {}-{}",
                platform.os, platform.arch
            ));
            return false;
        };

        let dir = install_dir(platform);
        let binary_name = if platform.os == "windows" { "ocm.exe" } else { "ocm" };
        let install_path = dir.join(binary_name);

        if self.dry_run {
            self.ctx.info(&format!(
                "[dry-run] would download {} and install to {}",
                asset.download_url,
                install_path.display()
            ));
            return true;
        }

        if let Err(e) = self.download_and_place(&asset, &dir, &install_path) {
            self.ctx.error(&format!("Failed to install OCM CLI: {e}"));
            return false;
        }

        if self.probe.exists("ocm") {
            self.ctx.success(&format!(
                "OCM CLI installed successfully to {}",
                install_path.display()
            ));
            true
        } else {
            self.ctx
                .error("OCM CLI installation failed - binary not found in PATH");
            self.ctx
                .info(&format!("You may need to add {} to your PATH", dir.display()));
            false
        }
    }

    fn download_and_place(
        &self,
        asset: &ReleaseAsset,
        dir: &Path,
        install_path: &Path,
    ) -> Result<()> {
        self.ctx
            .info(&format!("Downloading OCM CLI from {}", asset.download_url));

        let scratch = tempfile::NamedTempFile::new().context("creating scratch file")?;
        self.source.download(&asset.download_url, scratch.path())?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;

        let (_, scratch_path) = scratch.keep().context("persisting scratch file")?;
        place_binary(&scratch_path, install_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(install_path, std::fs::Permissions::from_mode(0o755))
                .with_context(|| format!("setting permissions on {}", install_path.display()))?;
        }

        Ok(())
    }
}

/// Move the downloaded binary into place; cross-device rename falls back
/// to copy + remove.
fn place_binary(scratch: &Path, install_path: &Path) -> Result<()> {
    if std::fs::rename(scratch, install_path).is_ok() {
        return Ok(());
    }
    std::fs::copy(scratch, install_path)
        .with_context(|| format!("copying binary to {}", install_path.display()))?;
    let _ = std::fs::remove_file(scratch);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn release(tag: &str, names: &[&str]) -> Release {
        Release {
            tag: tag.to_string(),
            assets: names
                .iter()
                .map(|n| ReleaseAsset {
                    name: (*n).to_string(),
                    download_url: format!("https://example.com/{n}"),
                })
                .collect(),
        }
    }

    // ── detect_platform_from ─────────────────────────────────────────────────

    #[test]
    fn test_detect_platform_maps_supported_combinations() {
        let p = detect_platform_from("linux", "x86_64").expect("supported");
        assert_eq!(p, Platform { os: "linux", arch: "amd64" });

        let p = detect_platform_from("macos", "aarch64").expect("supported");
        assert_eq!(p, Platform { os: "darwin", arch: "arm64" });

        let p = detect_platform_from("windows", "x86_64").expect("supported");
        assert_eq!(p, Platform { os: "windows", arch: "amd64" });
    }

    #[test]
    fn test_detect_platform_rejects_unsupported_os_and_arch() {
        assert!(detect_platform_from("freebsd", "x86_64").is_err());
        assert!(detect_platform_from("linux", "riscv64").is_err());
    }

    // ── select_asset ─────────────────────────────────────────────────────────

    #[test]
    fn test_select_asset_matches_tagged_name() {
        let release = release(
            "v0.23.0",
            &[
                "ocm-v0.23.0-linux-amd64",
                "ocm-v0.23.0-darwin-arm64",
                "ocm-v0.23.0-windows-amd64.exe",
            ],
        );
        let asset = select_asset(&release, Platform { os: "linux", arch: "amd64" })
            .expect("linux asset");
        assert_eq!(asset.name, "ocm-v0.23.0-linux-amd64");
    }

    #[test]
    fn test_select_asset_windows_requires_exe_suffix() {
        let bare = release("v0.23.0", &["ocm-v0.23.0-windows-amd64"]);
        assert!(select_asset(&bare, Platform { os: "windows", arch: "amd64" }).is_none());

        let suffixed = release("v0.23.0", &["ocm-v0.23.0-windows-amd64.exe"]);
        assert!(select_asset(&suffixed, Platform { os: "windows", arch: "amd64" }).is_some());
    }

    #[test]
    fn test_select_asset_no_match_returns_none() {
        let release = release("v0.23.0", &["ocm-v0.23.0-linux-amd64"]);
        assert!(select_asset(&release, Platform { os: "darwin", arch: "arm64" }).is_none());
    }

    // ── install_dir ──────────────────────────────────────────────────────────

    #[test]
    #[serial]
    fn test_install_dir_falls_back_to_local_bin_when_path_empty() {
        let saved = std::env::var_os("PATH");
        // SAFETY: protected by #[serial]
        unsafe { std::env::set_var("PATH", "") };
        let dir = install_dir(Platform { os: "linux", arch: "amd64" });
        if let Some(path) = saved {
            // SAFETY: protected by #[serial]
            unsafe { std::env::set_var("PATH", path) };
        }
        let home = dirs::home_dir().expect("home dir");
        assert_eq!(dir, home.join(".local").join("bin"));
    }

    #[test]
    fn test_install_dir_windows_uses_home_bin() {
        let dir = install_dir(Platform { os: "windows", arch: "amd64" });
        let home = dirs::home_dir().expect("home dir");
        assert_eq!(dir, home.join("bin"));
    }

    // ── ensure_installed via stubs ───────────────────────────────────────────

    struct FixedProbe(bool);
    impl crate::probe::ToolProbe for FixedProbe {
        fn exists(&self, _name: &str) -> bool {
            self.0
        }
    }

    struct StubSource {
        release: Release,
    }
    impl ReleaseSource for StubSource {
        fn latest(&self) -> Result<Release> {
            Ok(self.release.clone())
        }
        fn download(&self, _url: &str, _dest: &Path) -> Result<()> {
            panic!("download must not run in suppressed mode")
        }
    }

    #[test]
    fn test_ensure_installed_short_circuits_when_present() {
        let ctx = OutputContext::silent();
        let probe = FixedProbe(true);
        let source = StubSource {
            release: release("v0.0.0", &[]),
        };
        let installer = OcmInstaller::new(&probe, &source, &ctx, false);
        assert!(installer.ensure_installed());
    }

    #[test]
    fn test_ensure_installed_dry_run_selects_asset_but_never_downloads() {
        let ctx = OutputContext::silent();
        let probe = FixedProbe(false);
        let platform = detect_platform().expect("test host is a supported platform");
        let name = format!("ocm-v9.9.9-{}-{}", platform.os, platform.arch);
        let source = StubSource {
            release: release("v9.9.9", &[&name]),
        };
        let installer = OcmInstaller::new(&probe, &source, &ctx, true);
        assert!(installer.ensure_installed());
    }

    #[test]
    fn test_ensure_installed_fails_without_matching_asset() {
        let ctx = OutputContext::silent();
        let probe = FixedProbe(false);
        let source = StubSource {
            release: release("v9.9.9", &["ocm-v9.9.9-plan9-mips"]),
        };
        let installer = OcmInstaller::new(&probe, &source, &ctx, true);
        assert!(!installer.ensure_installed());
    }

    // ── place_binary ─────────────────────────────────────────────────────────

    #[test]
    fn test_place_binary_moves_file_into_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let scratch = dir.path().join("scratch");
        let dest = dir.path().join("ocm");
        std::fs::write(&scratch, b"binary").unwrap();

        place_binary(&scratch, &dest).expect("place");
        assert!(dest.exists());
        assert_eq!(std::fs::read(&dest).unwrap(), b"binary");
    }
}
