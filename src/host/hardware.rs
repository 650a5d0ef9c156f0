//! GPU driver suggestions from `lspci -nnk`.

use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Unknown,
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nvidia => "NVIDIA",
            Self::Amd => "AMD",
            Self::Intel => "Intel",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

const BASE_WAYLAND: &[&str] = &[
    "pipewire",
    "wireplumber",
    "pipewire-pulse",
    "xdg-desktop-portal",
    "xdg-desktop-portal-wlr",
    "qt6-wayland",
    "qt5-wayland",
];

const DISPLAY_CLASSES: &[&str] = &["vga compatible controller", "3d controller", "display controller"];

impl GpuVendor {
    /// Vendor of the first recognised GPU. Display-class lines are
    /// preferred so chipset devices do not decide the vendor.
    pub fn detect(lspci: &str) -> Self {
        let lower = lspci.to_lowercase();
        let display: String = lower
            .lines()
            .filter(|line| DISPLAY_CLASSES.iter().any(|class| line.contains(class)))
            .collect::<Vec<_>>()
            .join("\n");
        let haystack = if display.is_empty() { &lower } else { &display };

        if haystack.contains("nvidia") {
            Self::Nvidia
        } else if haystack.contains("advanced micro devices")
            || haystack.contains("amd/ati")
            || haystack.contains("radeon")
        {
            Self::Amd
        } else if haystack.contains("intel") {
            Self::Intel
        } else {
            Self::Unknown
        }
    }

    pub fn driver_packages(self) -> &'static [&'static str] {
        match self {
            Self::Nvidia => &[
                "nvidia",
                "nvidia-utils",
                "lib32-nvidia-utils",
                "vulkan-icd-loader",
                "lib32-vulkan-icd-loader",
            ],
            Self::Amd => &[
                "mesa",
                "vulkan-radeon",
                "lib32-mesa",
                "lib32-vulkan-radeon",
                "vulkan-icd-loader",
                "lib32-vulkan-icd-loader",
            ],
            Self::Intel => &[
                "mesa",
                "vulkan-intel",
                "lib32-mesa",
                "lib32-vulkan-intel",
                "vulkan-icd-loader",
                "lib32-vulkan-icd-loader",
            ],
            Self::Unknown => &["mesa", "vulkan-icd-loader"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSuggestion {
    pub vendor: GpuVendor,
    /// Wayland base stack followed by the vendor's drivers.
    pub packages: Vec<String>,
    /// The subset of `packages` that is not installed.
    pub missing: Vec<String>,
}

impl DriverSuggestion {
    pub fn from_lspci(lspci: &str, installed: &BTreeSet<String>) -> Self {
        let vendor = GpuVendor::detect(lspci);
        let packages: Vec<String> = BASE_WAYLAND
            .iter()
            .chain(vendor.driver_packages().iter())
            .map(|s| s.to_string())
            .collect();
        let missing = packages
            .iter()
            .filter(|p| !installed.contains(p.as_str()))
            .cloned()
            .collect();
        Self {
            vendor,
            packages,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMD_LSPCI: &str = "\
00:00.0 Host bridge [0600]: Intel Corporation Device [8086:4660]
01:00.0 VGA compatible controller [0300]: Advanced Micro Devices, Inc. [AMD/ATI] Navi 21 [1002:73bf]
\tKernel driver in use: amdgpu
";

    #[test]
    fn display_lines_decide_vendor() {
        assert_eq!(GpuVendor::detect(AMD_LSPCI), GpuVendor::Amd);
    }

    #[test]
    fn vendors_are_recognised() {
        assert_eq!(
            GpuVendor::detect("01:00.0 3D controller: NVIDIA Corporation AD107M"),
            GpuVendor::Nvidia
        );
        assert_eq!(
            GpuVendor::detect("00:02.0 VGA compatible controller: Intel Corporation UHD"),
            GpuVendor::Intel
        );
        assert_eq!(GpuVendor::detect(""), GpuVendor::Unknown);
    }

    #[test]
    fn missing_excludes_installed() {
        let installed: BTreeSet<String> = ["mesa".to_string(), "pipewire".to_string()].into();
        let s = DriverSuggestion::from_lspci(AMD_LSPCI, &installed);
        assert_eq!(s.packages[0], "pipewire");
        assert!(s.packages.contains(&"vulkan-radeon".to_string()));
        assert!(!s.missing.contains(&"mesa".to_string()));
        assert!(!s.missing.contains(&"pipewire".to_string()));
        assert_eq!(s.missing.len(), s.packages.len() - 2);
    }
}
