//! Kernel categories and their file extensions

use std::fmt;

/// Kernel category, in meta-kernel load order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KernelType {
    Lsk,
    Pck,
    Fk,
    Ik,
    Sclk,
    Spk,
    Ck,
    Dsk,
    Mk,
}

/// Categories evaluated when building a meta-kernel
pub const META_KERNEL_ORDER: [KernelType; 8] = [
    KernelType::Lsk,
    KernelType::Pck,
    KernelType::Fk,
    KernelType::Ik,
    KernelType::Sclk,
    KernelType::Spk,
    KernelType::Ck,
    KernelType::Dsk,
];

const ALL_TYPES: [KernelType; 9] = [
    KernelType::Lsk,
    KernelType::Pck,
    KernelType::Fk,
    KernelType::Ik,
    KernelType::Sclk,
    KernelType::Spk,
    KernelType::Ck,
    KernelType::Dsk,
    KernelType::Mk,
];

impl KernelType {
    /// Directory name of the category under `spice_kernels/`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lsk => "lsk",
            Self::Pck => "pck",
            Self::Fk => "fk",
            Self::Ik => "ik",
            Self::Sclk => "sclk",
            Self::Spk => "spk",
            Self::Ck => "ck",
            Self::Dsk => "dsk",
            Self::Mk => "mk",
        }
    }

    /// Extensions belonging to the category
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Lsk => &["tls"],
            Self::Pck => &["tpc", "bpc"],
            Self::Fk => &["tf"],
            Self::Ik => &["ti"],
            Self::Sclk => &["tsc"],
            Self::Spk => &["bsp"],
            Self::Ck => &["bc"],
            Self::Dsk => &["bds"],
            Self::Mk => &["tm"],
        }
    }

    /// Category of a bare extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        ALL_TYPES
            .into_iter()
            .find(|t| t.extensions().contains(&extension.as_str()))
    }

    /// Category of a file name, from its last extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        extension(name).and_then(Self::from_extension)
    }

    /// Category of a directory name
    pub fn from_dir(dir: &str) -> Option<Self> {
        ALL_TYPES.into_iter().find(|t| t.as_str() == dir)
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last extension of a file name, without the dot
pub fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// Encoding of a kernel file: binary kernel extensions start with `b`
pub fn file_format(name: &str) -> &'static str {
    match extension(name) {
        Some(ext) if ext.to_ascii_lowercase().starts_with('b') => "Binary",
        _ => "Character",
    }
}

/// Path of a kernel relative to the archive root
pub fn staging_path(kernel_type: KernelType, name: &str) -> String {
    format!("spice_kernels/{}/{}", kernel_type, name)
}
