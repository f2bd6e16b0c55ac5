use crate::errors::CoreError;

/// File-type and permission bits as git records them, both in tree entries
/// (octal text) and in index records (u32).
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    #[default]
    Regular,
    Executable,
    Symlink,
    Directory,
}

impl EntryMode {
    /// Octal text form used inside tree entries. Note that directories are
    /// written as `40000`, without a leading zero.
    pub fn as_octal_str(&self) -> &str {
        match self {
            EntryMode::Regular => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Regular => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        // some writers zero-pad directory modes to six characters
        match mode.trim_start_matches('0') {
            "100644" => Ok(EntryMode::Regular),
            "100755" => Ok(EntryMode::Executable),
            "120000" => Ok(EntryMode::Symlink),
            "40000" => Ok(EntryMode::Directory),
            other => Err(CoreError::MalformedObject(format!("invalid entry mode {other}")).into()),
        }
    }

    pub fn try_from_u32(mode: u32) -> anyhow::Result<Self> {
        match mode {
            0o100644 => Ok(EntryMode::Regular),
            0o100755 => Ok(EntryMode::Executable),
            0o120000 => Ok(EntryMode::Symlink),
            0o40000 => Ok(EntryMode::Directory),
            other => {
                Err(CoreError::CorruptIndex(format!("invalid entry mode {other:o}")).into())
            }
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }
}
