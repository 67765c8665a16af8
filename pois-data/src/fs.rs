//! Capability-based file helpers built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Open the directory holding `path` and return it with the file name.
pub(crate) fn open_parent(path: &Utf8Path) -> io::Result<(Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing directory above `path`.
pub(crate) fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }

    // cap-std only accepts relative paths, so anchor absolute ones at their root.
    let mut components = parent.components();
    let (base, relative): (Utf8PathBuf, Utf8PathBuf) = match components.next() {
        Some(Utf8Component::Prefix(prefix)) => {
            let root = components
                .next()
                .map_or_else(String::new, |root| root.as_str().to_owned());
            (
                Utf8PathBuf::from(format!("{}{root}", prefix.as_str())),
                components.collect(),
            )
        }
        Some(Utf8Component::RootDir) => (Utf8PathBuf::from("/"), components.collect()),
        _ => (Utf8PathBuf::from("."), parent.to_path_buf()),
    };
    if relative.as_str().is_empty() {
        return Ok(());
    }
    Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}
