//! A flat, in-memory namespace: enough of a filesystem to stand behind the
//! descriptor layer at boot and in tests.

mod vnode;

use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};

use config::{inode::InodeMode, vfs::OpenFlags};
use hashbrown::HashMap;
use mutex::SpinNoIrqLock;
use systype::{SysError, SysResult};
use vfs::{FileSystem, Vnode};

pub use vnode::SimpleVnode;

/// Maps normalized absolute paths to vnodes. Regular files created through
/// `open` are [`SimpleVnode`]s; devices are bound with [`SimpleFs::insert`].
pub struct SimpleFs {
    name: String,
    entries: SpinNoIrqLock<HashMap<String, Arc<dyn Vnode>>>,
}

impl SimpleFs {
    pub fn new(name: &str) -> Arc<Self> {
        let mut entries: HashMap<String, Arc<dyn Vnode>> = HashMap::new();
        entries.insert(
            String::from("/"),
            SimpleVnode::new_dir(InodeMode::from_bits_truncate(0o755)),
        );
        Arc::new(Self {
            name: name.to_string(),
            entries: SpinNoIrqLock::new(entries),
        })
    }

    /// Binds `vnode` at `path`. The parent must be an existing directory.
    pub fn insert(&self, path: &str, vnode: Arc<dyn Vnode>) -> SysResult<()> {
        let path = normalize(path)?;
        let mut entries = self.entries.lock();
        check_parent(&entries, &path)?;
        if entries.contains_key(&path) {
            return Err(SysError::EEXIST);
        }
        log::debug!("[SimpleFs::insert] {path} as {:?}", vnode.vtype());
        entries.insert(path, vnode);
        Ok(())
    }

    pub fn mkdir(&self, path: &str, mode: InodeMode) -> SysResult<()> {
        self.insert(path, SimpleVnode::new_dir(mode))
    }

    /// A new reference to the vnode at `path`.
    pub fn lookup(&self, path: &str) -> SysResult<Arc<dyn Vnode>> {
        let path = normalize(path)?;
        self.entries
            .lock()
            .get(&path)
            .cloned()
            .ok_or(SysError::ENOENT)
    }

    /// Removes the name. Open files keep the vnode alive until they close.
    pub fn unlink(&self, path: &str) -> SysResult<()> {
        let path = normalize(path)?;
        let mut entries = self.entries.lock();
        let vnode = entries.get(&path).ok_or(SysError::ENOENT)?;
        if vnode.vtype().is_dir() {
            return Err(SysError::EISDIR);
        }
        entries.remove(&path);
        Ok(())
    }
}

impl FileSystem for SimpleFs {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, path: &str, flags: OpenFlags, mode: InodeMode) -> SysResult<Arc<dyn Vnode>> {
        let path = normalize(path)?;
        let vnode = {
            let mut entries = self.entries.lock();
            let existing = entries.get(&path).cloned();
            match existing {
                Some(_) if flags.contains(OpenFlags::O_CREAT | OpenFlags::O_EXCL) => {
                    return Err(SysError::EEXIST);
                }
                Some(vnode) => vnode,
                None if flags.contains(OpenFlags::O_CREAT) => {
                    check_parent(&entries, &path)?;
                    log::debug!("[SimpleFs::open] create {path} with mode {:o}", mode.bits());
                    let vnode: Arc<dyn Vnode> = SimpleVnode::new_file(mode);
                    entries.insert(path, vnode.clone());
                    // The creator gets the access it asked for even when
                    // `mode` itself forbids it.
                    return Ok(vnode);
                }
                None => return Err(SysError::ENOENT),
            }
        };
        vnode.check_access(flags)?;
        if flags.contains(OpenFlags::O_TRUNC) && flags.writable() {
            if let Ok(file) = vnode.clone().downcast_arc::<SimpleVnode>() {
                file.truncate(0)?;
            }
        }
        Ok(vnode)
    }
}

/// Resolves `.` and `..` and makes the path absolute.
fn normalize(path: &str) -> SysResult<String> {
    if path.is_empty() {
        return Err(SysError::ENOENT);
    }
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            name => parts.push(name),
        }
    }
    let mut normalized = String::with_capacity(path.len() + 1);
    for part in &parts {
        normalized.push('/');
        normalized.push_str(part);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

fn check_parent(entries: &HashMap<String, Arc<dyn Vnode>>, path: &str) -> SysResult<()> {
    let parent = match path.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    };
    match entries.get(parent) {
        Some(dir) if dir.vtype().is_dir() => Ok(()),
        Some(_) => Err(SysError::ENOTDIR),
        None => Err(SysError::ENOENT),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use config::fs::MAX_FILE_SIZE;

    use super::*;

    fn perm(bits: u32) -> InodeMode {
        InodeMode::from_bits_truncate(bits)
    }

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize("/a/./b/../c").unwrap(), "/a/c");
        assert_eq!(normalize("a//b").unwrap(), "/a/b");
        assert_eq!(normalize("/..").unwrap(), "/");
        assert_eq!(normalize(""), Err(SysError::ENOENT));
    }

    #[test]
    fn open_creates_only_with_o_creat() {
        let fs = SimpleFs::new("simple");
        assert_eq!(
            fs.open("/a", OpenFlags::O_RDONLY, perm(0o644)).err(),
            Some(SysError::ENOENT)
        );
        let created = fs
            .open("/a", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, perm(0o644))
            .unwrap();
        let found = fs.open("/a", OpenFlags::O_RDONLY, perm(0)).unwrap();
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(
            fs.open(
                "/a",
                OpenFlags::O_CREAT | OpenFlags::O_EXCL | OpenFlags::O_RDWR,
                perm(0o644)
            )
            .err(),
            Some(SysError::EEXIST)
        );
    }

    #[test]
    fn create_needs_a_directory_parent() {
        let fs = SimpleFs::new("simple");
        let flags = OpenFlags::O_CREAT | OpenFlags::O_RDWR;
        assert_eq!(fs.open("/no/x", flags, perm(0o644)).err(), Some(SysError::ENOENT));
        fs.open("/file", flags, perm(0o644)).unwrap();
        assert_eq!(
            fs.open("/file/x", flags, perm(0o644)).err(),
            Some(SysError::ENOTDIR)
        );
        fs.mkdir("/dir", perm(0o755)).unwrap();
        assert!(fs.open("/dir/x", flags, perm(0o644)).is_ok());
    }

    #[test]
    fn access_checks_come_from_the_vnode() {
        let fs = SimpleFs::new("simple");
        fs.mkdir("/dir", perm(0o755)).unwrap();
        assert_eq!(
            fs.open("/dir", OpenFlags::O_WRONLY, perm(0)).err(),
            Some(SysError::EISDIR)
        );
        assert!(fs.open("/dir", OpenFlags::O_RDONLY, perm(0)).is_ok());

        fs.open("/ro", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, perm(0o444))
            .unwrap();
        assert_eq!(
            fs.open("/ro", OpenFlags::O_RDWR, perm(0)).err(),
            Some(SysError::EACCES)
        );
        assert_eq!(
            fs.open("/ro", OpenFlags::O_RDONLY | OpenFlags::O_DIRECTORY, perm(0))
                .err(),
            Some(SysError::ENOTDIR)
        );
    }

    #[test]
    fn trunc_empties_existing_file() {
        let fs = SimpleFs::new("simple");
        let vnode = fs
            .open("/t", OpenFlags::O_CREAT | OpenFlags::O_WRONLY, perm(0o644))
            .unwrap();
        vnode.write_at(0, b"content").unwrap();
        fs.open("/t", OpenFlags::O_RDONLY | OpenFlags::O_TRUNC, perm(0))
            .unwrap();
        assert_eq!(vnode.size(), 7);
        fs.open("/t", OpenFlags::O_WRONLY | OpenFlags::O_TRUNC, perm(0))
            .unwrap();
        assert_eq!(vnode.size(), 0);
    }

    #[test]
    fn unlink_keeps_open_vnode_alive() {
        let fs = SimpleFs::new("simple");
        let vnode = fs
            .open("/u", OpenFlags::O_CREAT | OpenFlags::O_RDWR, perm(0o644))
            .unwrap();
        assert_eq!(Arc::strong_count(&vnode), 2);
        fs.unlink("/u").unwrap();
        assert_eq!(Arc::strong_count(&vnode), 1);
        assert_eq!(vnode.write_at(0, b"x"), Ok(1));
        assert_eq!(fs.lookup("/u").err(), Some(SysError::ENOENT));
        assert_eq!(fs.unlink("/"), Err(SysError::EISDIR));
    }

    #[test]
    fn sparse_write_fills_with_zeroes() {
        let file = SimpleVnode::new_file(perm(0o644));
        assert_eq!(file.write_at(3, b"ab"), Ok(2));
        let mut buf = [0xffu8; 8];
        assert_eq!(file.read_at(0, &mut buf), Ok(5));
        assert_eq!(&buf[..5], &[0, 0, 0, b'a', b'b']);
        assert_eq!(file.read_at(9, &mut buf), Ok(0));
    }

    #[test]
    fn growth_is_capped_at_max_file_size() {
        let file = SimpleVnode::new_file(perm(0o644));
        assert_eq!(file.write_at(MAX_FILE_SIZE, b"x"), Err(SysError::EFBIG));
        assert_eq!(file.write_at(1 << 62, b"x"), Err(SysError::EFBIG));
        assert_eq!(file.write_at(usize::MAX, b"x"), Err(SysError::EFBIG));
        assert_eq!(file.truncate(MAX_FILE_SIZE + 1), Err(SysError::EFBIG));
        assert_eq!(file.size(), 0);

        assert_eq!(file.write_at(0, b"abc"), Ok(3));
        assert_eq!(file.truncate(1), Ok(()));
        assert_eq!(file.size(), 1);
    }
}
