use std::path::{Path, PathBuf};

/// Ascend `levels` directories from `start`. Ascending past the root stays at the root.
pub fn resolve(start: &Path, levels: usize) -> PathBuf {
	let mut path = start;
	for _ in 0..levels {
		match path.parent() {
			Some(parent) => path = parent,
			None => break,
		}
	}
	path.to_owned()
}

#[test]
fn test_resolve() {
	assert_eq!(resolve(Path::new("/a/b/c/d"), 2), PathBuf::from("/a/b"));
	assert_eq!(resolve(Path::new("/a/b/c/d"), 0), PathBuf::from("/a/b/c/d"));
}

#[test]
fn test_resolve_beyond_the_root() {
	assert_eq!(resolve(Path::new("/a/b"), 4), PathBuf::from("/"));
	assert_eq!(resolve(Path::new("/"), 1), PathBuf::from("/"));
}
