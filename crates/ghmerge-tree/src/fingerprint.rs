use ghmerge_git::{BatchChannel, GitRunner};
use ghmerge_types::TreeFingerprint;
use sha2::{Digest, Sha512};
use tracing::debug;

use crate::error::{TreeError, TreeResult};

/// Blob content is hashed in chunks of this size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the SHA-512 fingerprint of the tree at `commit`.
///
/// Every blob reachable from the commit is listed, sorted by path in byte
/// order, and streamed through one long-lived `cat-file --batch` channel.
/// Each blob's content is hashed individually; the outer digest absorbs
/// `"<blob hex>  <path>\n"` per entry in sorted order. Non-blob entries
/// (directories, submodule pointers) are excluded, as are file modes, so
/// a permission flip does not change the fingerprint but any content or
/// path change does.
pub fn tree_sha512(git: &GitRunner, commit: &str) -> TreeResult<TreeFingerprint> {
    let mut entries: Vec<_> = git
        .ls_tree(commit)?
        .into_iter()
        .filter(|e| e.is_blob())
        .collect();
    // Byte-order sort makes the result independent of how git happened to
    // enumerate the tree.
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let mut channel = BatchChannel::open(git)?;
    let mut overall = Sha512::new();
    for entry in &entries {
        channel.request(&entry.oid)?;
        let header = channel.read_header()?;
        if header.oid != entry.oid {
            return Err(TreeError::ReplyMismatch {
                requested: entry.oid.clone(),
                answered: header.oid,
            });
        }
        let mut inner = Sha512::new();
        channel.read_content(header.size, CHUNK_SIZE, |piece| inner.update(piece))?;
        channel.read_trailer()?;

        overall.update(hex::encode(inner.finalize()).as_bytes());
        overall.update(b"  ");
        overall.update(&entry.path);
        overall.update(b"\n");
    }
    channel.close()?;

    let digest = hex::encode(overall.finalize());
    debug!(commit, blobs = entries.len(), fingerprint = %&digest[..16], "tree fingerprinted");
    Ok(TreeFingerprint::from_hex(digest))
}

/// Paths of all symbolic links reachable from `commit`.
///
/// A merge that introduces any symlink is rejected before fingerprinting:
/// a link can point outside the working directory and subvert the
/// unsupervised build/test step.
pub fn symlink_paths(git: &GitRunner, commit: &str) -> TreeResult<Vec<String>> {
    let mut paths: Vec<String> = git
        .ls_tree(commit)?
        .iter()
        .filter(|e| e.is_symlink())
        .map(|e| e.path_lossy())
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha512};
    use std::fs;

    fn scratch_repo() -> (tempfile::TempDir, GitRunner) {
        let dir = tempfile::tempdir().unwrap();
        let git = GitRunner::new().in_dir(dir.path());
        git.checked(&["init", "-q", "-b", "main"]).unwrap();
        git.checked(&["config", "user.email", "test@example.invalid"])
            .unwrap();
        git.checked(&["config", "user.name", "Test"]).unwrap();
        git.checked(&["config", "commit.gpgsign", "false"]).unwrap();
        (dir, git)
    }

    fn write_and_add(dir: &tempfile::TempDir, git: &GitRunner, name: &str, content: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        git.checked(&["add", name]).unwrap();
    }

    fn commit_all(git: &GitRunner, message: &str) {
        git.checked(&["commit", "-q", "-m", message]).unwrap();
    }

    #[test]
    fn identical_content_sets_fingerprint_equal() {
        // Same (path, content) set, added in different order, different
        // commit messages and times.
        let (dir_a, git_a) = scratch_repo();
        write_and_add(&dir_a, &git_a, "one.txt", "first");
        write_and_add(&dir_a, &git_a, "sub/two.txt", "second");
        commit_all(&git_a, "a");

        let (dir_b, git_b) = scratch_repo();
        write_and_add(&dir_b, &git_b, "sub/two.txt", "second");
        write_and_add(&dir_b, &git_b, "one.txt", "first");
        commit_all(&git_b, "entirely different message");

        let fp_a = tree_sha512(&git_a, "HEAD").unwrap();
        let fp_b = tree_sha512(&git_b, "HEAD").unwrap();
        assert_eq!(fp_a, fp_b);
    }

    #[test]
    fn single_byte_change_alters_fingerprint() {
        let (dir, git) = scratch_repo();
        write_and_add(&dir, &git, "file.txt", "content-a");
        commit_all(&git, "before");
        let before = tree_sha512(&git, "HEAD").unwrap();

        write_and_add(&dir, &git, "file.txt", "content-b");
        commit_all(&git, "after");
        let after = tree_sha512(&git, "HEAD").unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn rename_alters_fingerprint() {
        let (dir, git) = scratch_repo();
        write_and_add(&dir, &git, "old-name.txt", "same bytes");
        commit_all(&git, "before");
        let before = tree_sha512(&git, "HEAD").unwrap();

        git.checked(&["mv", "old-name.txt", "new-name.txt"]).unwrap();
        commit_all(&git, "renamed");
        let after = tree_sha512(&git, "HEAD").unwrap();
        assert_ne!(before, after);
        let _ = dir;
    }

    #[cfg(unix)]
    #[test]
    fn mode_change_does_not_alter_fingerprint() {
        let (dir, git) = scratch_repo();
        write_and_add(&dir, &git, "script.sh", "#!/bin/sh\n");
        commit_all(&git, "before");
        let before = tree_sha512(&git, "HEAD").unwrap();

        git.checked(&["update-index", "--chmod=+x", "script.sh"])
            .unwrap();
        commit_all(&git, "chmod");
        let after = tree_sha512(&git, "HEAD").unwrap();
        assert_eq!(before, after);
        let _ = dir;
    }

    #[test]
    fn matches_independently_computed_digest() {
        let (dir, git) = scratch_repo();
        write_and_add(&dir, &git, "b.txt", "bravo");
        write_and_add(&dir, &git, "a.txt", "alpha");
        commit_all(&git, "two files");

        // Recompute by hand: per-file SHA-512 over content, outer SHA-512
        // over "<hex>  <path>\n" in path byte order.
        let mut outer = Sha512::new();
        for (path, content) in [("a.txt", "alpha"), ("b.txt", "bravo")] {
            let inner = hex::encode(Sha512::digest(content.as_bytes()));
            outer.update(inner.as_bytes());
            outer.update(b"  ");
            outer.update(path.as_bytes());
            outer.update(b"\n");
        }
        let expected = hex::encode(outer.finalize());

        let actual = tree_sha512(&git, "HEAD").unwrap();
        assert_eq!(actual.as_hex(), expected);
        let _ = dir;
    }

    #[cfg(unix)]
    #[test]
    fn symlink_paths_finds_links() {
        let (dir, git) = scratch_repo();
        write_and_add(&dir, &git, "real.txt", "data");
        std::os::unix::fs::symlink("real.txt", dir.path().join("link")).unwrap();
        git.checked(&["add", "link"]).unwrap();
        commit_all(&git, "with symlink");

        let links = symlink_paths(&git, "HEAD").unwrap();
        assert_eq!(links, vec!["link".to_string()]);
    }

    #[test]
    fn clean_tree_has_no_symlinks() {
        let (dir, git) = scratch_repo();
        write_and_add(&dir, &git, "real.txt", "data");
        commit_all(&git, "plain");
        assert!(symlink_paths(&git, "HEAD").unwrap().is_empty());
        let _ = dir;
    }
}
