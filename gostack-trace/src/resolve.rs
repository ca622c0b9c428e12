//! Deduction of local filesystem paths for reported source locations.
//!
//! A traceback names paths as seen on the machine that produced it. This
//! pass probes the local filesystem to find where those files live on the
//! host: the standard library under a GOROOT, packages under GOPATH `src/`
//! or module caches under GOPATH `pkg/mod/`, and finally the main module's
//! own directory, identified by its `go.mod`/`go.sum` pair.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;

use gostack_common::{join_path, normalize_path, split_path};

use crate::model::{Call, Snapshot, AUTOGENERATED_SRC_PATH};

/// Length at which a `go.mod` read is capped. The `module` directive leads
/// the file in anything `go mod init` produced.
const GO_MOD_CAP: usize = 4096;

/// Finds the module line in a `go.mod` file, CRLF files included.
static MODULE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^module\s+([^\n\r]+)\r?$").unwrap());

/// Local directories to probe when mapping reported source paths.
#[derive(Clone, Debug, Default)]
pub struct SearchRoots {
    /// The host's Go installation root, `/`-separated, no trailing slash.
    /// Empty when unknown.
    pub goroot: String,
    /// The host's GOPATH entries, `/`-separated, no trailing slashes.
    pub gopaths: Vec<String>,
}

impl SearchRoots {
    /// Detects the host's roots from the `GOROOT`, `GOPATH` and `HOME`
    /// environment variables.
    ///
    /// `GOPATH` is split on the host's path-list separator and each entry is
    /// normalized to `/` separators. Without a `GOPATH`, the conventional
    /// default `$HOME/go` is used when the home directory is known.
    pub fn from_env() -> SearchRoots {
        let goroot = env::var("GOROOT")
            .map(|value| normalize_path(&value))
            .unwrap_or_default();

        let mut gopaths = Vec::new();
        if let Ok(gopath) = env::var("GOPATH") {
            for entry in env::split_paths(&gopath) {
                let entry = normalize_path(&entry.to_string_lossy());
                if !entry.is_empty() {
                    gopaths.push(entry);
                }
            }
        }
        if gopaths.is_empty() {
            if let Ok(home) = env::var("HOME") {
                let home = normalize_path(&home);
                if !home.is_empty() {
                    gopaths.push(format!("{home}/go"));
                }
            }
        }

        SearchRoots { goroot, gopaths }
    }
}

impl Snapshot {
    /// Probes the local filesystem to deduce the standard-library root and
    /// the module roots referenced by the trace, then annotates every call
    /// with its local source path and stdlib classification.
    ///
    /// Failed probes are never errors; paths that cannot be mapped are
    /// counted in [`unresolved_paths`](Snapshot::unresolved_paths). Running
    /// the pass again against an unchanged filesystem yields identical
    /// annotations.
    pub fn resolve_paths(&mut self, roots: &SearchRoots) {
        self.unresolved = self.find_roots(roots);

        let goroot = self.goroot.clone();
        let gomodule_root = self.gomodule_root.clone();
        let gopaths = self.gopaths.clone();

        for goroutine in &mut self.goroutines {
            let signature = &mut goroutine.signature;
            for call in signature
                .stack
                .calls
                .iter_mut()
                .chain(signature.created_by.calls.iter_mut())
            {
                update_location(
                    call,
                    goroot.as_deref(),
                    &roots.goroot,
                    gomodule_root.as_deref(),
                    &gopaths,
                );
            }
        }
        for op in self.races.values_mut() {
            for call in &mut op.created.calls {
                update_location(
                    call,
                    goroot.as_deref(),
                    &roots.goroot,
                    gomodule_root.as_deref(),
                    &gopaths,
                );
            }
        }
    }

    /// Detects the trace-side GOROOT, GOPATHs and main module root by
    /// probing the filesystem for each distinct source path. Returns the
    /// number of paths that matched nothing.
    fn find_roots(&mut self, roots: &SearchRoots) -> usize {
        let mut missing = 0;

        'files: for file in self.source_paths() {
            // These checks skip file I/O for roots already detected.
            if let Some(goroot) = &self.goroot {
                if file.starts_with(&format!("{goroot}/src/")) {
                    continue;
                }
            }
            if has_src_prefix(&file, &self.gopaths) {
                continue;
            }

            let parts = split_path(&file);

            if self.goroot.is_none() && !roots.goroot.is_empty() {
                if let Some(prefix) = rooted_in(&format!("{}/src", roots.goroot), &parts) {
                    if let Some(goroot) = prefix.strip_suffix("/src") {
                        self.goroot = Some(goroot.to_string());
                        continue 'files;
                    }
                }
            }

            let mut found = false;
            for local in &roots.gopaths {
                if let Some(prefix) = rooted_in(&format!("{local}/src"), &parts) {
                    if let Some(root) = prefix.strip_suffix("/src") {
                        self.gopaths.insert(root.to_string(), local.clone());
                        found = true;
                        break;
                    }
                }
                if let Some(prefix) = rooted_in(&format!("{local}/pkg/mod"), &parts) {
                    if let Some(root) = prefix.strip_suffix("/pkg/mod") {
                        self.gopaths.insert(root.to_string(), local.clone());
                        found = true;
                        break;
                    }
                }
            }

            if !found {
                // A path matching no search root is probably inside the main
                // module, whose checkout can be anywhere.
                if self.gomodule_root.is_none() && parts.len() > 1 {
                    if let Some((root, import_path)) = find_go_module(&parts[..parts.len() - 1]) {
                        self.gomodule_root = Some(root);
                        self.gomod_import_path = Some(import_path);
                    }
                }
                if let Some(root) = &self.gomodule_root {
                    if file.starts_with(&format!("{root}/")) {
                        continue;
                    }
                }
                missing += 1;
            }
        }

        missing
    }

    /// All distinct source paths in the snapshot, ordered.
    fn source_paths(&self) -> Vec<String> {
        let mut files = BTreeSet::new();
        for goroutine in &self.goroutines {
            let signature = &goroutine.signature;
            for call in signature
                .stack
                .calls
                .iter()
                .chain(signature.created_by.calls.iter())
            {
                if !call.src_path.is_empty() {
                    files.insert(call.src_path.clone());
                }
            }
        }
        for op in self.races.values() {
            for call in &op.created.calls {
                if !call.src_path.is_empty() {
                    files.insert(call.src_path.clone());
                }
            }
        }
        files.into_iter().collect()
    }
}

/// Rewrites one call with its local path and stdlib classification.
fn update_location(
    call: &mut Call,
    goroot: Option<&str>,
    local_goroot: &str,
    gomodule_root: Option<&str>,
    gopaths: &BTreeMap<String, String>,
) {
    if call.src_path.is_empty() {
        return;
    }
    if let Some(goroot) = goroot {
        if let Some(rest) = call.src_path.strip_prefix(&format!("{goroot}/src/")) {
            call.local_src_path = Some(format!("{local_goroot}/src/{rest}"));
        }
    }
    for (prefix, local) in gopaths {
        if let Some(rest) = call.src_path.strip_prefix(&format!("{prefix}/src/")) {
            call.local_src_path = Some(format!("{local}/src/{rest}"));
        }
        if let Some(rest) = call.src_path.strip_prefix(&format!("{prefix}/pkg/mod/")) {
            call.local_src_path = Some(format!("{local}/pkg/mod/{rest}"));
        }
    }
    if let Some(root) = gomodule_root {
        if call.src_path.starts_with(&format!("{root}/")) {
            // The trace was produced from this checkout; the reported path
            // is already local.
            call.local_src_path = Some(call.src_path.clone());
        }
    }
    call.is_stdlib = goroot.is_some_and(|g| call.src_path.starts_with(&format!("{g}/src/")))
        || call.src_path == AUTOGENERATED_SRC_PATH;
}

/// Returns `true` if the path is under the `src/` or `pkg/mod/` directory
/// of any already-detected root.
fn has_src_prefix(file: &str, gopaths: &BTreeMap<String, String>) -> bool {
    gopaths.keys().any(|prefix| {
        file.starts_with(&format!("{prefix}/src/"))
            || file.starts_with(&format!("{prefix}/pkg/mod/"))
    })
}

/// Returns the prefix of `parts` whose remaining suffix exists as a file
/// under `root`.
fn rooted_in(root: &str, parts: &[&str]) -> Option<String> {
    for i in 1..parts.len() {
        let suffix = parts[i..].join("/");
        if is_file(&join_path(root, &suffix)) {
            return Some(parts[..i].join("/"));
        }
    }
    None
}

/// Walks from the deepest directory upward, looking for a directory with a
/// `go.sum`/`go.mod` pair. Returns it and the module's declared import
/// path.
fn find_go_module(parts: &[&str]) -> Option<(String, String)> {
    for i in (1..=parts.len()).rev() {
        let prefix = parts[..i].join("/");
        if !is_file(&join_path(&prefix, "go.sum")) {
            continue;
        }
        let Some(contents) = read_go_mod(&join_path(&prefix, "go.mod")) else {
            continue;
        };
        if let Some(caps) = MODULE_LINE.captures(&contents) {
            return Some((prefix, caps[1].to_string()));
        }
    }
    None
}

fn read_go_mod(path: &str) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut contents = String::new();
    file.take(GO_MOD_CAP as u64)
        .read_to_string(&mut contents)
        .ok()?;
    Some(contents)
}

/// Returns `true` if the path names a regular file. This is the only place
/// the resolver touches OS-native path handling.
fn is_file(path: &str) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_rooted_in() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        fs::create_dir_all(root.join("runtime")).unwrap();
        File::create(root.join("runtime/panic.go")).unwrap();

        let root = format!("{}/src", normalize_path(&dir.path().to_string_lossy()));
        let parts = split_path("/build/go/src/runtime/panic.go");
        assert_eq!(rooted_in(&root, &parts), Some("/build/go/src".to_string()));

        let parts = split_path("/build/go/src/runtime/missing.go");
        assert_eq!(rooted_in(&root, &parts), None);
    }

    #[test]
    fn test_find_go_module() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("internal")).unwrap();
        File::create(root.join("go.sum")).unwrap();
        let mut gomod = File::create(root.join("go.mod")).unwrap();
        writeln!(gomod, "module example.com/proj").unwrap();
        writeln!(gomod, "\ngo 1.17").unwrap();

        let base = normalize_path(&root.to_string_lossy());
        let file = format!("{base}/internal/thing.go");
        let parts = split_path(&file);
        let (found_root, import_path) = find_go_module(&parts[..parts.len() - 1]).unwrap();
        assert_eq!(found_root, base);
        assert_eq!(import_path, "example.com/proj");
    }

    #[test]
    fn test_find_go_module_requires_go_sum() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(&root).unwrap();
        let mut gomod = File::create(root.join("go.mod")).unwrap();
        writeln!(gomod, "module example.com/proj").unwrap();

        let base = normalize_path(&root.to_string_lossy());
        let file = format!("{base}/thing.go");
        let parts = split_path(&file);
        assert_eq!(find_go_module(&parts[..parts.len() - 1]), None);
    }

    #[test]
    fn test_module_line_crlf() {
        let caps = MODULE_LINE
            .captures("module example.com/proj\r\n\r\ngo 1.17\r\n")
            .unwrap();
        assert_eq!(&caps[1], "example.com/proj");
    }
}
