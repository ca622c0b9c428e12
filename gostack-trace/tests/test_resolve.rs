use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use similar_asserts::assert_eq;
use tempfile::TempDir;

use gostack_trace::{ScanOpts, SearchRoots, Snapshot};

fn scan(input: &str) -> Snapshot {
    let mut junk = Vec::new();
    Snapshot::scan(input.as_bytes(), &mut junk, &ScanOpts::default())
        .expect("the input is well-formed")
        .expect("the input contains a traceback")
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    File::create(path).unwrap();
}

/// A fake Go installation with a standard library file, plus a GOPATH with
/// one package in `src/` and one module in `pkg/mod/`.
fn fake_host(dir: &TempDir) -> SearchRoots {
    let goroot = dir.path().join("goroot");
    touch(&goroot.join("src/runtime/panic.go"));

    let gopath = dir.path().join("gopath");
    touch(&gopath.join("src/github.com/user/proj/main.go"));
    touch(&gopath.join("pkg/mod/example.com/dep@v1.2.3/dep.go"));

    SearchRoots {
        goroot: slash_path(&goroot),
        gopaths: vec![slash_path(&gopath)],
    }
}

#[test]
fn test_detects_goroot() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 1 [running]:\n\
         runtime.gopanic()\n\
         \t/remote/go/src/runtime/panic.go:221 +0x1be\n",
    );
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot.goroot(), Some("/remote/go"));
    assert_eq!(snapshot.unresolved_paths(), 0);

    let call = &snapshot.goroutines[0].signature.stack.calls[0];
    assert!(call.is_stdlib);
    assert_eq!(
        call.local_src_path.as_deref(),
        Some(format!("{}/src/runtime/panic.go", roots.goroot).as_str())
    );
}

#[test]
fn test_detects_gopath_src() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 1 [running]:\n\
         github.com/user/proj.Run()\n\
         \t/home/user/go/src/github.com/user/proj/main.go:42 +0x1\n",
    );
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot.unresolved_paths(), 0);
    assert_eq!(
        snapshot.gopaths().get("/home/user/go"),
        Some(&roots.gopaths[0])
    );

    let call = &snapshot.goroutines[0].signature.stack.calls[0];
    assert!(!call.is_stdlib);
    assert_eq!(
        call.local_src_path.as_deref(),
        Some(format!("{}/src/github.com/user/proj/main.go", roots.gopaths[0]).as_str())
    );
}

#[test]
fn test_detects_module_cache() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 1 [running]:\n\
         example.com/dep.Work()\n\
         \t/home/user/go/pkg/mod/example.com/dep@v1.2.3/dep.go:7 +0x1\n",
    );
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot.unresolved_paths(), 0);
    let call = &snapshot.goroutines[0].signature.stack.calls[0];
    assert_eq!(
        call.local_src_path.as_deref(),
        Some(format!("{}/pkg/mod/example.com/dep@v1.2.3/dep.go", roots.gopaths[0]).as_str())
    );
}

#[test]
fn test_detects_local_module() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let project = dir.path().join("checkout/proj");
    fs::create_dir_all(project.join("internal")).unwrap();
    File::create(project.join("go.sum")).unwrap();
    let mut gomod = File::create(project.join("go.mod")).unwrap();
    writeln!(gomod, "module example.com/proj").unwrap();
    writeln!(gomod).unwrap();
    writeln!(gomod, "go 1.17").unwrap();

    let base = slash_path(&project);
    let mut snapshot = scan(&format!(
        "goroutine 1 [running]:\n\
         example.com/proj/internal.Boom()\n\
         \t{base}/internal/boom.go:9 +0x1\n"
    ));
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot.unresolved_paths(), 0);
    assert_eq!(snapshot.gomodule_root(), Some(base.as_str()));
    assert_eq!(snapshot.gomod_import_path(), Some("example.com/proj"));

    let call = &snapshot.goroutines[0].signature.stack.calls[0];
    assert!(!call.is_stdlib);
    assert_eq!(
        call.local_src_path.as_deref(),
        Some(format!("{base}/internal/boom.go").as_str())
    );
}

#[test]
fn test_counts_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 1 [running]:\n\
         main.main()\n\
         \t/nowhere/main.go:1 +0x1\n",
    );
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot.unresolved_paths(), 1);
    let call = &snapshot.goroutines[0].signature.stack.calls[0];
    assert_eq!(call.local_src_path, None);
    assert!(!call.is_stdlib);
}

#[test]
fn test_autogenerated_is_stdlib() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 1 [running]:\n\
         main.init()\n\
         \t<autogenerated>:1 +0x1\n",
    );
    snapshot.resolve_paths(&roots);

    let call = &snapshot.goroutines[0].signature.stack.calls[0];
    assert!(call.is_stdlib);
    assert_eq!(call.local_src_path, None);
}

#[test]
fn test_resolves_created_by() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 18 [chan receive]:\n\
         runtime.gopanic()\n\
         \t/remote/go/src/runtime/panic.go:221 +0x1be\n\
         created by github.com/user/proj.Run\n\
         \t/home/user/go/src/github.com/user/proj/main.go:42 +0x6b\n",
    );
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot.unresolved_paths(), 0);
    let created = &snapshot.goroutines[0].signature.created_by.calls[0];
    assert!(!created.is_stdlib);
    assert_eq!(
        created.local_src_path.as_deref(),
        Some(format!("{}/src/github.com/user/proj/main.go", roots.gopaths[0]).as_str())
    );
}

#[test]
fn test_resolve_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let roots = fake_host(&dir);

    let mut snapshot = scan(
        "goroutine 1 [running]:\n\
         runtime.gopanic()\n\
         \t/remote/go/src/runtime/panic.go:221 +0x1be\n\
         github.com/user/proj.Run()\n\
         \t/home/user/go/src/github.com/user/proj/main.go:42 +0x1\n\
         main.missing()\n\
         \t/nowhere/main.go:1 +0x1\n",
    );
    snapshot.resolve_paths(&roots);
    let once = snapshot.clone();
    snapshot.resolve_paths(&roots);

    assert_eq!(snapshot, once);
}
