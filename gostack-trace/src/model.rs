//! The typed model of a parsed crash snapshot.

use std::collections::BTreeMap;
use std::fmt;

use gostack_common::{decode_escapes, file_name};

/// Lowest value an argument can take to be considered a pointer by the
/// display heuristic.
pub const POINTER_FLOOR: u64 = 16 * 1024 * 1024;

/// Highest value an argument can take to be considered a pointer by the
/// display heuristic.
#[cfg(target_pointer_width = "64")]
pub const POINTER_CEILING: u64 = u64::MAX;

/// Highest value an argument can take to be considered a pointer by the
/// display heuristic.
#[cfg(not(target_pointer_width = "64"))]
pub const POINTER_CEILING: u64 = u32::MAX as u64;

/// Source path recorded for the synthetic frame of a goroutine whose stack
/// was running on another thread and could not be captured.
pub const UNAVAILABLE_SRC_PATH: &str = "<unavailable>";

/// Source path the compiler reports for autogenerated wrapper functions.
pub const AUTOGENERATED_SRC_PATH: &str = "<autogenerated>";

/// A function reference as printed by the runtime.
///
/// The raw dotted form is kept verbatim; the accessors derive the package
/// and symbol views used for display, decoding the `%xx` escapes the
/// compiler embeds for special characters.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Func {
    raw: String,
}

impl Func {
    /// Creates a function reference from the raw dotted symbol path.
    pub fn new(raw: impl Into<String>) -> Func {
        Func { raw: raw.into() }
    }

    /// The symbol path exactly as the runtime printed it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The part of the symbol after the last `/`.
    fn base(&self) -> &str {
        match self.raw.rfind('/') {
            Some(index) => &self.raw[index + 1..],
            None => &self.raw,
        }
    }

    /// The decoded package name, or an empty string for an unqualified
    /// symbol.
    pub fn pkg_name(&self) -> String {
        match self.base().split_once('.') {
            Some((pkg, _)) => decode_escapes(pkg).into_owned(),
            None => String::new(),
        }
    }

    /// The decoded symbol name without its package, e.g. `(*File).Close`.
    pub fn name(&self) -> String {
        let base = self.base();
        let name = match base.split_once('.') {
            Some((_, name)) => name,
            None => base,
        };
        decode_escapes(name).into_owned()
    }

    /// The decoded `package.symbol` form used for display.
    pub fn pkg_dot_name(&self) -> String {
        let pkg = self.pkg_name();
        let name = self.name();
        if pkg.is_empty() {
            name
        } else {
            format!("{pkg}.{name}")
        }
    }

    /// Returns `true` if the symbol is exported.
    ///
    /// The first code point of the last dot-separated part of the decoded
    /// symbol name decides, so methods on both value and pointer receivers
    /// are classified by the method name. `main.main` counts as exported,
    /// being the entry point.
    pub fn is_exported(&self) -> bool {
        let name = self.name();
        let last = name.rsplit('.').next().unwrap_or(&name);
        if last.chars().next().is_some_and(char::is_uppercase) {
            return true;
        }
        name == "main" && self.pkg_name() == "main"
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&decode_escapes(&self.raw))
    }
}

/// One value in a call's argument list.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arg {
    /// The value as reported by the runtime.
    pub value: u64,
    /// Whether the value falls within the heuristic pointer range.
    pub is_ptr: bool,
    /// Display name assigned by an aggregator. Never set by the parser.
    pub name: Option<String>,
}

impl Arg {
    /// Creates an argument, classifying it with the pointer heuristic.
    pub fn new(value: u64) -> Arg {
        Arg {
            value,
            is_ptr: value > POINTER_FLOOR && value < POINTER_CEILING,
            name: None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)
        } else if self.is_ptr {
            write!(f, "{:#x}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// The argument list of a call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Args {
    /// The individual values, in the order printed.
    pub values: Vec<Arg>,
    /// Whether the runtime truncated the list with `...`.
    pub elided: bool,
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        if self.elided {
            if !self.values.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("…")?;
        }
        Ok(())
    }
}

/// A single stack frame.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Call {
    /// The function that was called.
    pub func: Func,
    /// The argument values, as far as the runtime printed them.
    pub args: Args,
    /// The source path as reported by the runtime. May be
    /// [`AUTOGENERATED_SRC_PATH`] or `??` for cgo frames.
    pub src_path: String,
    /// One-based line number within `src_path`.
    pub line: u64,
    /// The path to the source file on the local machine, once resolved.
    pub local_src_path: Option<String>,
    /// Whether the frame is in the standard library, once resolved.
    pub is_stdlib: bool,
}

impl Call {
    /// Creates a frame from its parsed parts.
    pub fn new(func: Func, args: Args, src_path: impl Into<String>, line: u64) -> Call {
        Call {
            func,
            args,
            src_path: src_path.into(),
            line,
            local_src_path: None,
            is_stdlib: false,
        }
    }

    /// The synthetic frame standing in for an uncapturable stack.
    pub(crate) fn unavailable() -> Call {
        Call {
            src_path: UNAVAILABLE_SRC_PATH.into(),
            ..Call::default()
        }
    }

    /// The file name of the source path, without its directory.
    pub fn src_name(&self) -> &str {
        file_name(&self.src_path)
    }

    /// Returns `true` if the function lives in the `main` package.
    pub fn is_pkg_main(&self) -> bool {
        self.func.pkg_name() == "main"
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}({})",
            self.src_name(),
            self.line,
            self.func.pkg_dot_name(),
            self.args
        )
    }
}

/// An ordered sequence of calls, innermost first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stack {
    /// The calls, in the order printed by the runtime.
    pub calls: Vec<Call>,
    /// Whether the runtime elided additional frames.
    pub elided: bool,
}

impl Stack {
    /// Writes the stack back out in the runtime's traceback grammar.
    fn write_canonical(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for call in &self.calls {
            write_canonical_frame(f, call)?;
        }
        if self.elided {
            writeln!(f, "...additional frames elided...")?;
        }
        Ok(())
    }
}

fn write_canonical_frame(f: &mut fmt::Formatter<'_>, call: &Call) -> fmt::Result {
    write!(f, "{}(", call.func.raw())?;
    for (i, arg) in call.args.values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if arg.is_ptr {
            write!(f, "{:#x}", arg.value)?;
        } else {
            write!(f, "{}", arg.value)?;
        }
    }
    if call.args.elided {
        if !call.args.values.is_empty() {
            f.write_str(", ")?;
        }
        f.write_str("...")?;
    }
    writeln!(f, ")")?;
    writeln!(f, "\t{}:{}", call.src_path, call.line)
}

/// The stack shape of a goroutine, used as an aggregation key.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    /// The wait state, e.g. `running` or `chan receive`.
    pub state: String,
    /// The single frame that spawned the goroutine, when the runtime
    /// printed one. Holds at most one call.
    pub created_by: Stack,
    /// Wait duration in minutes. Equal to `sleep_max` at parse time;
    /// aggregation may widen the range.
    pub sleep_min: u32,
    /// Wait duration in minutes.
    pub sleep_max: u32,
    /// Whether the goroutine is locked to an OS thread.
    pub locked: bool,
    /// The captured call stack.
    pub stack: Stack,
}

/// One goroutine found in the traceback.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Goroutine {
    /// The stack and scheduling state.
    pub signature: Signature,
    /// The goroutine ID. Not guaranteed unique across a snapshot on
    /// historical runtimes.
    pub id: u64,
    /// Whether this was the first goroutine printed, conventionally the
    /// panicking one.
    pub first: bool,
}

impl fmt::Display for Goroutine {
    /// Writes the goroutine back out in the runtime's traceback grammar.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = &self.signature;
        write!(f, "goroutine {} [{}", self.id, sig.state)?;
        if sig.sleep_min > 0 {
            write!(f, ", {} minutes", sig.sleep_min)?;
        }
        if sig.locked {
            f.write_str(", locked to thread")?;
        }
        writeln!(f, "]:")?;

        if sig.stack.calls.len() == 1 && sig.stack.calls[0].src_path == UNAVAILABLE_SRC_PATH {
            writeln!(f, "\tgoroutine running on other thread; stack unavailable")?;
        } else {
            sig.stack.write_canonical(f)?;
        }
        if let Some(created) = sig.created_by.calls.first() {
            writeln!(f, "created by {}", created.func.raw())?;
            writeln!(f, "\t{}:{}", created.src_path, created.line)?;
        }
        Ok(())
    }
}

/// The direction of a racing memory access.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RaceAccess {
    /// The goroutine read the address.
    Read,
    /// The goroutine wrote the address.
    Write,
}

impl fmt::Display for RaceAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceAccess::Read => f.write_str("read"),
            RaceAccess::Write => f.write_str("write"),
        }
    }
}

/// One side of a detected data race.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceOp {
    /// Whether the access was a read or a write.
    pub access: RaceAccess,
    /// The racy address.
    pub addr: u64,
    /// The goroutine that performed the access.
    pub id: u64,
    /// Where the goroutine was created.
    pub created: Stack,
}

/// The parsed model of one crash dump.
///
/// Produced by [`Snapshot::scan`](crate::Snapshot::scan); enriched in place
/// by [`Snapshot::resolve_paths`](crate::Snapshot::resolve_paths).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// The goroutines, in the order they were printed.
    pub goroutines: Vec<Goroutine>,
    /// For data-race reports, the racing accesses keyed by goroutine ID.
    pub races: BTreeMap<u64, RaceOp>,

    pub(crate) goroot: Option<String>,
    pub(crate) gopaths: BTreeMap<String, String>,
    pub(crate) gomodule_root: Option<String>,
    pub(crate) gomod_import_path: Option<String>,
    pub(crate) unresolved: usize,
}

impl Snapshot {
    /// The standard-library root as seen in the traceback, once detected by
    /// path resolution. This is the GOROOT of the machine that produced the
    /// trace, not of the host.
    pub fn goroot(&self) -> Option<&str> {
        self.goroot.as_deref()
    }

    /// Module search roots as seen in the traceback, mapped to the local
    /// directories they correspond to. In the common case this holds a
    /// single entry.
    pub fn gopaths(&self) -> &BTreeMap<String, String> {
        &self.gopaths
    }

    /// The local directory containing the `go.mod`/`go.sum` pair of the
    /// main module, when the trace was produced on this machine.
    pub fn gomodule_root(&self) -> Option<&str> {
        self.gomodule_root.as_deref()
    }

    /// The import path declared by the main module's `go.mod`.
    pub fn gomod_import_path(&self) -> Option<&str> {
        self.gomod_import_path.as_deref()
    }

    /// Number of distinct source paths that could not be mapped to a local
    /// file by the last [`resolve_paths`](crate::Snapshot::resolve_paths)
    /// pass.
    pub fn unresolved_paths(&self) -> usize {
        self.unresolved
    }
}

impl fmt::Display for Snapshot {
    /// Writes the goroutines back out in the runtime's traceback grammar.
    ///
    /// Race reports are not re-emitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for goroutine in &self.goroutines {
            write!(f, "{goroutine}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}
