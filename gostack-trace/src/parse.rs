//! Streaming recognizer for the Go runtime's panic and data-race output.
//!
//! The scanner tolerates arbitrary junk before, between and after the
//! recognized blocks; anything that is not part of a traceback is forwarded
//! to the caller's sink in input order.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ScanError, ScanErrorKind};
use crate::model::{Arg, Args, Call, Func, Goroutine, RaceAccess, RaceOp, Snapshot, Stack};
use crate::resolve::SearchRoots;
use crate::scan::LineScanner;

const LOCKED_TO_THREAD: &str = "locked to thread";
const FRAMES_ELIDED: &str = "...additional frames elided...";

// A data-race report is fenced by a bar line, followed by the warning.
const RACE_BAR: &str = "==================";
const RACE_WARNING: &str = "WARNING: DATA RACE";

static ROUTINE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)goroutine (\d+) \[([^\]]+)\]:$").unwrap());

static MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+) minutes$").unwrap());

static UNAVAILABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\t| +)goroutine running on other thread; stack unavailable$").unwrap()
});

// See gentraceback() in the runtime's traceback.go for the variations:
// `<autogenerated>` frames come from the compiler, `??` from cgo, the
// `+0x…` byte offset is omitted for generated code, and `fp=… sp=…` is
// appended when a signal was not handled cleanly. The indentation is a tab
// in the runtime's output, but copy-pasting commonly converts it to spaces.
static FILE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\t| +)(\?\?|<autogenerated>|.+\.(?:c|go|s)):(\d+)(?:| \+0x[0-9a-f]+)(?:| fp=0x[0-9a-f]+ sp=0x[0-9a-f]+(?:| pc=0x[0-9a-f]+))$",
    )
    .unwrap()
});

static CREATED_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^created by (.+)$").unwrap());

static FUNC_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+)\((.*)\)$").unwrap());

// The race report format is generated by ThreadSanitizer's Go-specific
// report path; see tsan_report.cpp in compiler-rt.
static RACE_OPERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Read|Write) at (0x[0-9a-f]+) by goroutine (\d+):$").unwrap());

static RACE_PREVIOUS_OPERATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Previous (read|write) at (0x[0-9a-f]+) by goroutine (\d+):$").unwrap()
});

static RACE_GOROUTINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Goroutine (\d+) \((running|finished)\) created at:$").unwrap());

/// Options for [`Snapshot::scan`].
#[derive(Clone, Debug, Default)]
pub struct ScanOpts {
    /// Whether to probe the local filesystem after parsing, filling in
    /// `local_src_path` and `is_stdlib` on every call. Probing reads the
    /// `GOROOT`, `GOPATH` and `HOME` environment variables and stats files
    /// named in the trace.
    pub guess_paths: bool,
}

/// Scanner state. Initial state is `Normal`; all other states are reached
/// once a traceback or race report has been detected.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum State {
    /// Outside any recognized block.
    #[default]
    Normal,

    /// An empty line between two goroutine blocks.
    BetweenRoutine,
    /// `goroutine 1 [running]:` was found.
    GotRoutineHeader,
    /// A function call line was found.
    GotFunc,
    /// `created by main.glob..func4` was found.
    GotCreated,
    /// The source location of the last function call was found.
    GotFileFunc,
    /// The source location of the creating call was found.
    GotFileCreated,
    /// The stack was running on another thread and is unavailable.
    GotUnavail,

    /// The opening `==================` bar was found.
    GotRaceHeader1,
    /// `WARNING: DATA RACE` was found.
    GotRaceHeader2,
    /// `Read at 0x… by goroutine 7:` was found.
    GotRaceOperationHeader,
    /// A function call inside a race operation stack was found.
    GotRaceOperationFunc,
    /// The source location of the last race operation call was found.
    GotRaceOperationFile,
    /// An empty line after a race operation stack.
    BetweenRaceOperations,
    /// `Goroutine 7 (running) created at:` was found.
    GotRaceGoroutineHeader,
    /// A function call inside a race creation stack was found.
    GotRaceGoroutineFunc,
    /// The source location of the last race creation call was found.
    GotRaceGoroutineFile,
    /// An empty line between race creation stacks.
    BetweenRaceGoroutines,
}

/// The scan in progress: the state machine position plus everything
/// collected so far.
#[derive(Debug, Default)]
struct ScanState {
    goroutines: Vec<Goroutine>,
    races: BTreeMap<u64, RaceOp>,

    state: State,
    /// The indentation prefix captured from the current goroutine header.
    /// Every line of the block must start with it.
    prefix: String,
    /// The goroutine whose race creation stack is being read.
    race_id: u64,
}

impl ScanState {
    /// Scans one segment, moving to the next state. Returns `true` when the
    /// segment is junk that must be echoed to the sink.
    fn scan_line(&mut self, segment: &[u8]) -> Result<bool, ScanError> {
        let Ok(text) = std::str::from_utf8(segment) else {
            // Binary junk can never match the grammar.
            return self.fallback(&String::from_utf8_lossy(segment));
        };

        let trimmed = if let Some(trimmed) = text.strip_suffix("\r\n") {
            trimmed
        } else if let Some(trimmed) = text.strip_suffix('\n') {
            trimmed
        } else if self.state == State::Normal {
            // Unterminated junk at end of stream, or a line longer than the
            // scanner's buffer.
            return Ok(true);
        } else {
            // The last line of the stream may still be parseable.
            text
        };

        let trimmed = if !trimmed.is_empty() && !self.prefix.is_empty() {
            match trimmed.strip_prefix(self.prefix.as_str()) {
                Some(rest) => rest,
                None => {
                    self.state = State::Normal;
                    self.prefix.clear();
                    return Err(ScanError::new(
                        ScanErrorKind::InconsistentIndentation,
                        trimmed,
                    ));
                }
            }
        } else {
            trimmed
        };

        match self.state {
            State::Normal | State::BetweenRoutine => {
                if let Some(caps) = ROUTINE_HEADER.captures(trimmed) {
                    let id = caps[2]
                        .parse()
                        .map_err(|_| ScanError::new(ScanErrorKind::InvalidNumber, trimmed))?;
                    // The descriptor is "<state>, \d+ minutes, locked to
                    // thread" with both suffixes optional.
                    let items: Vec<&str> = caps[3].split(", ").collect();
                    let mut sleep = 0;
                    let mut locked = false;
                    for item in &items[1..] {
                        if *item == LOCKED_TO_THREAD {
                            locked = true;
                            continue;
                        }
                        if let Some(minutes) = MINUTES.captures(item) {
                            sleep = minutes[1].parse().unwrap_or(0);
                        }
                    }
                    let mut goroutine = Goroutine {
                        id,
                        first: self.goroutines.is_empty(),
                        ..Goroutine::default()
                    };
                    goroutine.signature.state = items[0].to_string();
                    goroutine.signature.sleep_min = sleep;
                    goroutine.signature.sleep_max = sleep;
                    goroutine.signature.locked = locked;

                    if self.goroutines.capacity() == 0 {
                        self.goroutines.reserve(4);
                    }
                    self.goroutines.push(goroutine);
                    self.state = State::GotRoutineHeader;
                    self.prefix = caps[1].to_string();
                    return Ok(false);
                }
                // A race report can only open a snapshot; a bar showing up
                // after goroutines were parsed is passed through.
                if trimmed == RACE_BAR && self.goroutines.is_empty() {
                    self.state = State::GotRaceHeader1;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotRoutineHeader => {
                if UNAVAILABLE.is_match(trimmed) {
                    self.cur().signature.stack.calls = vec![Call::unavailable()];
                    self.state = State::GotUnavail;
                    return Ok(false);
                }
                if let Some(call) = parse_func(trimmed)? {
                    push_call(&mut self.cur().signature.stack.calls, call);
                    self.state = State::GotFunc;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotFunc => match parse_file(trimmed)? {
                Some((path, line)) => {
                    let call = self.cur_call();
                    call.src_path = path.to_string();
                    call.line = line;
                    self.state = State::GotFileFunc;
                    Ok(false)
                }
                None => self.fallback(trimmed),
            },

            State::GotCreated => match parse_file(trimmed)? {
                Some((path, line)) => {
                    let created = self
                        .cur()
                        .signature
                        .created_by
                        .calls
                        .last_mut()
                        .expect("created-by frame was pushed on the created-by line");
                    created.src_path = path.to_string();
                    created.line = line;
                    self.state = State::GotFileCreated;
                    Ok(false)
                }
                None => self.fallback(trimmed),
            },

            State::GotFileFunc => {
                if let Some(caps) = CREATED_BY.captures(trimmed) {
                    let func = Func::new(&caps[1]);
                    self.cur()
                        .signature
                        .created_by
                        .calls
                        .push(Call::new(func, Args::default(), "", 0));
                    self.state = State::GotCreated;
                    return Ok(false);
                }
                if trimmed == FRAMES_ELIDED {
                    self.cur().signature.stack.elided = true;
                    return Ok(false);
                }
                if let Some(call) = parse_func(trimmed)? {
                    push_call(&mut self.cur().signature.stack.calls, call);
                    self.state = State::GotFunc;
                    return Ok(false);
                }
                if trimmed.is_empty() {
                    self.end_routine();
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotFileCreated => {
                if trimmed.is_empty() {
                    self.end_routine();
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotUnavail => {
                if trimmed.is_empty() {
                    self.end_routine();
                    return Ok(false);
                }
                if let Some(caps) = CREATED_BY.captures(trimmed) {
                    let func = Func::new(&caps[1]);
                    self.cur()
                        .signature
                        .created_by
                        .calls
                        .push(Call::new(func, Args::default(), "", 0));
                    self.state = State::GotCreated;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotRaceHeader1 => {
                if trimmed == RACE_WARNING {
                    self.state = State::GotRaceHeader2;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotRaceHeader2 => {
                if let Some(caps) = RACE_OPERATION.captures(trimmed) {
                    let access = if &caps[1] == "Write" {
                        RaceAccess::Write
                    } else {
                        RaceAccess::Read
                    };
                    let (addr, id) = parse_race_operation(&caps[2], &caps[3], trimmed)?;
                    self.races.insert(
                        id,
                        RaceOp {
                            access,
                            addr,
                            id,
                            created: Stack::default(),
                        },
                    );
                    self.goroutines.push(Goroutine {
                        id,
                        first: true,
                        ..Goroutine::default()
                    });
                    self.race_id = id;
                    self.state = State::GotRaceOperationHeader;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotRaceOperationHeader => {
                if let Some(call) = parse_func(strip_indent(trimmed))? {
                    push_call(&mut self.cur().signature.stack.calls, call);
                    self.state = State::GotRaceOperationFunc;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::GotRaceOperationFunc => match parse_file(trimmed)? {
                Some((path, line)) => {
                    let call = self.cur_call();
                    call.src_path = path.to_string();
                    call.line = line;
                    self.state = State::GotRaceOperationFile;
                    Ok(false)
                }
                None => self.fallback(trimmed),
            },

            State::GotRaceOperationFile => {
                if trimmed.is_empty() {
                    self.state = State::BetweenRaceOperations;
                    return Ok(false);
                }
                if let Some(call) = parse_func(strip_indent(trimmed))? {
                    push_call(&mut self.cur().signature.stack.calls, call);
                    self.state = State::GotRaceOperationFunc;
                    return Ok(false);
                }
                self.fallback(trimmed)
            }

            State::BetweenRaceOperations => {
                if let Some(caps) = RACE_PREVIOUS_OPERATION.captures(trimmed) {
                    let access = if &caps[1] == "write" {
                        RaceAccess::Write
                    } else {
                        RaceAccess::Read
                    };
                    let (addr, id) = parse_race_operation(&caps[2], &caps[3], trimmed)?;
                    self.races.insert(
                        id,
                        RaceOp {
                            access,
                            addr,
                            id,
                            created: Stack::default(),
                        },
                    );
                    self.goroutines.push(Goroutine {
                        id,
                        ..Goroutine::default()
                    });
                    self.race_id = id;
                    self.state = State::GotRaceOperationHeader;
                    return Ok(false);
                }
                self.race_goroutine_header(trimmed)
            }

            State::BetweenRaceGoroutines => self.race_goroutine_header(trimmed),

            State::GotRaceGoroutineHeader => self.race_goroutine_func(trimmed),

            State::GotRaceGoroutineFunc => match parse_file(trimmed)? {
                Some((path, line)) => {
                    let call = self
                        .race_op()
                        .created
                        .calls
                        .last_mut()
                        .expect("race creation frame was pushed on the function line");
                    call.src_path = path.to_string();
                    call.line = line;
                    self.state = State::GotRaceGoroutineFile;
                    Ok(false)
                }
                None => self.fallback(trimmed),
            },

            State::GotRaceGoroutineFile => {
                if trimmed.is_empty() {
                    self.state = State::BetweenRaceGoroutines;
                    return Ok(false);
                }
                if trimmed == RACE_BAR {
                    // The report is complete.
                    self.state = State::Normal;
                    return Ok(false);
                }
                self.race_goroutine_func(trimmed)
            }
        }
    }

    /// Seals the current goroutine. Indentation tracking ends with the
    /// block; the next header captures its own prefix.
    fn end_routine(&mut self) {
        self.state = State::BetweenRoutine;
        self.prefix.clear();
    }

    /// Handles `Goroutine N (running) created at:` lines.
    fn race_goroutine_header(&mut self, trimmed: &str) -> Result<bool, ScanError> {
        if let Some(caps) = RACE_GOROUTINE.captures(trimmed) {
            let id = caps[1]
                .parse()
                .map_err(|_| ScanError::new(ScanErrorKind::InvalidNumber, trimmed))?;
            let Some(goroutine) = self.goroutines.iter_mut().find(|g| g.id == id) else {
                return Err(ScanError::new(ScanErrorKind::UnknownGoroutine, trimmed));
            };
            goroutine.signature.state = caps[2].to_string();
            self.race_id = id;
            self.state = State::GotRaceGoroutineHeader;
            return Ok(false);
        }
        self.fallback(trimmed)
    }

    /// Handles function call lines inside a race creation stack.
    fn race_goroutine_func(&mut self, trimmed: &str) -> Result<bool, ScanError> {
        if let Some(call) = parse_func(strip_indent(trimmed))? {
            push_call(&mut self.race_op().created.calls, call);
            self.state = State::GotRaceGoroutineFunc;
            return Ok(false);
        }
        self.fallback(trimmed)
    }

    /// Handles a line that cannot match any grammar element in the current
    /// state: either the end of the recognized block, or a broken trace.
    fn fallback(&mut self, line: &str) -> Result<bool, ScanError> {
        match self.state {
            State::Normal
            | State::BetweenRoutine
            | State::GotFileFunc
            | State::GotFileCreated
            | State::GotRaceHeader1
            | State::GotRaceHeader2 => {
                self.state = State::Normal;
                self.prefix.clear();
                Ok(true)
            }
            State::GotRoutineHeader => Err(ScanError::new(ScanErrorKind::ExpectedFunction, line)),
            State::GotFunc | State::GotRaceOperationFunc | State::GotRaceGoroutineFunc => {
                Err(ScanError::new(ScanErrorKind::ExpectedFile, line))
            }
            State::GotCreated => Err(ScanError::new(ScanErrorKind::ExpectedCreatedFile, line)),
            State::GotUnavail | State::GotRaceOperationFile => {
                Err(ScanError::new(ScanErrorKind::ExpectedEmptyLine, line))
            }
            State::GotRaceOperationHeader
            | State::GotRaceGoroutineHeader
            | State::GotRaceGoroutineFile => {
                Err(ScanError::new(ScanErrorKind::ExpectedRaceFunction, line))
            }
            State::BetweenRaceOperations | State::BetweenRaceGoroutines => {
                Err(ScanError::new(ScanErrorKind::ExpectedRaceHeader, line))
            }
        }
    }

    fn cur(&mut self) -> &mut Goroutine {
        self.goroutines
            .last_mut()
            .expect("a goroutine block is being parsed")
    }

    fn cur_call(&mut self) -> &mut Call {
        self.cur()
            .signature
            .stack
            .calls
            .last_mut()
            .expect("a frame is being parsed")
    }

    fn race_op(&mut self) -> &mut RaceOp {
        self.races
            .get_mut(&self.race_id)
            .expect("a race operation is being parsed")
    }

    fn into_snapshot(self) -> Option<Snapshot> {
        if self.goroutines.is_empty() {
            return None;
        }
        Some(Snapshot {
            goroutines: self.goroutines,
            races: self.races,
            ..Snapshot::default()
        })
    }
}

impl Snapshot {
    /// Scans the output of the Go runtime's crash handler from `input`.
    ///
    /// Anything not recognized as part of a panic traceback or data-race
    /// report is piped to `sink` in input order; a crash dump is normally
    /// preceded by the panic message, which comes out there.
    ///
    /// Returns `Ok(None)` when no goroutine header was found at all. End of
    /// stream is expected and never an error. On a fatal parse error the
    /// goroutines collected so far travel inside the returned
    /// [`ScanError`].
    ///
    /// With [`ScanOpts::guess_paths`] set, the filesystem is probed after
    /// parsing to fill in local paths; see
    /// [`resolve_paths`](Snapshot::resolve_paths).
    pub fn scan<R: Read, W: Write>(
        input: R,
        mut sink: W,
        opts: &ScanOpts,
    ) -> Result<Option<Snapshot>, ScanError> {
        let mut scanner = LineScanner::new(input);
        let mut scan = ScanState::default();

        loop {
            let segment = match scanner.next_segment() {
                Ok(Some(segment)) => segment,
                Ok(None) => break,
                Err(err) => return Err(ScanError::io(err).with_snapshot(scan.into_snapshot())),
            };
            match scan.scan_line(&segment) {
                Ok(false) => {}
                Ok(true) => {
                    if let Err(err) = sink.write_all(&segment) {
                        return Err(ScanError::io(err).with_snapshot(scan.into_snapshot()));
                    }
                }
                Err(err) => return Err(err.with_snapshot(scan.into_snapshot())),
            }
        }

        let mut snapshot = scan.into_snapshot();
        if opts.guess_paths {
            if let Some(snapshot) = snapshot.as_mut() {
                snapshot.resolve_paths(&SearchRoots::from_env());
            }
        }
        Ok(snapshot)
    }
}

fn strip_indent(line: &str) -> &str {
    line.trim_start_matches(['\t', ' '])
}

fn push_call(calls: &mut Vec<Call>, call: Call) {
    if calls.capacity() == 0 {
        calls.reserve(4);
    }
    calls.push(call);
}

fn parse_race_operation(
    addr: &str,
    id: &str,
    line: &str,
) -> Result<(u64, u64), ScanError> {
    let addr = parse_u64(addr).ok_or_else(|| ScanError::new(ScanErrorKind::InvalidAddress, line))?;
    let id = id
        .parse()
        .map_err(|_| ScanError::new(ScanErrorKind::InvalidNumber, line))?;
    Ok((addr, id))
}

/// Parses a `func(args)` line into a call with an empty source location.
///
/// Returns `Ok(None)` when the line is not a function call at all. A call
/// whose argument list fails to parse is discarded entirely.
fn parse_func(line: &str) -> Result<Option<Call>, ScanError> {
    let Some(caps) = FUNC_CALL.captures(line) else {
        return Ok(None);
    };

    let mut args = Args::default();
    for token in caps[2].split(", ") {
        if token == "..." {
            args.elided = true;
            break;
        }
        if token.is_empty() {
            // Remaining values were dropped by the runtime.
            break;
        }
        let value =
            parse_u64(token).ok_or_else(|| ScanError::new(ScanErrorKind::InvalidNumber, line))?;
        if args.values.capacity() == 0 {
            args.values.reserve(4);
        }
        args.values.push(Arg::new(value));
    }

    Ok(Some(Call::new(Func::new(&caps[1]), args, "", 0)))
}

/// Parses a source location line into its path and line number.
///
/// Returns `Ok(None)` when the line is not a source location.
fn parse_file(line: &str) -> Result<Option<(&str, u64)>, ScanError> {
    let Some(caps) = FILE_LOCATION.captures(line) else {
        return Ok(None);
    };
    let number = caps[2]
        .parse()
        .map_err(|_| ScanError::new(ScanErrorKind::InvalidNumber, line))?;
    Ok(Some((caps.get(1).map_or("", |m| m.as_str()), number)))
}

/// Parses an unsigned integer the way the runtime prints them: `0x` hex,
/// leading-zero octal, or decimal.
fn parse_u64(input: &str) -> Option<u64> {
    if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if input.len() > 1 && input.starts_with('0') {
        u64::from_str_radix(&input[1..], 8).ok()
    } else {
        input.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("0"), Some(0));
        assert_eq!(parse_u64("42"), Some(42));
        assert_eq!(parse_u64("0x2a"), Some(42));
        assert_eq!(parse_u64("052"), Some(42));
        assert_eq!(parse_u64("0xzz"), None);
        assert_eq!(parse_u64(""), None);
        assert_eq!(parse_u64("18446744073709551616"), None);
    }

    #[test]
    fn test_parse_func_no_args() {
        let call = parse_func("main.main()").unwrap().unwrap();
        assert_eq!(call.func.raw(), "main.main");
        assert_eq!(call.args, Args::default());
    }

    #[test]
    fn test_parse_func_args() {
        let call = parse_func("main.func·001(0x11000000, 2)").unwrap().unwrap();
        assert_eq!(call.args.values.len(), 2);
        assert_eq!(call.args.values[0].value, 0x11000000);
        assert!(call.args.values[0].is_ptr);
        assert_eq!(call.args.values[1].value, 2);
        assert!(!call.args.values[1].is_ptr);
    }

    #[test]
    fn test_parse_func_elided_args() {
        let call = parse_func("main.run(0x1, ...)").unwrap().unwrap();
        assert_eq!(call.args.values.len(), 1);
        assert!(call.args.elided);
    }

    #[test]
    fn test_parse_func_dropped_args() {
        let call = parse_func("main.run(0x1, )").unwrap().unwrap();
        assert_eq!(call.args.values.len(), 1);
        assert!(!call.args.elided);
    }

    #[test]
    fn test_parse_func_bad_arg() {
        let err = parse_func("main.run(zorg)").unwrap_err();
        assert_eq!(err.kind(), ScanErrorKind::InvalidNumber);
    }

    #[test]
    fn test_parse_func_not_a_call() {
        assert!(parse_func("created by main.run").unwrap().is_none());
        assert!(parse_func("").unwrap().is_none());
    }

    #[test]
    fn test_parse_file_variants() {
        for line in [
            "\t/app/main.go:12",
            "\t/app/main.go:12 +0x20",
            "    /app/main.go:12 +0x20",
            "\t/app/main.go:12 fp=0xc0000e4030 sp=0xc0000e4028",
            "\t/app/main.go:12 fp=0xc0000e4030 sp=0xc0000e4028 pc=0x45c7c5",
        ] {
            let (path, number) = parse_file(line).unwrap().expect(line);
            assert_eq!(path, "/app/main.go");
            assert_eq!(number, 12);
        }
    }

    #[test]
    fn test_parse_file_special_paths() {
        let (path, _) = parse_file("\t<autogenerated>:1").unwrap().unwrap();
        assert_eq!(path, "<autogenerated>");
        let (path, _) = parse_file("\t??:0").unwrap().unwrap();
        assert_eq!(path, "??");
        let (path, _) = parse_file("\t/usr/lib/go/src/runtime/asm_amd64.s:1571 +0x1").unwrap().unwrap();
        assert_eq!(path, "/usr/lib/go/src/runtime/asm_amd64.s");
    }

    #[test]
    fn test_parse_file_rejects() {
        assert!(parse_file("/app/main.go:12").unwrap().is_none());
        assert!(parse_file("\t/app/main.rs:12").unwrap().is_none());
        assert!(parse_file("\t/app/main.go").unwrap().is_none());
    }
}
