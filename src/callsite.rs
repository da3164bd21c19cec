use std::borrow::Cow;
use std::panic::Location;

/// Sentinel used for any part of a call site that could not be resolved.
pub const UNKNOWN: &str = "unknown";

/// Where a log call was written.
///
/// A call site is captured once, at the public entry point (usually via the
/// [`callsite!`](crate::callsite!) macro), and then passed down by value.
/// Nothing in the pipeline inspects the stack, so adding or removing a
/// wrapper between the caller and the formatter never shifts attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    function_path: &'static str,
    file: &'static str,
    line: u32,
}

/// A call site reduced to what ends up in the emitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCallSite {
    /// Enclosing function, closures collapsed to `<function>.closure`.
    pub function: Cow<'static, str>,
    /// Base name of the source file, without directories.
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// `function_path` is a full item path such as `my_app::server::run`.
    pub const fn new(function_path: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            function_path,
            file,
            line,
        }
    }

    /// A call site with nothing known about it.
    pub const fn unknown() -> Self {
        Self::new("", "", 0)
    }

    /// File and line of the caller. The function cannot be recovered this
    /// way and resolves to [`UNKNOWN`].
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new("", location.file(), location.line())
    }

    pub fn function_path(&self) -> &'static str {
        self.function_path
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn resolve(&self) -> ResolvedCallSite {
        let file = base_name(self.file);
        ResolvedCallSite {
            function: function_name(self.function_path),
            file: if file.is_empty() { UNKNOWN } else { file },
            line: self.line,
        }
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::unknown()
    }
}

/// File name without its directories; handles both separator styles.
pub fn base_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Human-readable function name for an item path.
///
/// The module path is dropped and anonymous closures are attributed to the
/// nearest named function:
///
/// - `app::server::run` becomes `run`
/// - `app::main::{{closure}}` becomes `main.closure`
/// - `app::<impl app::Server>::start::{{closure}}::{{closure}}` becomes
///   `start.closure.closure`
pub fn function_name(path: &str) -> Cow<'static, str> {
    let segments = split_path(path);

    let mut closures = 0usize;
    let mut named = None;
    for segment in segments.iter().rev() {
        match *segment {
            "{{closure}}" => closures += 1,
            s if s.is_empty() || s.starts_with('<') || s.starts_with("{{") => {}
            s => {
                named = Some(s);
                break;
            }
        }
    }

    let Some(named) = named else {
        return Cow::Borrowed(UNKNOWN);
    };

    let mut name = String::with_capacity(named.len() + closures * ".closure".len());
    name.push_str(named);
    for _ in 0..closures {
        name.push_str(".closure");
    }
    Cow::Owned(name)
}

// Splits on `::` outside of `<...>` so qualified impl segments stay whole.
fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if i == 0 || bytes[i - 1] != b'-' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&path[start..]);
    segments
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Capture the [`CallSite`] of the expansion point: enclosing function
/// path, `file!()` and `line!()`.
///
/// The body of an `async fn` is compiled as a closure, so inside one the
/// captured name is `<fn>.closure`. `callsite!(fn = "name")` names the
/// function explicitly and keeps only file and line from the expansion
/// point.
#[macro_export]
macro_rules! callsite {
    (fn = $name:expr) => {
        $crate::callsite::CallSite::new($name, file!(), line!())
    };
    () => {{
        fn __callsite() {}
        let path = $crate::callsite::type_name_of(__callsite);
        $crate::callsite::CallSite::new(
            path.strip_suffix("::__callsite").unwrap_or(path),
            file!(),
            line!(),
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_module_path() {
        assert_eq!(function_name("app::server::run"), "run");
        assert_eq!(function_name("main"), "main");
    }

    #[test]
    fn collapses_closures_to_enclosing_function() {
        assert_eq!(function_name("app::main::{{closure}}"), "main.closure");
        assert_eq!(
            function_name("app::<impl app::Server>::start::{{closure}}::{{closure}}"),
            "start.closure.closure"
        );
        assert_eq!(
            function_name("app::<impl core::ops::Fn<()> for app::X>::call"),
            "call"
        );
    }

    #[test]
    fn empty_path_is_unknown() {
        assert_eq!(function_name(""), UNKNOWN);
        assert_eq!(function_name("{{closure}}"), UNKNOWN);
    }

    #[test]
    fn base_name_drops_directories() {
        assert_eq!(base_name("src/bin/server.rs"), "server.rs");
        assert_eq!(base_name(r"C:\work\src\main.rs"), "main.rs");
        assert_eq!(base_name("lib.rs"), "lib.rs");
    }

    #[test]
    fn macro_captures_enclosing_function() {
        let site = crate::callsite!();
        let resolved = site.resolve();
        assert_eq!(resolved.function, "macro_captures_enclosing_function");
        assert_eq!(resolved.file, "callsite.rs");
        assert_eq!(resolved.line, line!() - 4);
    }

    #[test]
    fn macro_inside_closure_keeps_enclosing_name() {
        let capture = || crate::callsite!();
        let resolved = capture().resolve();
        assert_eq!(resolved.function, "macro_inside_closure_keeps_enclosing_name.closure");
    }

    #[test]
    fn explicit_name_replaces_enclosing_function() {
        let capture = || crate::callsite!(fn = "handle_order");
        let resolved = capture().resolve();
        assert_eq!(resolved.function, "handle_order");
        assert_eq!(resolved.file, "callsite.rs");
    }

    #[test]
    fn unknown_resolves_to_sentinels() {
        let resolved = CallSite::unknown().resolve();
        assert_eq!(resolved.function, UNKNOWN);
        assert_eq!(resolved.file, UNKNOWN);
        assert_eq!(resolved.line, 0);
    }

    #[test]
    fn caller_knows_file_but_not_function() {
        let resolved = CallSite::caller().resolve();
        assert_eq!(resolved.function, UNKNOWN);
        assert_eq!(resolved.file, "callsite.rs");
    }
}
