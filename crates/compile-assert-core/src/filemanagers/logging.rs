//! A file manager that logs every call made against another file manager.
//!
//! Useful for diagnosing hard-to-find failures produced by a compiler during
//! testing. Capturing stack traces adds noticeable overhead, so it is opt-in.
//!
//! Every forwarded operation runs through [`LoggingFileManager::intercept`]:
//! 1. bump this thread's call depth for the delegate,
//! 2. log the entry line (with the call-site stack when enabled),
//! 3. forward the call to the wrapped manager,
//! 4. log the return value, completion, or unwrapped failure,
//! 5. restore the call depth on every exit path, unwinding included.
//!
//! `Display` is answered directly and never logged.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::LoggingMode;
use crate::container::{
    Container, FileKind, FileObject, ModuleContainerGroup, OutputContainerGroup,
    PackageContainerGroup,
};
use crate::error::{Result, unwrap_dispatch_failure};
use crate::filemanagers::FileManager;
use crate::filemanagers::call_log::{CallEvent, CallEventKind, CallSink, TracingSink};
use crate::location::Location;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
    /// In-flight call depth per delegate instance on this thread.
    static CALL_DEPTHS: RefCell<HashMap<u64, u32>> = RefCell::new(HashMap::new());
}

fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

fn increment_depth(instance: u64) -> u32 {
    CALL_DEPTHS.with(|depths| {
        let mut depths = depths.borrow_mut();
        let depth = depths.entry(instance).or_insert(0);
        *depth += 1;
        *depth
    })
}

fn decrement_depth(instance: u64) {
    // `try_with`: frames may still be unwinding during thread teardown.
    let _ = CALL_DEPTHS.try_with(|depths| {
        let mut depths = depths.borrow_mut();
        if let Some(depth) = depths.get_mut(&instance) {
            *depth = depth.saturating_sub(1);
            if *depth == 0 {
                depths.remove(&instance);
            }
        }
    });
}

fn current_depth(instance: u64) -> u32 {
    CALL_DEPTHS
        .try_with(|depths| depths.borrow().get(&instance).copied().unwrap_or(0))
        .unwrap_or(0)
}

/// Static description of one [`FileManager`] operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub param_types: &'static [&'static str],
    pub return_type: &'static str,
}

impl Operation {
    const VOID: &'static str = "()";

    #[must_use]
    pub const fn new(
        name: &'static str,
        param_types: &'static [&'static str],
        return_type: &'static str,
    ) -> Self {
        Self {
            name,
            param_types,
            return_type,
        }
    }

    #[must_use]
    pub const fn void(name: &'static str, param_types: &'static [&'static str]) -> Self {
        Self::new(name, param_types, Self::VOID)
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.return_type == Self::VOID
    }

    /// Parameter types joined in declaration order.
    #[must_use]
    pub fn param_list(&self) -> String {
        self.param_types.join(", ")
    }
}

mod ops {
    use super::Operation;

    pub const ADD_CONTAINER: Operation =
        Operation::void("add_container", &["&Location", "Arc<Container>"]);
    pub const ADD_MODULE_CONTAINER: Operation = Operation::void(
        "add_module_container",
        &["&Location", "&str", "Arc<Container>"],
    );
    pub const CREATE_EMPTY_LOCATION: Operation =
        Operation::void("create_empty_location", &["&Location"]);
    pub const HAS_LOCATION: Operation = Operation::new("has_location", &["&Location"], "bool");
    pub const CONTAINS: Operation = Operation::new("contains", &["&Location", "&str"], "bool");
    pub const GET_PACKAGE_CONTAINER_GROUP: Operation = Operation::new(
        "get_package_container_group",
        &["&Location"],
        "Option<PackageContainerGroup>",
    );
    pub const GET_MODULE_CONTAINER_GROUP: Operation = Operation::new(
        "get_module_container_group",
        &["&Location"],
        "Option<ModuleContainerGroup>",
    );
    pub const GET_OUTPUT_CONTAINER_GROUP: Operation = Operation::new(
        "get_output_container_group",
        &["&Location"],
        "Option<OutputContainerGroup>",
    );
    pub const GET_PACKAGE_CONTAINER_GROUPS: Operation = Operation::new(
        "get_package_container_groups",
        &[],
        "Vec<PackageContainerGroup>",
    );
    pub const LIST: Operation = Operation::new(
        "list",
        &["&Location", "&str", "&[FileKind]", "bool"],
        "Vec<FileObject>",
    );
    pub const GET_FILE_FOR_INPUT: Operation = Operation::new(
        "get_file_for_input",
        &["&Location", "&str", "&str"],
        "Option<FileObject>",
    );
    pub const WRITE_FILE: Operation = Operation::new(
        "write_file",
        &["&Location", "&str", "&str", "&[u8]"],
        "FileObject",
    );
    pub const READ_FILE: Operation = Operation::new("read_file", &["&FileObject"], "Vec<u8>");
    pub const INFER_BINARY_NAME: Operation = Operation::new(
        "infer_binary_name",
        &["&Location", "&FileObject"],
        "Option<String>",
    );
    pub const EFFECTIVE_RELEASE: Operation = Operation::new("effective_release", &[], "String");
    pub const FLUSH: Operation = Operation::void("flush", &[]);
    pub const CLOSE: Operation = Operation::void("close", &[]);
}

/// Renders byte payloads by size only, in arguments and results alike.
struct ByteLen<B>(B);

impl<B: AsRef<[u8]>> fmt::Debug for ByteLen<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} bytes>", self.0.as_ref().len())
    }
}

/// Renders an argument through its `Display` impl.
struct Shown<'a, T: ?Sized>(&'a T);

impl<T: fmt::Display + ?Sized> fmt::Debug for Shown<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

fn render_arguments(args: &[&dyn fmt::Debug]) -> String {
    args.iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn capture_stack_trace() -> String {
    format_stack_trace(&Backtrace::force_capture().to_string())
}

/// One `\n\t`-prefixed line per frame; source positions stay with their frame.
fn format_stack_trace(rendered: &str) -> String {
    let mut frames: Vec<String> = Vec::new();
    for line in rendered.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match frames.last_mut() {
            Some(frame) if line.starts_with("at ") => {
                frame.push(' ');
                frame.push_str(line);
            }
            _ => frames.push(line.to_string()),
        }
    }
    frames.iter().map(|frame| format!("\n\t{frame}")).collect()
}

/// One in-flight intercepted call. Dropping it restores the depth counter.
struct CallFrame<'a> {
    sink: &'a dyn CallSink,
    operation: &'static Operation,
    instance: u64,
    thread: u64,
    depth: u32,
    finished: bool,
}

impl<'a> CallFrame<'a> {
    fn enter(
        sink: &'a dyn CallSink,
        instance: u64,
        stack_traces: bool,
        operation: &'static Operation,
        args: &[&dyn fmt::Debug],
    ) -> Self {
        let frame = Self {
            sink,
            operation,
            instance,
            thread: current_thread_id(),
            depth: increment_depth(instance),
            finished: false,
        };

        if sink.enabled(CallEventKind::Entry.level()) {
            let mut event = frame.event(CallEventKind::Entry);
            event.arguments = Some(render_arguments(args));
            event.stack_trace = stack_traces.then(capture_stack_trace);
            sink.record(event);
        }
        frame
    }

    fn event(&self, kind: CallEventKind) -> CallEvent {
        CallEvent {
            kind,
            thread: self.thread,
            depth: self.depth,
            return_type: self.operation.return_type.to_string(),
            operation: self.operation.name.to_string(),
            param_types: self.operation.param_list(),
            arguments: None,
            stack_trace: None,
            result: None,
            error: None,
        }
    }

    fn returned<T: fmt::Debug>(mut self, value: &T) {
        self.finished = true;
        let kind = if self.operation.is_void() {
            CallEventKind::ExitVoid
        } else {
            CallEventKind::ExitNormal
        };
        if self.sink.enabled(kind.level()) {
            let mut event = self.event(kind);
            if kind == CallEventKind::ExitNormal {
                event.result = Some(format!("{value:?}"));
            }
            self.sink.record(event);
        }
    }

    fn threw(mut self, error: &dyn fmt::Display) {
        self.finished = true;
        self.record_failure(error.to_string());
    }

    fn record_failure(&self, error: String) {
        if self.sink.enabled(CallEventKind::ExitExceptional.level()) {
            let mut event = self.event(CallEventKind::ExitExceptional);
            event.error = Some(error);
            self.sink.record(event);
        }
    }
}

impl Drop for CallFrame<'_> {
    fn drop(&mut self) {
        if !self.finished && std::thread::panicking() {
            self.record_failure(format!("panicked in `{}`", self.operation.name));
        }
        decrement_depth(self.instance);
    }
}

/// A [`FileManager`] that logs every call before forwarding it unchanged to
/// the manager it wraps.
///
/// The wrapped manager is owned by the delegate; whoever owns the delegate is
/// responsible for calling [`FileManager::close`].
pub struct LoggingFileManager<F> {
    inner: F,
    stack_traces: bool,
    sink: Arc<dyn CallSink>,
    instance: u64,
}

impl<F: FileManager> LoggingFileManager<F> {
    /// Wrap `inner`, logging through `tracing`.
    #[must_use]
    pub fn wrap(inner: F, stack_traces: bool) -> Self {
        Self::with_sink(inner, stack_traces, Arc::new(TracingSink))
    }

    /// Wrap `inner`, recording events into `sink`.
    #[must_use]
    pub fn with_sink(inner: F, stack_traces: bool, sink: Arc<dyn CallSink>) -> Self {
        Self {
            inner,
            stack_traces,
            sink,
            instance: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &F {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> F {
        self.inner
    }

    #[must_use]
    pub fn stack_traces(&self) -> bool {
        self.stack_traces
    }

    /// Calls currently in flight through this delegate on the calling thread.
    #[must_use]
    pub fn current_depth(&self) -> u32 {
        current_depth(self.instance)
    }

    fn enter(&self, operation: &'static Operation, args: &[&dyn fmt::Debug]) -> CallFrame<'_> {
        CallFrame::enter(
            self.sink.as_ref(),
            self.instance,
            self.stack_traces,
            operation,
            args,
        )
    }

    /// Forward a fallible call, logging it and unwrapping dispatch failures.
    pub fn intercept<T: fmt::Debug>(
        &self,
        operation: &'static Operation,
        args: &[&dyn fmt::Debug],
        call: impl FnOnce(&F) -> Result<T>,
    ) -> Result<T> {
        let frame = self.enter(operation, args);
        match call(&self.inner) {
            Ok(value) => {
                frame.returned(&value);
                Ok(value)
            }
            Err(err) => {
                let err = unwrap_dispatch_failure(err);
                frame.threw(&err);
                Err(err)
            }
        }
    }

    fn intercept_infallible<T: fmt::Debug>(
        &self,
        operation: &'static Operation,
        args: &[&dyn fmt::Debug],
        call: impl FnOnce(&F) -> T,
    ) -> T {
        let frame = self.enter(operation, args);
        let value = call(&self.inner);
        frame.returned(&value);
        value
    }
}

impl<F: FileManager> FileManager for LoggingFileManager<F> {
    fn add_container(&self, location: &Location, container: Arc<Container>) -> Result<()> {
        self.intercept(&ops::ADD_CONTAINER, &[&Shown(location), &container], |inner| {
            inner.add_container(location, Arc::clone(&container))
        })
    }

    fn add_module_container(
        &self,
        location: &Location,
        module_name: &str,
        container: Arc<Container>,
    ) -> Result<()> {
        self.intercept(
            &ops::ADD_MODULE_CONTAINER,
            &[&Shown(location), &module_name, &container],
            |inner| inner.add_module_container(location, module_name, Arc::clone(&container)),
        )
    }

    fn create_empty_location(&self, location: &Location) -> Result<()> {
        self.intercept(&ops::CREATE_EMPTY_LOCATION, &[&Shown(location)], |inner| {
            inner.create_empty_location(location)
        })
    }

    fn has_location(&self, location: &Location) -> bool {
        self.intercept_infallible(&ops::HAS_LOCATION, &[&Shown(location)], |inner| {
            inner.has_location(location)
        })
    }

    fn contains(&self, location: &Location, path: &str) -> Result<bool> {
        self.intercept(&ops::CONTAINS, &[&Shown(location), &path], |inner| {
            inner.contains(location, path)
        })
    }

    fn get_package_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<PackageContainerGroup>> {
        self.intercept(&ops::GET_PACKAGE_CONTAINER_GROUP, &[&Shown(location)], |inner| {
            inner.get_package_container_group(location)
        })
    }

    fn get_module_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<ModuleContainerGroup>> {
        self.intercept(&ops::GET_MODULE_CONTAINER_GROUP, &[&Shown(location)], |inner| {
            inner.get_module_container_group(location)
        })
    }

    fn get_output_container_group(
        &self,
        location: &Location,
    ) -> Result<Option<OutputContainerGroup>> {
        self.intercept(&ops::GET_OUTPUT_CONTAINER_GROUP, &[&Shown(location)], |inner| {
            inner.get_output_container_group(location)
        })
    }

    fn get_package_container_groups(&self) -> Result<Vec<PackageContainerGroup>> {
        self.intercept(&ops::GET_PACKAGE_CONTAINER_GROUPS, &[], |inner| {
            inner.get_package_container_groups()
        })
    }

    fn list(
        &self,
        location: &Location,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<FileObject>> {
        self.intercept(
            &ops::LIST,
            &[&Shown(location), &package_name, &kinds, &recurse],
            |inner| inner.list(location, package_name, kinds, recurse),
        )
    }

    fn get_file_for_input(
        &self,
        location: &Location,
        package_name: &str,
        relative_name: &str,
    ) -> Result<Option<FileObject>> {
        self.intercept(
            &ops::GET_FILE_FOR_INPUT,
            &[&Shown(location), &package_name, &relative_name],
            |inner| inner.get_file_for_input(location, package_name, relative_name),
        )
    }

    fn write_file(
        &self,
        location: &Location,
        package_name: &str,
        relative_name: &str,
        content: &[u8],
    ) -> Result<FileObject> {
        self.intercept(
            &ops::WRITE_FILE,
            &[
                &Shown(location),
                &package_name,
                &relative_name,
                &ByteLen(content),
            ],
            |inner| inner.write_file(location, package_name, relative_name, content),
        )
    }

    fn read_file(&self, file: &FileObject) -> Result<Vec<u8>> {
        self.intercept(&ops::READ_FILE, &[&Shown(file)], |inner| {
            inner.read_file(file).map(ByteLen)
        })
        .map(|ByteLen(bytes)| bytes)
    }

    fn infer_binary_name(&self, location: &Location, file: &FileObject) -> Result<Option<String>> {
        self.intercept(&ops::INFER_BINARY_NAME, &[&Shown(location), &Shown(file)], |inner| {
            inner.infer_binary_name(location, file)
        })
    }

    fn effective_release(&self) -> String {
        self.intercept_infallible(&ops::EFFECTIVE_RELEASE, &[], |inner| {
            inner.effective_release()
        })
    }

    fn flush(&self) -> Result<()> {
        self.intercept(&ops::FLUSH, &[], |inner| inner.flush())
    }

    fn close(&self) -> Result<()> {
        self.intercept(&ops::CLOSE, &[], |inner| inner.close())
    }
}

impl<F: fmt::Display> fmt::Display for LoggingFileManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LoggingFileManager{{inner={}, stackTraces={}}}",
            self.inner, self.stack_traces
        )
    }
}

impl<F: fmt::Debug> fmt::Debug for LoggingFileManager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingFileManager")
            .field("inner", &self.inner)
            .field("stack_traces", &self.stack_traces)
            .finish_non_exhaustive()
    }
}

/// Wrap `inner` according to `mode`. [`LoggingMode::Disabled`] returns the
/// manager unwrapped.
#[must_use]
pub fn wrap_for_mode<F: FileManager + 'static>(inner: F, mode: LoggingMode) -> Box<dyn FileManager> {
    match mode {
        LoggingMode::Disabled => Box::new(inner),
        LoggingMode::Enabled | LoggingMode::StackTraces => {
            Box::new(LoggingFileManager::wrap(inner, mode.stack_traces()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filemanagers::{InMemoryFileManager, MemorySink};
    use crate::location::StandardLocation;

    #[test]
    fn stack_trace_frames_keep_their_source_position() {
        let rendered = "   0: first::frame\n             at src/a.rs:1:2\n   1: second::frame\n";
        assert_eq!(
            format_stack_trace(rendered),
            "\n\t0: first::frame at src/a.rs:1:2\n\t1: second::frame"
        );
    }

    #[test]
    fn operation_descriptors_render_parameter_lists() {
        assert_eq!(ops::LIST.param_list(), "&Location, &str, &[FileKind], bool");
        assert_eq!(ops::CLOSE.param_list(), "");
        assert!(ops::CLOSE.is_void());
        assert!(!ops::CONTAINS.is_void());
    }

    #[test]
    fn byte_payloads_render_by_size() {
        let sink = Arc::new(MemorySink::new());
        let fm = LoggingFileManager::with_sink(InMemoryFileManager::new("17"), false, sink.clone());
        let file = fm
            .write_file(
                &StandardLocation::ClassOutput.into(),
                "",
                "Foo.class",
                &[1, 2, 3],
            )
            .unwrap();
        assert_eq!(
            sink.events()[0].arguments.as_deref(),
            Some("CLASS_OUTPUT, \"\", \"Foo.class\", <3 bytes>")
        );

        sink.clear();
        assert_eq!(fm.read_file(&file).unwrap(), vec![1, 2, 3]);
        let events = sink.events();
        assert_eq!(events[0].arguments, Some(file.to_string()));
        assert_eq!(events[1].kind, CallEventKind::ExitNormal);
        assert_eq!(events[1].result.as_deref(), Some("<3 bytes>"));
    }

    #[test]
    fn disabled_mode_returns_unwrapped_manager() {
        let plain = wrap_for_mode(InMemoryFileManager::new("17"), LoggingMode::Disabled);
        assert_eq!(plain.to_string(), "InMemoryFileManager{release=17}");

        let logged = wrap_for_mode(InMemoryFileManager::new("17"), LoggingMode::StackTraces);
        assert_eq!(
            logged.to_string(),
            "LoggingFileManager{inner=InMemoryFileManager{release=17}, stackTraces=true}"
        );
    }
}
