use std::time::Duration;

use anyhow::Result;
use tracing::debug;
use tracing::warn;

use crate::adapters::format::DeviceInfo;
use crate::adapters::format::OutputFormat;
use crate::adapters::format::estimate_tokens;
use crate::adapters::format::render;
use crate::adapters::presenter::{ErrorView, Presenter, create_presenter};
use crate::app::error::CliError;
use crate::domain::EndpointCandidate;
use crate::infra::signal_handler::SignalHandler;
use crate::infra::vm_service::{AbortHandle, VmServiceError};
use crate::usecases::ports::UiDumpSource;
use crate::usecases::{
    ChangeDetector, DiscoveryUseCase, InspectMode, InspectOutput, InspectUseCase,
};

pub type HandlerResult = Result<()>;

pub struct HandlerContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub tokens: bool,
    presenter: Box<dyn Presenter>,
}

impl HandlerContext {
    pub fn new(format: OutputFormat, quiet: bool, tokens: bool) -> Self {
        Self {
            format,
            quiet,
            tokens,
            presenter: create_presenter(format),
        }
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    /// Status line on stderr, suppressed by `--quiet`.
    pub fn note(&self, message: &str) {
        if !self.quiet {
            self.presenter.present_note(message);
        }
    }

    fn emit(&self, text: &str) {
        self.presenter.present_snapshot(text);
        if self.tokens {
            self.presenter.present_tokens(estimate_tokens(text));
        }
    }
}

fn find_error<T: std::error::Error + 'static>(error: &anyhow::Error) -> Option<&T> {
    error.chain().find_map(|source| source.downcast_ref::<T>())
}

/// Picks the most specific view of an error chain for the presenter.
pub fn error_view(error: &anyhow::Error) -> ErrorView {
    if let Some(vm_error) = find_error::<VmServiceError>(error) {
        return ErrorView::new(vm_error.to_string())
            .with_suggestion(vm_error.suggestion())
            .with_json(vm_error.to_json());
    }
    if let Some(cli_error) = find_error::<CliError>(error) {
        return cli_error
            .hints()
            .iter()
            .fold(ErrorView::new(cli_error.to_string()), |view, hint| {
                view.with_hint(*hint)
            })
            .with_json(cli_error.to_json());
    }
    ErrorView::new(format!("{error:#}"))
}

pub fn handle_list<D: DiscoveryUseCase>(ctx: &HandlerContext, discovery: &D) -> HandlerResult {
    ctx.note("Searching for Flutter debug services...");
    let services = discovery.find_endpoints();
    debug!(count = services.len(), "Discovery finished");
    ctx.presenter().present_services(&services);
    Ok(())
}

/// An explicit URI wins; otherwise the `index`th discovered service.
pub fn resolve_uri<D: DiscoveryUseCase>(
    ctx: &HandlerContext,
    explicit: Option<&str>,
    index: usize,
    discovery: &D,
) -> Result<String> {
    if let Some(uri) = explicit.map(str::trim).filter(|uri| !uri.is_empty()) {
        return Ok(uri.to_string());
    }
    ctx.note("Searching for Flutter debug apps...");
    let services = discovery.find_endpoints();
    let service = pick_service(services, index).ok_or(CliError::NoServiceFound)?;
    debug!(uri = %service.uri, origin = %service.origin, "Selected VM service");
    Ok(service.uri)
}

fn pick_service(mut services: Vec<EndpointCandidate>, index: usize) -> Option<EndpointCandidate> {
    if services.is_empty() {
        return None;
    }
    let index = if index < services.len() {
        index
    } else {
        warn!(
            index,
            found = services.len(),
            "Service index out of range, using the first service"
        );
        0
    };
    Some(services.swap_remove(index))
}

pub fn handle_inspect<S: UiDumpSource>(
    ctx: &HandlerContext,
    usecase: &InspectUseCase,
    source: &mut S,
    mode: InspectMode,
    uri: &str,
) -> HandlerResult {
    match usecase.execute(source, mode)? {
        InspectOutput::RawDump(dump) => {
            ctx.presenter().present_snapshot(&dump);
        }
        InspectOutput::WidgetTree { text, fallback } => {
            if fallback {
                ctx.note("Semantics empty, falling back to widget tree...");
            }
            if text.trim().is_empty() {
                return Err(CliError::EmptyWidgetTree.into());
            }
            ctx.emit(&text);
        }
        InspectOutput::Elements {
            elements,
            node_count,
        } => {
            debug!(node_count, elements = elements.len(), "Semantics flattened");
            let device = (!ctx.quiet).then(|| DeviceInfo::for_uri(uri));
            let output = render(&elements, ctx.format, device.as_ref());
            ctx.emit(&output);
        }
    }
    Ok(())
}

/// Polls until a stop is requested. `connect` is called whenever there is
/// no live source, including after any failed iteration. Returns the number
/// of distinct snapshots printed.
pub fn handle_watch<S, F>(
    ctx: &HandlerContext,
    usecase: &InspectUseCase,
    signals: &SignalHandler,
    interval: Duration,
    mut connect: F,
) -> Result<usize>
where
    S: UiDumpSource,
    F: FnMut() -> Result<(S, Option<AbortHandle>)>,
{
    ctx.presenter().present_note(&format!(
        "Watching UI changes (interval: {:?}s, Ctrl+C to stop)...\n",
        interval.as_secs_f64()
    ));

    let mut detector = ChangeDetector::new();
    let mut source: Option<S> = None;
    while !signals.stop_requested() {
        let result = watch_iteration(
            ctx,
            usecase,
            signals,
            &mut source,
            &mut connect,
            &mut detector,
        );
        if let Err(err) = result {
            if signals.stop_requested() {
                break;
            }
            debug!(error = %err, "Watch iteration failed, reconnecting next time");
            ctx.presenter().present_error(&error_view(&err));
            signals.arm(None);
            source = None;
        }
        if !signals.sleep(interval) {
            break;
        }
    }

    ctx.presenter().present_note("\nStopping watch...");
    Ok(detector.updates())
}

fn watch_iteration<S, F>(
    ctx: &HandlerContext,
    usecase: &InspectUseCase,
    signals: &SignalHandler,
    source: &mut Option<S>,
    connect: &mut F,
    detector: &mut ChangeDetector,
) -> HandlerResult
where
    S: UiDumpSource,
    F: FnMut() -> Result<(S, Option<AbortHandle>)>,
{
    let live = match source {
        Some(live) => live,
        None => {
            let (fresh, abort) = connect()?;
            signals.arm(abort);
            source.insert(fresh)
        }
    };
    let (elements, _) = usecase.snapshot(live)?;
    let output = render(&elements, ctx.format, None);
    if let Some(update) = detector.observe(&output) {
        if !ctx.quiet {
            ctx.presenter().present_update(update);
        }
        ctx.presenter().present_snapshot(&output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscoveryMethod, SemanticsOrder};
    use crate::test_support::{MockDumpError, MockDumpSource, MockStrategy};
    use crate::usecases::DiscoveryCascade;
    use std::sync::atomic::Ordering;

    const BUTTON_DUMP: &str = "\
SemanticsNode#0
 └─SemanticsNode#1
     label: \"Sign in\"
     actions: tap
";

    fn quiet_ctx() -> HandlerContext {
        HandlerContext::new(OutputFormat::Compact, true, false)
    }

    fn cascade(candidates: Vec<EndpointCandidate>) -> DiscoveryCascade {
        DiscoveryCascade::new(vec![Box::new(MockStrategy::new("mock", candidates))])
    }

    #[test]
    fn test_explicit_uri_skips_discovery() {
        let strategy = MockStrategy::empty("mock");
        let calls = strategy.calls();
        let discovery = DiscoveryCascade::new(vec![Box::new(strategy)]);
        let uri = resolve_uri(&quiet_ctx(), Some("ws://127.0.0.1:9/ws"), 0, &discovery).unwrap();
        assert_eq!(uri, "ws://127.0.0.1:9/ws");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blank_explicit_uri_falls_back_to_discovery() {
        let discovery = cascade(vec![EndpointCandidate::local(8181, DiscoveryMethod::PortScan)]);
        let uri = resolve_uri(&quiet_ctx(), Some("  "), 0, &discovery).unwrap();
        assert_eq!(uri, "ws://127.0.0.1:8181/ws");
    }

    #[test]
    fn test_no_service_found_is_cli_error() {
        let err = resolve_uri(&quiet_ctx(), None, 0, &cascade(Vec::new())).unwrap_err();
        assert!(matches!(
            find_error::<CliError>(&err),
            Some(CliError::NoServiceFound)
        ));
        let view = error_view(&err);
        assert_eq!(view.message, "No Flutter debug app found.");
        assert_eq!(view.hints.len(), 2);
    }

    #[test]
    fn test_index_selects_service_and_out_of_range_uses_first() {
        let services = vec![
            EndpointCandidate::local(8181, DiscoveryMethod::Lsof),
            EndpointCandidate::local(8182, DiscoveryMethod::Lsof),
        ];
        let discovery = cascade(services);
        let second = resolve_uri(&quiet_ctx(), None, 1, &discovery).unwrap();
        assert_eq!(second, "ws://127.0.0.1:8182/ws");
        let fallback = resolve_uri(&quiet_ctx(), None, 7, &discovery).unwrap();
        assert_eq!(fallback, "ws://127.0.0.1:8181/ws");
    }

    #[test]
    fn test_inspect_uses_semantics_when_present() {
        let mut source = MockDumpSource::new().with_semantics(BUTTON_DUMP);
        let usecase = InspectUseCase::new(SemanticsOrder::Traversal);
        handle_inspect(
            &quiet_ctx(),
            &usecase,
            &mut source,
            InspectMode::Semantics,
            "ws://127.0.0.1:8181/ws",
        )
        .unwrap();
        assert_eq!(source.widget_calls, 0);
    }

    #[test]
    fn test_empty_fallback_widget_tree_is_an_error() {
        let mut source = MockDumpSource::new().with_semantics("");
        let usecase = InspectUseCase::new(SemanticsOrder::Traversal);
        let err = handle_inspect(
            &quiet_ctx(),
            &usecase,
            &mut source,
            InspectMode::Semantics,
            "ws://127.0.0.1:8181/ws",
        )
        .unwrap_err();
        assert!(matches!(
            find_error::<CliError>(&err),
            Some(CliError::EmptyWidgetTree)
        ));
        assert_eq!(source.widget_calls, 1);
    }

    #[test]
    fn test_vm_error_view_carries_suggestion() {
        let err = anyhow::Error::new(VmServiceError::NotConnected);
        let view = error_view(&err);
        assert_eq!(view.message, "Not connected");
        assert_eq!(
            view.suggestion.as_deref(),
            Some("The Flutter app may have been closed.")
        );
        assert!(view.json.is_some());
    }

    /// Requests a stop once `remaining` semantics fetches have happened.
    struct StopAfter<'a> {
        inner: MockDumpSource,
        remaining: usize,
        signals: &'a SignalHandler,
    }

    impl UiDumpSource for StopAfter<'_> {
        type Error = MockDumpError;

        fn semantics_dump(&mut self, order: SemanticsOrder) -> Result<String, MockDumpError> {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.signals.request_stop();
            }
            self.inner.semantics_dump(order)
        }

        fn widget_tree_dump(&mut self) -> Result<String, MockDumpError> {
            self.inner.widget_tree_dump()
        }
    }

    #[test]
    fn test_watch_reuses_connection_and_prints_only_changes() {
        let signals = SignalHandler::detached();
        let usecase = InspectUseCase::new(SemanticsOrder::Traversal);
        let mut connects = 0;
        let updates = handle_watch(
            &quiet_ctx(),
            &usecase,
            &signals,
            Duration::from_millis(1),
            || {
                connects += 1;
                let inner = MockDumpSource::new()
                    .with_semantics(BUTTON_DUMP)
                    .with_semantics(BUTTON_DUMP)
                    .with_semantics("");
                Ok((
                    StopAfter {
                        inner,
                        remaining: 3,
                        signals: &signals,
                    },
                    None,
                ))
            },
        )
        .unwrap();
        assert_eq!(connects, 1);
        assert_eq!(updates, 2);
    }

    #[test]
    fn test_watch_reconnects_after_failed_iteration() {
        let signals = SignalHandler::detached();
        let usecase = InspectUseCase::new(SemanticsOrder::Traversal);
        let mut connects = 0;
        let updates = handle_watch(
            &quiet_ctx(),
            &usecase,
            &signals,
            Duration::from_millis(1),
            || {
                connects += 1;
                let inner = if connects == 1 {
                    MockDumpSource::new().with_semantics_error("connection reset")
                } else {
                    MockDumpSource::new().with_semantics(BUTTON_DUMP)
                };
                let remaining = if connects == 1 { usize::MAX } else { 1 };
                Ok((
                    StopAfter {
                        inner,
                        remaining,
                        signals: &signals,
                    },
                    None,
                ))
            },
        )
        .unwrap();
        assert_eq!(connects, 2);
        assert_eq!(updates, 1);
    }

    #[test]
    fn test_watch_exits_immediately_when_already_stopped() {
        let signals = SignalHandler::detached();
        signals.request_stop();
        let usecase = InspectUseCase::new(SemanticsOrder::Traversal);
        let mut connects = 0;
        let updates = handle_watch(
            &quiet_ctx(),
            &usecase,
            &signals,
            Duration::from_secs(60),
            || -> Result<(MockDumpSource, Option<AbortHandle>)> {
                connects += 1;
                Ok((MockDumpSource::new(), None))
            },
        )
        .unwrap();
        assert_eq!(connects, 0);
        assert_eq!(updates, 0);
    }
}
