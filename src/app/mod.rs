pub mod state;
pub mod timer;
pub mod ui;
pub mod widgets;

use crate::client::{HttpTransport, Method, RequestResult, Transport};
use crate::configuration::Settings;
use crate::tui;
use color_eyre::eyre::WrapErr;
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures_util::stream::StreamExt;
use state::{Action, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything the event loop reacts to, applied strictly in arrival
/// order by the single owner of all mutable state.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Response(RequestResult),
    /// Periodic wakeup so the elapsed-time display moves while a
    /// request is in flight.
    Tick,
}

/// Merges terminal input with results posted back by request tasks.
pub struct EventService {
    crossterm_events: EventStream,
    events: mpsc::UnboundedReceiver<Event>,
}

impl EventService {
    pub fn new(events: mpsc::UnboundedReceiver<Event>) -> Self {
        Self {
            crossterm_events: EventStream::new(),
            events,
        }
    }

    fn handle_crossterm(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            _ => None,
        }
    }

    pub async fn next(&mut self) -> color_eyre::Result<Event> {
        loop {
            let ev = tokio::select! {
                event = self.events.recv() => event,
                event = self.crossterm_events.next() => match event {
                    Some(Ok(ev)) => Self::handle_crossterm(ev),
                    Some(Err(_)) => None,
                    None => None,
                },
                _ = tokio::time::sleep(Duration::from_millis(200)) => Some(Event::Tick),
            };
            if let Some(ev) = ev {
                return Ok(ev);
            }
        }
    }
}

/// Owns the generation tag and turns "start request" commands into
/// detached transport tasks. Each task posts exactly one tagged result
/// back on the event channel and never touches shared state itself; a
/// superseded task runs to completion and its result is dropped by tag
/// mismatch at the merge step.
pub struct RequestDispatcher<T> {
    transport: Arc<T>,
    sender: mpsc::UnboundedSender<Event>,
    tag: u64,
}

impl<T: Transport> RequestDispatcher<T> {
    pub fn new(transport: T, sender: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            transport: Arc::new(transport),
            sender,
            tag: 0,
        }
    }

    /// The generation tag of the most recently started request. Results
    /// carrying any other tag are stale.
    pub fn current_tag(&self) -> u64 {
        self.tag
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Allocate the next generation tag and spawn the transport call.
    /// The tag is incremented before any asynchronous work begins, so a
    /// fast stale reply can never impersonate the new request.
    pub fn start(&mut self, method: Method, url: String, body: String) -> u64 {
        self.tag += 1;
        let tag = self.tag;
        let transport = Arc::clone(&self.transport);
        let sender = self.sender.clone();
        tracing::debug!(tag, method = method.as_str(), %url, "dispatching request");
        tokio::spawn(async move {
            let result = match transport.send(method, &url, &body).await {
                Ok(body) => RequestResult::ok(tag, body),
                Err(error) => RequestResult::err(tag, error),
            };
            let _ = sender.send(Event::Response(result));
        });
        tag
    }
}

pub async fn exec(settings: &Settings) -> color_eyre::Result<()> {
    tui::install_hooks()?;
    let mut terminal = tui::init()?;
    let transport = HttpTransport::build(&settings.http)?;
    let result = run(&mut terminal, transport).await;
    tui::restore()?;
    result
}

async fn run<T: Transport>(terminal: &mut tui::Tui, transport: T) -> color_eyre::Result<()> {
    let mut state = AppState::default();
    let size = terminal.size()?;
    state.resize(size.width, size.height);

    let (tx, rx) = mpsc::unbounded_channel();
    let mut events = EventService::new(rx);
    let mut dispatcher = RequestDispatcher::new(transport, tx);

    while state.is_running() {
        terminal
            .draw(|frame| ui::render(&state, frame))
            .wrap_err("terminal.draw")?;

        match events.next().await? {
            Event::Key(key) => {
                if let Some(Action::StartRequest) = state.handle_key(&key) {
                    dispatcher.start(
                        state.request_method(),
                        state.request_url(),
                        state.request_body(),
                    );
                    state.mark_request_started();
                }
            }
            Event::Resize(width, height) => state.resize(width, height),
            Event::Response(result) => state.apply_response(result, dispatcher.current_tag()),
            Event::Tick => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Transport stub scripted per URL with an optional artificial delay.
    struct StubTransport {
        replies: Mutex<HashMap<String, (Duration, Result<String, RequestError>)>>,
    }

    impl StubTransport {
        fn new() -> Self {
            Self {
                replies: Mutex::new(HashMap::new()),
            }
        }

        fn reply(self, url: &str, delay: Duration, reply: Result<String, RequestError>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(url.to_string(), (delay, reply));
            self
        }
    }

    impl Transport for StubTransport {
        async fn send(
            &self,
            _method: Method,
            url: &str,
            _body: &str,
        ) -> Result<String, RequestError> {
            let scripted = self.replies.lock().unwrap().get(url).cloned();
            let (delay, reply) = scripted
                .unwrap_or_else(|| (Duration::ZERO, Err(RequestError::Transport("no route".into()))));
            tokio::time::sleep(delay).await;
            reply
        }
    }

    async fn next_response(rx: &mut mpsc::UnboundedReceiver<Event>) -> RequestResult {
        match rx.recv().await {
            Some(Event::Response(result)) => result,
            other => panic!("expected a response event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn each_dispatch_gets_a_fresh_tag() {
        let transport = StubTransport::new().reply(
            "http://example.test/ok",
            Duration::ZERO,
            Ok("ok".into()),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = RequestDispatcher::new(transport, tx);

        let first = dispatcher.start(Method::Get, "http://example.test/ok".into(), String::new());
        let second = dispatcher.start(Method::Get, "http://example.test/ok".into(), String::new());
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(dispatcher.current_tag(), 2);

        let tags = [next_response(&mut rx).await.tag, next_response(&mut rx).await.tag];
        assert!(tags.contains(&1) && tags.contains(&2));
    }

    #[tokio::test]
    async fn slow_superseded_request_does_not_overwrite_the_newer_result() {
        let transport = StubTransport::new()
            .reply(
                "http://example.test/slow",
                Duration::from_millis(50),
                Ok("slow and stale".into()),
            )
            .reply(
                "http://example.test/fast",
                Duration::ZERO,
                Ok("fresh".into()),
            );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = RequestDispatcher::new(transport, tx);
        let mut state = AppState::default();

        dispatcher.start(Method::Get, "http://example.test/slow".into(), String::new());
        state.mark_request_started();
        dispatcher.start(Method::Get, "http://example.test/fast".into(), String::new());
        state.mark_request_started();

        // The fast reply lands first, the superseded one afterwards.
        for _ in 0..2 {
            let result = next_response(&mut rx).await;
            state.apply_response(result, dispatcher.current_tag());
        }

        assert_eq!(state.response_text(), "fresh");
        assert!(!state.request_in_flight());
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced_and_stops_the_timer() {
        let transport = StubTransport::new().reply(
            "http://bad",
            Duration::ZERO,
            Err(RequestError::Transport("connection refused".into())),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = RequestDispatcher::new(transport, tx);
        let mut state = AppState::default();

        dispatcher.start(Method::Post, "http://bad".into(), "{}".into());
        state.mark_request_started();
        let result = next_response(&mut rx).await;
        state.apply_response(result, dispatcher.current_tag());

        assert_eq!(
            state.response_text(),
            "failed to send request: connection refused"
        );
        assert!(!state.request_in_flight());
    }
}
