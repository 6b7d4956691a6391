use super::timer::RequestTimer;
use super::widgets::{
    BodyEditor, Effect, FocusableInput, MethodField, ResponseViewer, TextField,
};
use crate::client::{Method, RequestResult};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Layout contract shared with the renderer: the method/url row and the
// status bar are one line plus borders, the method pane is fixed-width.
pub(crate) const INPUT_ROW_HEIGHT: u16 = 3;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 3;
pub(crate) const METHOD_PANE_WIDTH: u16 = 10;

/// The single active UI state. Exactly one widget owns keyboard focus in
/// every mode except `Overview`, where none does.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Overview,
    EditingUrl,
    EditingMethod,
    EditingBody,
    ViewingResponse,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

/// Follow-up work a key handler asks the event loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartRequest,
}

#[derive(Debug, Default)]
pub struct AppState {
    mode: Mode,
    exit: bool,
    dimensions: Dimensions,
    pub(crate) url: TextField,
    pub(crate) method: MethodField,
    pub(crate) body: BodyEditor,
    pub(crate) response: ResponseViewer,
    pub(crate) timer: RequestTimer,
}

impl AppState {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        !self.exit
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn request_method(&self) -> Method {
        self.method.value()
    }

    pub fn request_url(&self) -> String {
        self.url.value().to_string()
    }

    /// Body sent with a POST. An untouched editor sends an empty JSON
    /// object rather than an empty payload.
    pub fn request_body(&self) -> String {
        if self.body.is_empty() {
            "{}".to_string()
        } else {
            self.body.contents()
        }
    }

    /// The last accepted response body or error message.
    pub fn response_text(&self) -> &str {
        self.response.content()
    }

    pub fn request_in_flight(&self) -> bool {
        self.timer.is_active()
    }

    /// Record that a request was just dispatched, restarting the elapsed
    /// clock. Called by the event loop right after `RequestDispatcher::start`.
    pub fn mark_request_started(&mut self) {
        self.timer.start();
    }

    /// Recompute every widget's render size from the new terminal size.
    /// Widths come from the layout split at draw time; the two tall
    /// widgets additionally need their heights for scrolling and clipping.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.dimensions = Dimensions { width, height };
        self.body
            .set_height(height.saturating_sub(INPUT_ROW_HEIGHT + 2));
        self.response
            .set_height(height.saturating_sub(STATUS_BAR_HEIGHT + 2));
    }

    /// Route a key to the handler owning the current mode. `ctrl+c`
    /// terminates from anywhere.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.exit = true;
            return None;
        }
        match self.mode {
            Mode::Overview => self.handle_overview_key(key),
            Mode::EditingUrl => self.handle_url_key(key),
            Mode::EditingMethod => self.handle_method_key(key),
            Mode::EditingBody => self.handle_body_key(key),
            Mode::ViewingResponse => self.handle_response_key(key),
        }
    }

    fn handle_overview_key(&mut self, key: &KeyEvent) -> Option<Action> {
        assert!(
            self.mode == Mode::Overview,
            "overview mode handler called outside overview mode"
        );
        match key.code {
            KeyCode::Char('u') => {
                self.mode = Mode::EditingUrl;
                self.url.focus();
            }
            KeyCode::Char('m') => {
                self.mode = Mode::EditingMethod;
                self.method.focus();
            }
            KeyCode::Char('b') => {
                self.mode = Mode::EditingBody;
                self.body.focus();
            }
            KeyCode::Char('r') => {
                self.mode = Mode::ViewingResponse;
                self.response.focus();
            }
            KeyCode::Char('q') => self.exit = true,
            KeyCode::Enter => return Some(Action::StartRequest),
            _ => {}
        }
        None
    }

    fn handle_url_key(&mut self, key: &KeyEvent) -> Option<Action> {
        assert!(
            self.mode == Mode::EditingUrl,
            "url mode handler called outside url editing mode"
        );
        if key.code == KeyCode::Esc {
            self.url.blur();
            self.mode = Mode::Overview;
            return None;
        }
        if let Some(Effect::Submitted) = self.url.handle(key) {
            self.url.blur();
            self.mode = Mode::Overview;
            return Some(Action::StartRequest);
        }
        None
    }

    fn handle_method_key(&mut self, key: &KeyEvent) -> Option<Action> {
        assert!(
            self.mode == Mode::EditingMethod,
            "method mode handler called outside method editing mode"
        );
        // The method field blurs itself on esc/enter, mirroring how the
        // selection widget owns its dismissal.
        if let Some(Effect::Dismissed) = self.method.handle(key) {
            self.mode = Mode::Overview;
        }
        None
    }

    fn handle_body_key(&mut self, key: &KeyEvent) -> Option<Action> {
        assert!(
            self.mode == Mode::EditingBody,
            "body mode handler called outside body editing mode"
        );
        if key.code == KeyCode::Esc {
            self.body.blur();
            self.mode = Mode::Overview;
            return None;
        }
        self.body.handle(key);
        None
    }

    fn handle_response_key(&mut self, key: &KeyEvent) -> Option<Action> {
        assert!(
            self.mode == Mode::ViewingResponse,
            "response mode handler called outside response viewing mode"
        );
        if key.code == KeyCode::Esc {
            self.response.blur();
            self.mode = Mode::Overview;
            return None;
        }
        self.response.handle(key);
        None
    }

    /// The single merge point for request outcomes. A result whose tag no
    /// longer matches the dispatcher's current generation is dropped
    /// without touching the timer or the displayed response.
    pub fn apply_response(&mut self, result: RequestResult, current_tag: u64) {
        if result.tag != current_tag {
            tracing::debug!(
                tag = result.tag,
                current_tag,
                "discarding stale request result"
            );
            return;
        }
        self.timer.stop();
        match result.error {
            Some(error) => self.response.set_error(&error),
            None => self.response.set_body(&result.body),
        }
    }
}
