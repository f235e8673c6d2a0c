use tracing::debug;

/// Named destinations of the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Entry screen
    Home,
    /// Live camera
    Scanner,
    /// Static result for a payload
    Detected {
        /// Text to redisplay as a QR symbol
        qr_data: String,
    },
}

impl Route {
    /// Title of the entry screen
    pub const HOME_TITLE: &'static str = "QR Scanner";
    /// Title of the live camera screen
    pub const SCANNER_TITLE: &'static str = "Scan QR";
    /// Title of the static result screen
    pub const DETECTED_TITLE: &'static str = "QR Code Detected";

    /// Header title
    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => Self::HOME_TITLE,
            Route::Scanner => Self::SCANNER_TITLE,
            Route::Detected { .. } => Self::DETECTED_TITLE,
        }
    }

    /// Whether the stack header is drawn; the result screen draws its own
    pub fn header_shown(&self) -> bool {
        !matches!(self, Route::Detected { .. })
    }
}

/// Navigation stack rooted at [`Route::Home`]
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    /// Stack holding only the root
    pub fn new() -> Self {
        Self {
            stack: vec![Route::Home],
        }
    }

    /// Route on top
    pub fn current(&self) -> &Route {
        // The root is never popped.
        &self.stack[self.stack.len() - 1]
    }

    /// Number of routes on the stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push `route`
    pub fn navigate(&mut self, route: Route) {
        debug!(to = route.title(), depth = self.stack.len() + 1, "navigate");
        self.stack.push(route);
    }

    /// Pop the top route; false at the root
    pub fn go_back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        debug!(to = self.current().title(), "navigate back");
        true
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
