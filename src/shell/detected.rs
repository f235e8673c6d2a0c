use super::navigation::{Navigator, Route};
use crate::capability::QrRenderer;
use crate::error::ScanError;
use crate::providers::renderer::RenderedSymbol;

/// What the result screen shows
#[derive(Debug, Clone, Copy)]
pub struct DetectedView<'a> {
    /// Screen title
    pub title: &'static str,
    /// Freshly generated symbol
    pub symbol: &'a RenderedSymbol,
    /// Raw payload text
    pub text: &'a str,
}

/// Static result: a payload re-rendered as a QR symbol
#[derive(Debug, Clone)]
pub struct DetectedScreen {
    qr_data: String,
    symbol: RenderedSymbol,
}

impl DetectedScreen {
    /// Render `qr_data` at `size` pixels
    pub fn open(
        qr_data: impl Into<String>,
        renderer: &dyn QrRenderer,
        size: u32,
    ) -> Result<Self, ScanError> {
        let qr_data = qr_data.into();
        let symbol = renderer.render(&qr_data, size)?;
        Ok(Self { qr_data, symbol })
    }

    /// Payload passed through navigation
    pub fn qr_data(&self) -> &str {
        &self.qr_data
    }

    /// Current view
    pub fn view(&self) -> DetectedView<'_> {
        DetectedView {
            title: Route::DETECTED_TITLE,
            symbol: &self.symbol,
            text: &self.qr_data,
        }
    }

    /// "Back"
    pub fn back(&self, navigator: &mut Navigator) -> bool {
        navigator.go_back()
    }
}
