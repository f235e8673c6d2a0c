use crate::capability::{DecodeProvider, ImageNormalizer};
use crate::error::ScanError;
use crate::models::{NormalizeOptions, PickedImage, RawSymbol, ScanResult, SymbolType};
use crate::session::{SessionHandle, Transition};
use std::sync::Arc;
use tracing::{debug, warn};

/// Normalize-then-decode for a picked still image.
///
/// The session stays `Awaiting` across both provider calls, so a screen can
/// show a busy indicator for the whole request.
#[derive(Clone)]
pub struct ImageScanAdapter {
    normalizer: Arc<dyn ImageNormalizer>,
    decoder: Arc<dyn DecodeProvider>,
    options: NormalizeOptions,
    symbol_types: Vec<SymbolType>,
}

impl ImageScanAdapter {
    /// Adapter asking for QR symbols only
    pub fn new(normalizer: Arc<dyn ImageNormalizer>, decoder: Arc<dyn DecodeProvider>) -> Self {
        Self {
            normalizer,
            decoder,
            options: NormalizeOptions::default(),
            symbol_types: vec![SymbolType::Qr],
        }
    }

    /// Override the normalize options
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the requested symbologies
    pub fn with_symbol_types(mut self, symbol_types: Vec<SymbolType>) -> Self {
        self.symbol_types = symbol_types;
        self
    }

    /// Run one scan of `picked` in `session`.
    ///
    /// Returns [`Transition::Ignored`] without touching the image when the
    /// session is not idle. Otherwise the session ends `Resolved` or `Failed`.
    pub async fn scan(&self, session: &SessionHandle, picked: PickedImage) -> Transition {
        if !session.start().is_applied() {
            debug!("image scan skipped, session busy");
            return Transition::Ignored;
        }

        match self.normalize_and_decode(picked).await {
            Ok(result) => session.on_decoded(result),
            Err(err) => {
                if !matches!(err, ScanError::NoSymbolFound) {
                    warn!(%err, "image scan failed");
                }
                session.on_failure(err.failure_reason())
            }
        };
        Transition::Applied
    }

    async fn normalize_and_decode(&self, picked: PickedImage) -> Result<ScanResult, ScanError> {
        let source = picked.into_handle();
        let normalized = self.normalizer.normalize(&source, &self.options).await?;
        let symbols = self
            .decoder
            .scan_image(&normalized, &self.symbol_types)
            .await?;
        debug!(found = symbols.len(), "picked image decoded");
        symbols
            .into_iter()
            .find_map(RawSymbol::into_result)
            .ok_or(ScanError::NoSymbolFound)
    }
}
