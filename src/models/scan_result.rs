use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of optical symbol reported by a decode provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymbolType {
    /// QR code (Model 2, any version)
    Qr,
    /// Any other symbology, kept by the name the provider used
    Other(String),
}

impl SymbolType {
    /// Parse a provider symbol name.
    ///
    /// Platform engines disagree on naming (`qr`, `QR_CODE`, `org.iso.QRCode`),
    /// so the match is case-insensitive and ignores separators.
    pub fn parse(name: &str) -> Self {
        let folded: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "qr" | "qrcode" | "orgisoqrcode" => SymbolType::Qr,
            _ => SymbolType::Other(name.to_string()),
        }
    }

    /// Canonical name
    pub fn as_str(&self) -> &str {
        match self {
            SymbolType::Qr => "qr",
            SymbolType::Other(name) => name,
        }
    }
}

impl From<String> for SymbolType {
    fn from(value: String) -> Self {
        SymbolType::parse(&value)
    }
}

impl From<SymbolType> for String {
    fn from(value: SymbolType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated symbol as handed over by a decode provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSymbol {
    /// Provider's name for the symbology
    pub symbol_type: String,
    /// Decoded text, possibly empty
    pub payload: String,
}

impl RawSymbol {
    /// Create a raw symbol
    pub fn new(symbol_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            symbol_type: symbol_type.into(),
            payload: payload.into(),
        }
    }

    /// Raw QR symbol
    pub fn qr(payload: impl Into<String>) -> Self {
        Self::new("qr", payload)
    }

    /// Normalize into a [`ScanResult`], `None` when the payload is empty
    pub fn into_result(self) -> Option<ScanResult> {
        ScanResult::new(SymbolType::parse(&self.symbol_type), self.payload)
    }
}

/// One decoded symbol. The payload is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanResult {
    symbol_type: SymbolType,
    payload: String,
}

impl ScanResult {
    /// Create a scan result, `None` if `payload` is empty
    pub fn new(symbol_type: SymbolType, payload: impl Into<String>) -> Option<Self> {
        let payload = payload.into();
        if payload.is_empty() {
            return None;
        }
        Some(Self {
            symbol_type,
            payload,
        })
    }

    /// Symbology of the decoded symbol
    pub fn symbol_type(&self) -> &SymbolType {
        &self.symbol_type
    }

    /// Decoded text
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Take the payload, dropping the symbol type
    pub fn into_payload(self) -> String {
        self.payload
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol_type, self.payload)
    }
}
