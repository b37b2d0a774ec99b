use std::fmt;
use std::str::FromStr;

/// Barcode encoding family reported by the platform decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    /// QR code (the only family enabled by default)
    Qr,
    /// Aztec code
    Aztec,
    /// Code 128
    Code128,
    /// Data Matrix
    DataMatrix,
    /// EAN-13
    Ean13,
    /// PDF417
    Pdf417,
}

impl Symbology {
    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Symbology::Qr => "qr",
            Symbology::Aztec => "aztec",
            Symbology::Code128 => "code128",
            Symbology::DataMatrix => "datamatrix",
            Symbology::Ean13 => "ean13",
            Symbology::Pdf417 => "pdf417",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qr" | "qrcode" => Ok(Symbology::Qr),
            "aztec" => Ok(Symbology::Aztec),
            "code128" => Ok(Symbology::Code128),
            "datamatrix" => Ok(Symbology::DataMatrix),
            "ean13" => Ok(Symbology::Ean13),
            "pdf417" => Ok(Symbology::Pdf417),
            other => Err(format!("unknown symbology '{other}'")),
        }
    }
}

/// A symbol as delivered by the platform decoder for one frame.
///
/// Platform objects may carry no string value (binary payloads); those are
/// skipped by the decode sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSymbol {
    /// Encoding family
    pub symbology: Symbology,
    /// Decoded string value, if any
    pub text: Option<String>,
}

impl DetectedSymbol {
    /// Symbol with a string payload
    pub fn new(symbology: Symbology, text: impl Into<String>) -> Self {
        Self {
            symbology,
            text: Some(text.into()),
        }
    }

    /// Symbol the platform could not express as text
    pub fn without_text(symbology: Symbology) -> Self {
        Self {
            symbology,
            text: None,
        }
    }
}

/// The one actionable result of a scan session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Encoding family
    pub symbology: Symbology,
    /// Decoded content
    pub text: String,
}
