use crate::models::{DecodedSymbol, DetectedSymbol, Symbology};
use crate::session::capture::CaptureSession;

/// Receives per-frame detections and yields at most one hit per session
#[derive(Debug, Clone)]
pub struct DecodeSink {
    allow_list: Vec<Symbology>,
    armed: bool,
}

impl DecodeSink {
    /// Disarmed sink for the given allow-list
    pub fn new(allow_list: Vec<Symbology>) -> Self {
        Self {
            allow_list,
            armed: false,
        }
    }

    /// Accept the next hit
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Ignore everything until armed again
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether the next valid hit will be taken
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// First allow-listed symbol with non-empty text, in delivery order
    pub fn select(&self, batch: &[DetectedSymbol]) -> Option<DecodedSymbol> {
        batch.iter().find_map(|symbol| {
            if !self.allow_list.contains(&symbol.symbology) {
                return None;
            }
            let text = symbol.text.as_deref().filter(|t| !t.is_empty())?;
            Some(DecodedSymbol {
                symbology: symbol.symbology,
                text: text.to_string(),
            })
        })
    }

    /// Take the first valid hit: stop capture, disarm, return the symbol
    pub fn accept(
        &mut self,
        batch: &[DetectedSymbol],
        session: &mut CaptureSession,
    ) -> Option<DecodedSymbol> {
        if !self.armed {
            if !batch.is_empty() {
                log::trace!("sink disarmed; dropping {} symbols", batch.len());
            }
            return None;
        }
        let hit = self.select(batch)?;
        session.stop();
        self.armed = false;
        log::debug!("{} hit ({} bytes); capture stopped", hit.symbology, hit.text.len());
        Some(hit)
    }
}
