//! WASM bindings for the web reader
//!
//! Payloads cross the boundary as JSON strings in both directions.

use crate::document::FlowDocument;
use crate::error::PaginationError;
use crate::layout::{
    LayoutSession, LayoutUpdate, MeasuredHeights, MonospaceMeasurer, PaginationConfig,
    RemeasureTicket, TextMeasurer,
};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Measurement oracle backed by JS callbacks.
///
/// `measure(text, width)` must return a line count. Without a callback, or
/// when it throws or returns something that is not a number, the monospace
/// model answers instead.
pub struct JsMeasurer {
    measure: Option<js_sys::Function>,
    acquire: Option<js_sys::Function>,
    release: Option<js_sys::Function>,
    fallback: MonospaceMeasurer,
}

impl JsMeasurer {
    pub fn new(fallback: MonospaceMeasurer) -> Self {
        Self {
            measure: None,
            acquire: None,
            release: None,
            fallback,
        }
    }

    pub fn has_callback(&self) -> bool {
        self.measure.is_some()
    }

    fn call_hook(hook: Option<&js_sys::Function>, name: &str) {
        if let Some(hook) = hook {
            if let Err(err) = hook.call0(&JsValue::NULL) {
                log::warn!("measurement surface {name} hook failed: {err:?}");
            }
        }
    }
}

impl TextMeasurer for JsMeasurer {
    fn line_count(&self, text: &str, width: f32) -> usize {
        let Some(measure) = self.measure.as_ref() else {
            return self.fallback.line_count(text, width);
        };

        match measure.call2(&JsValue::NULL, &JsValue::from_str(text), &JsValue::from_f64(width as f64)) {
            Ok(value) => match value.as_f64() {
                Some(lines) if lines.is_finite() && lines >= 0.0 => lines.ceil() as usize,
                _ => {
                    log::warn!("measure callback returned a non-count, using monospace model");
                    self.fallback.line_count(text, width)
                }
            },
            Err(err) => {
                log::warn!("measure callback threw {err:?}, using monospace model");
                self.fallback.line_count(text, width)
            }
        }
    }

    fn acquire(&self) {
        Self::call_hook(self.acquire.as_ref(), "acquire");
    }

    fn release(&self) {
        Self::call_hook(self.release.as_ref(), "release");
    }

    fn reconfigure(&mut self, config: &PaginationConfig) {
        self.fallback.reconfigure(config);
    }
}

fn to_js_error(err: PaginationError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// WASM-exposed paginator wrapper
#[wasm_bindgen]
pub struct WasmPaginator {
    session: LayoutSession<JsMeasurer>,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a paginator from a JSON configuration; an empty string uses the
    /// defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmPaginator, JsValue> {
        Self::from_config_json(config_json).map_err(to_js_error)
    }

    /// Text measuring callbacks: `measure(text, width) -> lines`, plus
    /// optional hooks bracketing each batch of measurements
    #[wasm_bindgen(js_name = setMeasurer)]
    pub fn set_measurer(
        &mut self,
        measure: js_sys::Function,
        acquire: Option<js_sys::Function>,
        release: Option<js_sys::Function>,
    ) {
        let measurer = self.session.measurer_mut();
        measurer.measure = Some(measure);
        measurer.acquire = acquire;
        measurer.release = release;
    }

    /// Paginate a document (JSON array of elements); returns the update JSON
    pub fn load(&mut self, document_json: &str) -> Result<String, JsValue> {
        self.load_json(document_json).map_err(to_js_error)
    }

    /// Run the measured pass. `heights_json` maps element ids to heights.
    pub fn complete(&mut self, ticket: f64, heights_json: &str) -> Result<String, JsValue> {
        self.complete_json(ticket, heights_json).map_err(to_js_error)
    }

    /// Abandon the owed measured pass
    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Apply a new JSON configuration and lay the current document out again
    pub fn reconfigure(&mut self, config_json: &str) -> Result<String, JsValue> {
        self.reconfigure_json(config_json).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.session.pages().len()
    }

    #[wasm_bindgen(js_name = getGeneration)]
    pub fn get_generation(&self) -> f64 {
        self.session.generation() as f64
    }

    #[wasm_bindgen(js_name = isRemeasurePending)]
    pub fn is_remeasure_pending(&self) -> bool {
        self.session.is_remeasure_pending()
    }
}

impl WasmPaginator {
    fn from_config_json(config_json: &str) -> crate::Result<Self> {
        let config = if config_json.trim().is_empty() {
            PaginationConfig::default()
        } else {
            PaginationConfig::from_json(config_json)?
        };
        let measurer = JsMeasurer::new(MonospaceMeasurer::from_config(&config));
        Ok(Self {
            session: LayoutSession::new(config, measurer)?,
        })
    }

    fn load_json(&mut self, document_json: &str) -> crate::Result<String> {
        let document = FlowDocument::from_json(document_json)?;
        let update = self.session.load(document);
        encode(&update)
    }

    fn complete_json(&mut self, ticket: f64, heights_json: &str) -> crate::Result<String> {
        if !(ticket.is_finite() && ticket >= 0.0) {
            return Err(PaginationError::StaleRemeasure {
                ticket: 0,
                current: self.session.generation(),
            });
        }
        let heights: MeasuredHeights = serde_json::from_str(heights_json)?;
        let update = self
            .session
            .complete(RemeasureTicket::from_generation(ticket as u64), &heights)?;
        encode(&update)
    }

    fn reconfigure_json(&mut self, config_json: &str) -> crate::Result<String> {
        let config = PaginationConfig::from_json(config_json)?;
        let update = self.session.reconfigure(config)?;
        encode(&update)
    }
}

fn encode(update: &LayoutUpdate) -> crate::Result<String> {
    Ok(serde_json::to_string(update)?)
}
