//! Browser download as the export destination.
//!
//! The PNG is wrapped in a `Blob`, exposed through an object URL and saved by
//! clicking a temporary `<a download>` element, the same thing a user's
//! "save link as" would do.

use js_sys::{Array, Uint8Array};
use photoframe_core::export::{check_filename, ExportSink, SavedExport, SinkError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url, Window};

const PNG_MIME: &str = "image/png";

/// The object URL must outlive the click; some browsers start reading it only
/// after the current task ends.
const REVOKE_DELAY_MS: i32 = 1_000;

fn rejected(err: JsValue) -> SinkError {
    SinkError::Rejected(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Saves exports through the browser's download mechanism.
#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadSink;

impl DownloadSink {
    fn trigger_download(filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let parts = Array::of1(&Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(PNG_MIME);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();

        revoke_later(&window, url).map(|_| ())
    }
}

/// Revoke `url` from a timer instead of synchronously. Returns the timer id.
fn revoke_later(window: &Window, url: String) -> Result<i32, JsValue> {
    let revoke = Closure::once_into_js(move || {
        // Nothing to report to once the export has resolved.
        let _ = Url::revoke_object_url(&url);
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        revoke.unchecked_ref(),
        REVOKE_DELAY_MS,
    )
}

impl ExportSink for DownloadSink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<SavedExport, SinkError> {
        check_filename(filename)?;
        Self::trigger_download(filename, bytes).map_err(rejected)?;
        Ok(SavedExport {
            location: format!("download:{filename}"),
        })
    }
}
