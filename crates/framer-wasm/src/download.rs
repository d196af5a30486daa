//! Client-side download of an exported file.

use framer_core::{DownloadSink, ExportError, ExportedFile};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::types::js_error_message;

/// Saves files by clicking a temporary `<a download>` pointing at a blob URL.
pub struct AnchorDownload;

impl DownloadSink for AnchorDownload {
    fn deliver(&mut self, file: &ExportedFile) -> Result<(), ExportError> {
        trigger(file).map_err(|e| ExportError::Delivery(js_error_message(&e)))
    }
}

fn trigger(file: &ExportedFile) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type(file.mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();

    Url::revoke_object_url(&url)?;
    log::debug!("download of {} triggered", file.file_name);
    Ok(())
}
