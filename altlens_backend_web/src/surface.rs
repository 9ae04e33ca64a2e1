// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM overlay management.
//!
//! [`DomSurface`] owns the overlay container `<div>` and builds one overlay
//! per [`Overlay`]:
//!
//! ```html
//! <div id="alt-text-viewer-container">
//!   <div class="overlay" data-classification="present" style="top: …px; left: …px">
//!     <div class="overlay-content">Alt text: "cat"</div>
//!     <button class="close-btn">×</button>
//!   </div>
//! </div>
//! ```
//!
//! Styling comes from the injected stylesheet; only `top`/`left` are set
//! inline. `data-classification` lets the stylesheet tell missing, empty and
//! present alt text apart.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement};

use altlens_core::annotation::OverlayContent;
use altlens_core::backend::OverlaySurface;
use altlens_core::error::SurfaceError;
use altlens_core::overlay::{
    CLASSIFICATION_ATTRIBUTE, CLOSE_BUTTON_CLASS, CLOSE_BUTTON_TEXT, CONTENT_CLASS,
    OVERLAY_CLASS, Overlay, OverlayId,
};

type DismissCallback = Rc<dyn Fn(OverlayId)>;

struct DomOverlay {
    id: OverlayId,
    element: HtmlElement,
    on_close: Closure<dyn FnMut()>,
}

/// Maps overlays to live DOM nodes under a single container.
pub struct DomSurface {
    document: Document,
    container: Option<HtmlElement>,
    overlays: Vec<DomOverlay>,
    /// Closures of dismissed overlays. A dismiss runs inside its own click
    /// closure, so dropping that closure is deferred to the next rebuild.
    retired: Vec<Closure<dyn FnMut()>>,
    on_dismiss: DismissCallback,
}

impl core::fmt::Debug for DomSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomSurface")
            .field("container", &self.container.as_ref().map(|_| "HtmlElement"))
            .field("overlays_len", &self.overlays.len())
            .field("retired_len", &self.retired.len())
            .finish_non_exhaustive()
    }
}

impl DomSurface {
    /// Creates a surface rendering into `document`.
    ///
    /// `on_dismiss` runs when an overlay's close button is clicked.
    pub fn new(document: Document, on_dismiss: impl Fn(OverlayId) + 'static) -> Self {
        Self {
            document,
            container: None,
            overlays: Vec::new(),
            retired: Vec::new(),
            on_dismiss: Rc::new(on_dismiss),
        }
    }

    fn create(&self, tag: &'static str) -> Result<Element, SurfaceError> {
        self.document
            .create_element(tag)
            .map_err(|_| SurfaceError::Rejected(tag))
    }

    fn build_content(&self, content: &OverlayContent) -> Result<Element, SurfaceError> {
        let block = self.create("div")?;
        block.set_class_name(CONTENT_CLASS);
        match content {
            OverlayContent::Text(text) => block.set_text_content(Some(text.as_str())),
            OverlayContent::Link { href, label } => {
                let link = self.create("a")?;
                let _ = link.set_attribute("href", href);
                let _ = link.set_attribute("target", "_blank");
                let _ = link.set_attribute("rel", "noopener noreferrer");
                link.set_text_content(Some(*label));
                block
                    .append_child(&link)
                    .map_err(|_| SurfaceError::Rejected("a"))?;
            }
        }
        Ok(block)
    }

    fn drop_all_overlays(&mut self) {
        for overlay in self.overlays.drain(..) {
            overlay.element.remove();
        }
        self.retired.clear();
    }
}

impl OverlaySurface for DomSurface {
    fn remove_stale_container(&mut self, marker: &str) -> bool {
        let mut removed = false;
        // Ids should be unique, but pages are not always well-formed.
        while let Some(el) = self.document.get_element_by_id(marker) {
            el.remove();
            removed = true;
        }
        if self.container.as_ref().is_some_and(|c| c.id() == marker) {
            self.container = None;
            self.drop_all_overlays();
        }
        removed
    }

    fn create_container(&mut self, marker: &str) -> Result<(), SurfaceError> {
        let body = self.document.body().ok_or(SurfaceError::NoRoot)?;
        let container: HtmlElement = self.create("div")?.unchecked_into();
        container.set_id(marker);
        body.append_child(&container)
            .map_err(|_| SurfaceError::Rejected("container"))?;

        if let Some(previous) = self.container.replace(container) {
            previous.remove();
        }
        self.drop_all_overlays();
        Ok(())
    }

    fn has_container(&self) -> bool {
        self.container.as_ref().is_some_and(|c| c.is_connected())
    }

    fn remove_container(&mut self) {
        if let Some(container) = self.container.take() {
            container.remove();
        }
        self.drop_all_overlays();
    }

    fn clear_overlays(&mut self) {
        self.drop_all_overlays();
    }

    fn append_overlay(&mut self, overlay: &Overlay) -> Result<(), SurfaceError> {
        let container = self
            .container
            .as_ref()
            .ok_or(SurfaceError::MissingContainer)?;

        let el: HtmlElement = self.create("div")?.unchecked_into();
        el.set_class_name(OVERLAY_CLASS);
        let _ = el.set_attribute(
            CLASSIFICATION_ATTRIBUTE,
            overlay.annotation.classification.as_str(),
        );
        let s = el.style();
        let _ = s.set_property("top", &format!("{}px", overlay.origin.y));
        let _ = s.set_property("left", &format!("{}px", overlay.origin.x));

        let content = self.build_content(&overlay.annotation.content)?;

        let button: HtmlElement = self.create("button")?.unchecked_into();
        button.set_class_name(CLOSE_BUTTON_CLASS);
        button.set_text_content(Some(CLOSE_BUTTON_TEXT));
        let on_dismiss = Rc::clone(&self.on_dismiss);
        let id = overlay.id;
        let on_close = Closure::wrap(Box::new(move || on_dismiss(id)) as Box<dyn FnMut()>);
        button.set_onclick(Some(on_close.as_ref().unchecked_ref()));

        el.append_child(&content)
            .and_then(|_| el.append_child(&button))
            .and_then(|_| container.append_child(&el))
            .map_err(|_| SurfaceError::Rejected("overlay"))?;

        self.overlays.push(DomOverlay {
            id,
            element: el,
            on_close,
        });
        Ok(())
    }

    fn remove_overlay(&mut self, id: OverlayId) -> bool {
        let Some(pos) = self.overlays.iter().position(|o| o.id == id) else {
            return false;
        };
        let overlay = self.overlays.remove(pos);
        overlay.element.remove();
        self.retired.push(overlay.on_close);
        true
    }

    fn overlay_count(&self) -> usize {
        self.overlays.len()
    }
}
