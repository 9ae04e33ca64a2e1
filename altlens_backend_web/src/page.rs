// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live document access.
//!
//! [`DomPage`] implements [`Page`] over the browser window: targets come from
//! `querySelectorAll` (document order), bounds from
//! `getBoundingClientRect`, scroll from `window.scrollX/Y`. Layout events are
//! delivered to a host callback through window listeners (scroll in the
//! capture phase) and an optional `MutationObserver`.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Rect, Vec2};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Document, Element, Event, HtmlIFrameElement, MutationObserver, MutationObserverInit,
    MutationRecord, Node, NodeList, Window,
};

use altlens_core::backend::{LayoutEvent, MutationFootprint, Page};
use altlens_core::error::PageError;
use altlens_core::target::{TargetElement, TargetFilter, TargetKind};
use altlens_core::time::Duration;

use crate::timer::WakeupTimer;

/// Attributes whose change can alter an annotation or a position.
const OBSERVED_ATTRIBUTES: [&str; 6] = ["alt", "src", "style", "class", "width", "height"];

type EventCallback = Rc<dyn Fn(LayoutEvent)>;
type ListenerClosure = Closure<dyn FnMut(Event)>;
type ObserverClosure = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

/// A live `<img>` or `<iframe>` element.
#[derive(Clone, Debug)]
pub struct DomElement {
    element: Element,
    kind: TargetKind,
}

impl DomElement {
    /// Wraps `element` if it is an image or iframe.
    #[must_use]
    pub fn new(element: Element) -> Option<Self> {
        let kind = TargetKind::from_tag_name(&element.tag_name())?;
        Some(Self { element, kind })
    }
}

impl TargetElement for DomElement {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn alt(&self) -> Option<String> {
        self.element.get_attribute("alt")
    }

    fn src(&self) -> String {
        match self.element.dyn_ref::<HtmlIFrameElement>() {
            Some(frame) => frame.src(),
            None => self.element.get_attribute("src").unwrap_or_default(),
        }
    }

    fn bounding_rect(&self) -> Result<Rect, PageError> {
        let r = self.element.get_bounding_client_rect();
        let rect = Rect::new(r.left(), r.top(), r.left() + r.width(), r.top() + r.height());
        if rect.is_finite() {
            Ok(rect)
        } else {
            Err(PageError::MalformedRect)
        }
    }
}

struct Listener {
    event: LayoutEvent,
    closure: ListenerClosure,
}

struct Observer {
    observer: MutationObserver,
    _closure: ObserverClosure,
}

/// The browser window and its document.
pub struct DomPage {
    window: Window,
    document: Document,
    container_marker: &'static str,
    on_event: EventCallback,
    listeners: Vec<Listener>,
    observer: Option<Observer>,
    timer: WakeupTimer,
}

impl core::fmt::Debug for DomPage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPage")
            .field("container_marker", &self.container_marker)
            .field(
                "listeners",
                &self.listeners.iter().map(|l| l.event).collect::<Vec<_>>(),
            )
            .field("observing", &self.observer.is_some())
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl DomPage {
    /// Creates a page over `window`.
    ///
    /// `on_event` receives every subscribed layout event; `on_wakeup` runs
    /// when the debounce timer fires. Mutations inside the element whose id
    /// is `container_marker` are ignored.
    ///
    /// Returns `None` if the window has no document.
    pub fn new(
        window: Window,
        container_marker: &'static str,
        on_event: impl Fn(LayoutEvent) + 'static,
        on_wakeup: impl Fn() + 'static,
    ) -> Option<Self> {
        let document = window.document()?;
        Some(Self {
            window,
            document,
            container_marker,
            on_event: Rc::new(on_event),
            listeners: Vec::new(),
            observer: None,
            timer: WakeupTimer::new(on_wakeup),
        })
    }

    /// The document being scanned.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn add_window_listener(&mut self, event: LayoutEvent, dom_type: &str) -> Result<(), PageError> {
        let on_event = Rc::clone(&self.on_event);
        let closure = Closure::wrap(Box::new(move |_: Event| on_event(event)) as Box<dyn FnMut(Event)>);
        // Scroll does not bubble; capture sees scrolls of nested containers.
        let capture = event == LayoutEvent::Scroll;
        self.window
            .add_event_listener_with_callback_and_bool(
                dom_type,
                closure.as_ref().unchecked_ref(),
                capture,
            )
            .map_err(|_| PageError::Listener("addEventListener rejected"))?;
        self.listeners.push(Listener { event, closure });
        Ok(())
    }

    fn observe_mutations(&mut self) -> Result<(), PageError> {
        let root: Node = match self.document.body() {
            Some(body) => body.into(),
            None => self.document.clone().into(),
        };
        let on_event = Rc::clone(&self.on_event);
        let marker = self.container_marker;
        let closure = Closure::wrap(Box::new(move |records: js_sys::Array, _: MutationObserver| {
            let foreign = records
                .iter()
                .filter_map(|r| r.dyn_into::<MutationRecord>().ok())
                .any(|r| !footprint(&r, marker).is_own(marker));
            if foreign {
                on_event(LayoutEvent::Mutation);
            }
        }) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())
            .map_err(|_| PageError::Listener("MutationObserver unavailable"))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        let filter: js_sys::Array = OBSERVED_ATTRIBUTES
            .iter()
            .map(|a| wasm_bindgen::JsValue::from_str(a))
            .collect();
        init.set_attribute_filter(&filter);
        observer
            .observe_with_options(&root, &init)
            .map_err(|_| PageError::Listener("MutationObserver.observe rejected"))?;

        self.observer = Some(Observer {
            observer,
            _closure: closure,
        });
        Ok(())
    }
}

/// Reduces a mutation record to what [`MutationFootprint::is_own`] needs.
fn footprint(record: &MutationRecord, marker: &str) -> MutationFootprint {
    let target_in_container = record
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(&format!("#{marker}")).ok().flatten())
        .is_some();
    if target_in_container {
        return MutationFootprint {
            target_in_container,
            ..MutationFootprint::default()
        };
    }
    let ids = |list: NodeList| {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|n| n.dyn_ref::<Element>().map(Element::id).unwrap_or_default())
            .collect()
    };
    MutationFootprint {
        target_in_container,
        added: ids(record.added_nodes()),
        removed: ids(record.removed_nodes()),
    }
}

impl Page for DomPage {
    type Element = DomElement;

    fn targets(&self, filter: TargetFilter) -> Vec<DomElement> {
        let Some(selector) = filter.selector() else {
            return Vec::new();
        };
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(DomElement::new)
            .collect()
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::new(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn subscribe(&mut self, event: LayoutEvent) -> Result<(), PageError> {
        self.unsubscribe(event);
        match event.dom_type() {
            Some(dom_type) => self.add_window_listener(event, dom_type),
            None => self.observe_mutations(),
        }
    }

    fn unsubscribe(&mut self, event: LayoutEvent) {
        if event == LayoutEvent::Mutation {
            if let Some(obs) = self.observer.take() {
                obs.observer.disconnect();
            }
            return;
        }
        let Some(dom_type) = event.dom_type() else {
            return;
        };
        let capture = event == LayoutEvent::Scroll;
        let window = &self.window;
        self.listeners.retain(|l| {
            if l.event != event {
                return true;
            }
            let _ = window.remove_event_listener_with_callback_and_bool(
                dom_type,
                l.closure.as_ref().unchecked_ref(),
                capture,
            );
            false
        });
    }

    fn schedule_wakeup(&mut self, delay: Duration) -> Result<(), PageError> {
        self.timer.schedule(delay);
        Ok(())
    }

    fn cancel_wakeup(&mut self) {
        self.timer.cancel();
    }
}

impl Drop for DomPage {
    fn drop(&mut self) {
        for event in [LayoutEvent::Resize, LayoutEvent::Scroll, LayoutEvent::Mutation] {
            self.unsubscribe(event);
        }
    }
}
