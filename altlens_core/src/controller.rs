// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle controller.
//!
//! The [`Controller`] owns the overlay container for one page and runs the
//! scan → resolve → render pipeline:
//!
//! ```text
//!   activate() ──► container ──► pass ──► subscribe(resize, scroll, …)
//!                                   ▲
//!   layout event ──► Debouncer ──► wakeup ──► flush()/poll()
//!
//!   deactivate() ──► unsubscribe ──► cancel wakeup ──► remove container
//! ```
//!
//! Every pass is a full refresh: the container is emptied and rebuilt from a
//! fresh scan, so overlays always reflect current layout and attributes.
//! Individually dismissed overlays come back on the next pass.

use alloc::vec::Vec;

use crate::annotation::resolve;
use crate::backend::{LayoutEvent, OverlaySurface, Page};
use crate::config::OverlayConfig;
use crate::debounce::Debouncer;
use crate::error::SurfaceError;
use crate::overlay::OverlayId;
use crate::render::{RenderOutcome, render};
use crate::target::{TargetElement, scan};
use crate::time::HostTime;
use crate::trace::{
    ActivateEvent, ClassificationCounts, ContainerStatus, DeactivateEvent, DismissEvent, ElementSkipEvent,
    LayoutEventTrace, PageFailureEvent, PassReason, PassSummary, Tracer,
};

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// No container, no listeners.
    Inactive,
    /// Container attached, listeners registered.
    Active,
}

/// Owns the overlays of one page.
#[derive(Debug)]
pub struct Controller<P, S> {
    page: P,
    surface: S,
    config: OverlayConfig,
    state: State,
    debounce: Debouncer,
    pending: Option<LayoutEvent>,
    generation: u32,
    subscribed: Vec<LayoutEvent>,
}

impl<P: Page, S: OverlaySurface> Controller<P, S> {
    /// Creates an inactive controller.
    #[must_use]
    pub fn new(page: P, surface: S, config: OverlayConfig) -> Self {
        Self {
            page,
            surface,
            config,
            state: State::Inactive,
            debounce: Debouncer::new(config.debounce),
            pending: None,
            generation: 0,
            subscribed: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns `true` while active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Generation of the most recent pass (0 before the first one).
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// When the pending debounced pass is due, if any.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<HostTime> {
        self.debounce.deadline()
    }

    /// Layout events currently subscribed.
    #[must_use]
    pub fn subscriptions(&self) -> &[LayoutEvent] {
        &self.subscribed
    }

    /// The page.
    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    /// The page, mutably (hosts and tests mutate the document through it).
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// The overlay surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The overlay surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Activates the overlays: removes any stale container, builds a fresh
    /// one, runs one pass and subscribes to layout events.
    ///
    /// Re-activating an active controller tears it down first, so repeated
    /// calls never duplicate the container or its overlays.
    ///
    /// # Errors
    ///
    /// Returns the surface error if the container cannot be created. The
    /// controller is left inactive.
    pub fn activate(
        &mut self,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Result<PassSummary, SurfaceError> {
        let was_active = self.is_active();
        if was_active {
            self.deactivate(tracer);
        }

        let stale_container_removed = self
            .surface
            .remove_stale_container(self.config.container_marker);
        tracer.activate(&ActivateEvent {
            at: now,
            was_active,
            stale_container_removed,
        });

        self.surface.create_container(self.config.container_marker)?;
        self.state = State::Active;

        let summary = self.run_pass(PassReason::Activate, ContainerStatus::Created, tracer);
        self.subscribe_all(tracer);
        Ok(summary)
    }

    /// Deactivates: drops listeners and the pending wakeup, removes the
    /// container and every overlay in it.
    ///
    /// Returns the number of overlays removed. A no-op when inactive.
    pub fn deactivate(&mut self, tracer: &mut Tracer<'_>) -> usize {
        if !self.is_active() {
            return 0;
        }

        let listeners_removed = self.subscribed.len();
        for event in self.subscribed.drain(..) {
            self.page.unsubscribe(event);
        }
        self.debounce.cancel();
        self.pending = None;
        self.page.cancel_wakeup();

        let overlays_removed = if self.surface.has_container() {
            self.surface.overlay_count()
        } else {
            0
        };
        self.surface.remove_container();
        self.state = State::Inactive;

        tracer.deactivate(&DeactivateEvent {
            overlays_removed,
            listeners_removed,
        });
        overlays_removed
    }

    /// Records a layout event at `now` and (re)arms the debounced pass.
    ///
    /// Returns the deadline of the pending pass, or `None` if inactive.
    pub fn on_layout_event(
        &mut self,
        event: LayoutEvent,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Option<HostTime> {
        if !self.is_active() {
            return None;
        }

        let deadline = self.debounce.trigger(now);
        self.pending = Some(event);
        tracer.layout_event(&LayoutEventTrace {
            event,
            at: now,
            deadline,
        });

        if let Err(error) = self.page.schedule_wakeup(self.debounce.delay()) {
            tracer.page_failure(&PageFailureEvent {
                event: Some(event),
                error,
            });
        }
        Some(deadline)
    }

    /// Runs the pending pass if its deadline has passed at `now`.
    pub fn poll(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> Option<PassSummary> {
        if !self.is_active() || !self.debounce.poll(now) {
            return None;
        }
        Some(self.run_pending(tracer))
    }

    /// Runs the pending pass immediately, if one is pending.
    ///
    /// Hosts call this from the wakeup timer, which already waited out the
    /// quiet period.
    pub fn flush(&mut self, tracer: &mut Tracer<'_>) -> Option<PassSummary> {
        if !self.is_active() || !self.debounce.flush() {
            return None;
        }
        Some(self.run_pending(tracer))
    }

    /// Runs a pass right away, discarding any pending one.
    pub fn refresh(&mut self, tracer: &mut Tracer<'_>) -> Option<PassSummary> {
        if !self.is_active() {
            return None;
        }
        self.debounce.cancel();
        self.pending = None;
        self.page.cancel_wakeup();
        Some(self.run_pass(PassReason::Manual, ContainerStatus::Reused, tracer))
    }

    /// Removes the single overlay `id`.
    ///
    /// Ids from an earlier pass are stale and ignored. Returns whether an
    /// overlay was removed.
    pub fn dismiss(&mut self, id: OverlayId, tracer: &mut Tracer<'_>) -> bool {
        let removed = self.is_active()
            && id.generation == self.generation
            && self.surface.remove_overlay(id);
        tracer.dismiss(&DismissEvent { id, removed });
        removed
    }

    fn run_pending(&mut self, tracer: &mut Tracer<'_>) -> PassSummary {
        let reason = self
            .pending
            .take()
            .map_or(PassReason::Manual, PassReason::Layout);
        self.run_pass(reason, ContainerStatus::Reused, tracer)
    }

    fn subscribe_all(&mut self, tracer: &mut Tracer<'_>) {
        let wanted = [
            (LayoutEvent::Resize, self.config.track_resize),
            (LayoutEvent::Scroll, self.config.track_scroll),
            (LayoutEvent::Mutation, self.config.track_mutations),
        ];
        for (event, enabled) in wanted {
            if !enabled {
                continue;
            }
            match self.page.subscribe(event) {
                Ok(()) => self.subscribed.push(event),
                Err(error) => tracer.page_failure(&PageFailureEvent {
                    event: Some(event),
                    error,
                }),
            }
        }
    }

    fn run_pass(
        &mut self,
        reason: PassReason,
        fresh: ContainerStatus,
        tracer: &mut Tracer<'_>,
    ) -> PassSummary {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        let container = if self.surface.has_container() {
            self.surface.clear_overlays();
            fresh
        } else {
            // Removed behind our back (e.g. by a page script).
            match self.surface.create_container(self.config.container_marker) {
                Ok(()) => ContainerStatus::Recreated,
                Err(_) => ContainerStatus::Unavailable,
            }
        };

        let mut summary = PassSummary {
            generation,
            reason,
            container,
            scanned: 0,
            rendered: 0,
            classified: ClassificationCounts::default(),
            degenerate: 0,
            skipped: 0,
        };
        if container == ContainerStatus::Unavailable {
            tracer.pass(&summary);
            return summary;
        }

        let scroll = self.page.scroll_offset();
        let targets = scan(&self.page, self.config.targets);
        summary.scanned = targets.len();

        for (slot, element) in targets.iter().enumerate() {
            let slot = u32::try_from(slot).unwrap_or(u32::MAX);
            let id = OverlayId::new(slot, generation);
            let annotation = resolve(element);
            let classification = annotation.classification;
            match render(
                &mut self.surface,
                element,
                annotation,
                scroll,
                id,
                self.config.min_extent,
            ) {
                RenderOutcome::Placed(_) => {
                    summary.rendered += 1;
                    summary.classified.record(classification);
                }
                RenderOutcome::Degenerate => summary.degenerate += 1,
                RenderOutcome::Skipped(reason) => {
                    summary.skipped += 1;
                    tracer.element_skip(&ElementSkipEvent {
                        generation,
                        slot,
                        kind: element.kind(),
                        reason,
                    });
                }
            }
        }

        tracer.pass(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Rect, Vec2};

    use super::*;
    use crate::annotation::{Classification, EMPTY_ALT_TEXT, MISSING_ALT_TEXT};
    use crate::config::DEFAULT_CONTAINER_MARKER;
    use crate::memory::{MemoryElement, MemoryPage, MemorySurface};
    use crate::time::Duration;

    type TestController = Controller<MemoryPage, MemorySurface>;

    fn visible(x: f64) -> Rect {
        Rect::new(x, 0.0, x + 100.0, 80.0)
    }

    fn controller(page: MemoryPage) -> TestController {
        Controller::new(page, MemorySurface::new(), OverlayConfig::web())
    }

    fn three_images_and_hidden_iframe() -> MemoryPage {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(visible(0.0), Some("cat")));
        page.push(MemoryElement::image(visible(120.0), Some("")));
        page.push(MemoryElement::image(visible(240.0), None));
        page.push(MemoryElement::iframe(Rect::ZERO, "https://other.example/"));
        page
    }

    fn activate(c: &mut TestController) -> PassSummary {
        c.activate(HostTime(0), &mut Tracer::none()).unwrap()
    }

    #[test]
    fn scenario_three_images_one_hidden_iframe() {
        let mut c = controller(three_images_and_hidden_iframe());
        let summary = activate(&mut c);

        assert_eq!(summary.scanned, 4);
        assert_eq!(summary.rendered, 3);
        assert_eq!(summary.degenerate, 1, "0×0 iframe");
        for classification in [
            Classification::Present,
            Classification::Empty,
            Classification::Missing,
        ] {
            assert_eq!(summary.classified.get(classification), 1, "{classification:?}");
        }
        assert_eq!(summary.classified.get(Classification::Restricted), 0);
        assert_eq!(
            c.surface().overlay_texts(),
            [
                "Alt text: \"cat\"",
                EMPTY_ALT_TEXT,
                MISSING_ALT_TEXT
            ]
        );
    }

    #[test]
    fn overlay_count_matches_visible_targets() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(visible(0.0), Some("a")));
        page.push(MemoryElement::image(Rect::new(0.0, 0.0, 0.5, 10.0), Some("thin")));
        page.push(MemoryElement::iframe(visible(200.0), "https://x.example/"));
        let mut c = controller(page);

        let summary = activate(&mut c);
        assert_eq!(summary.rendered, 2);
        assert_eq!(c.surface().overlay_count(), 2);
        assert_eq!(c.surface().container_count(), 1);
    }

    #[test]
    fn deactivate_leaves_nothing_behind() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);
        assert_eq!(c.page().listener_count(), 2, "resize + scroll");
        c.on_layout_event(LayoutEvent::Scroll, HostTime(10), &mut Tracer::none());
        assert!(c.page().wakeup().is_some());

        let removed = c.deactivate(&mut Tracer::none());
        assert_eq!(removed, 3);
        assert_eq!(c.state(), State::Inactive);
        assert_eq!(c.surface().overlay_count(), 0);
        assert_eq!(c.surface().container_count(), 0);
        assert_eq!(c.page().listener_count(), 0);
        assert!(c.page().wakeup().is_none());
        assert!(c.subscriptions().is_empty());
    }

    #[test]
    fn deactivate_is_idempotent() {
        let mut c = controller(three_images_and_hidden_iframe());
        assert_eq!(c.deactivate(&mut Tracer::none()), 0, "never activated");
        activate(&mut c);
        c.deactivate(&mut Tracer::none());
        assert_eq!(c.deactivate(&mut Tracer::none()), 0);
        assert_eq!(c.page().listener_count(), 0);
    }

    #[test]
    fn double_activate_does_not_duplicate() {
        let mut c = controller(three_images_and_hidden_iframe());
        let first = activate(&mut c);
        let second = activate(&mut c);

        assert_eq!(first.rendered, second.rendered);
        assert_eq!(c.surface().container_count(), 1);
        assert_eq!(c.surface().overlay_count(), 3);
        assert_eq!(c.page().listener_count(), 2, "listeners not doubled");
    }

    #[test]
    fn activation_removes_stale_container() {
        let mut surface = MemorySurface::new();
        surface.plant_stale_container(DEFAULT_CONTAINER_MARKER, 5);
        let mut c = Controller::new(
            three_images_and_hidden_iframe(),
            surface,
            OverlayConfig::web(),
        );

        activate(&mut c);
        assert_eq!(c.surface().container_count(), 1);
        assert_eq!(c.surface().overlay_count(), 3);
    }

    #[test]
    fn dismiss_removes_one_until_next_pass() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);
        let id = c.surface().overlays()[1].id;

        assert!(c.dismiss(id, &mut Tracer::none()));
        assert_eq!(c.surface().overlay_count(), 2);
        assert_eq!(
            c.surface().overlay_texts(),
            ["Alt text: \"cat\"", MISSING_ALT_TEXT]
        );
        assert!(!c.dismiss(id, &mut Tracer::none()), "already gone");

        c.on_layout_event(LayoutEvent::Scroll, HostTime(1_000), &mut Tracer::none());
        let summary = c.flush(&mut Tracer::none()).unwrap();
        assert_eq!(summary.reason, PassReason::Layout(LayoutEvent::Scroll));
        assert_eq!(c.surface().overlay_count(), 3, "restored by re-pass");
    }

    #[test]
    fn stale_dismiss_is_ignored() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);
        let old = c.surface().overlays()[0].id;
        c.refresh(&mut Tracer::none());

        assert!(!c.dismiss(old, &mut Tracer::none()));
        assert_eq!(c.surface().overlay_count(), 3);
    }

    #[test]
    fn layout_events_are_debounced() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);
        let start = c.generation();
        let mut t = Tracer::none();

        for ms in [0_u64, 50, 100, 150] {
            let now = HostTime(1_000_000 + ms * 1000);
            assert_eq!(c.poll(now, &mut t), None);
            c.on_layout_event(LayoutEvent::Resize, now, &mut t);
        }
        assert_eq!(c.pending_deadline(), Some(HostTime(1_350_000)));
        assert_eq!(c.page().wakeup(), Some(Duration::from_millis(200)));
        assert_eq!(c.page().wakeups_armed(), 4, "re-armed per event");

        assert_eq!(c.poll(HostTime(1_349_999), &mut t), None);
        let summary = c.poll(HostTime(1_350_000), &mut t).unwrap();
        assert_eq!(summary.generation, start + 1, "exactly one pass");
        assert_eq!(c.poll(HostTime(9_000_000), &mut t), None);
    }

    #[test]
    fn pass_picks_up_layout_and_attribute_changes() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);

        c.page_mut().set_scroll(Vec2::new(0.0, 500.0));
        c.page_mut().element_mut(2).set_alt(Some("now described"));
        c.page_mut()
            .element_mut(3)
            .set_rect(Rect::new(0.0, 100.0, 300.0, 250.0));

        c.on_layout_event(LayoutEvent::Scroll, HostTime(0), &mut Tracer::none());
        let summary = c.flush(&mut Tracer::none()).unwrap();
        assert_eq!(summary.rendered, 4);

        let overlays = c.surface().overlays();
        assert_eq!(overlays[0].origin.y, 500.0);
        assert_eq!(overlays[2].annotation.content.text(), "Alt text: \"now described\"");
        assert_eq!(overlays[3].origin.y, 600.0);
    }

    #[test]
    fn missing_container_is_recreated() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);
        c.surface_mut().detach_container();

        let summary = c.refresh(&mut Tracer::none()).unwrap();
        assert_eq!(summary.container, ContainerStatus::Recreated);
        assert_eq!(c.surface().container_count(), 1);
        assert_eq!(c.surface().overlay_count(), 3);
    }

    #[test]
    fn malformed_element_does_not_abort_pass() {
        let mut page = MemoryPage::new();
        page.push(MemoryElement::image(visible(0.0), Some("a")));
        page.push(MemoryElement::image(visible(0.0), Some("b")).malformed());
        page.push(MemoryElement::image(visible(0.0), Some("c")));
        let mut c = controller(page);

        let summary = activate(&mut c);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rendered, 2);
        assert_eq!(
            c.surface().overlay_texts(),
            ["Alt text: \"a\"", "Alt text: \"c\""]
        );
    }

    #[test]
    fn activation_fails_without_root() {
        let mut surface = MemorySurface::new();
        surface.set_has_root(false);
        let mut c = Controller::new(
            three_images_and_hidden_iframe(),
            surface,
            OverlayConfig::web(),
        );

        let err = c.activate(HostTime(0), &mut Tracer::none()).unwrap_err();
        assert_eq!(err, SurfaceError::NoRoot);
        assert_eq!(c.state(), State::Inactive);
        assert_eq!(c.page().listener_count(), 0);
    }

    #[test]
    fn events_are_ignored_while_inactive() {
        let mut c = controller(three_images_and_hidden_iframe());
        let mut t = Tracer::none();
        assert_eq!(c.on_layout_event(LayoutEvent::Scroll, HostTime(0), &mut t), None);
        assert_eq!(c.flush(&mut t), None);
        assert_eq!(c.refresh(&mut t), None);
        assert_eq!(c.surface().container_count(), 0);
    }

    #[test]
    fn listener_failure_is_not_fatal() {
        let mut page = three_images_and_hidden_iframe();
        page.fail_subscriptions(true);
        let mut c = controller(page);

        let summary = activate(&mut c);
        assert_eq!(summary.rendered, 3);
        assert!(c.is_active());
        assert!(c.subscriptions().is_empty());
    }

    #[test]
    fn mutation_tracking_is_opt_in() {
        let config = OverlayConfig::web().with_mutations(true);
        let mut c = Controller::new(
            three_images_and_hidden_iframe(),
            MemorySurface::new(),
            config,
        );
        activate(&mut c);
        assert!(c.page().is_subscribed(LayoutEvent::Mutation));
        assert_eq!(c.subscriptions().len(), 3);
    }

    #[test]
    fn passes_never_arm_the_wakeup() {
        let config = OverlayConfig::web().with_mutations(true);
        let mut c = Controller::new(
            three_images_and_hidden_iframe(),
            MemorySurface::new(),
            config,
        );
        activate(&mut c);
        assert_eq!(c.page().wakeups_armed(), 0, "activation pass");

        c.refresh(&mut Tracer::none());
        c.refresh(&mut Tracer::none());
        assert_eq!(c.page().wakeups_armed(), 0, "manual passes");
        assert_eq!(c.pending_deadline(), None);

        c.on_layout_event(LayoutEvent::Mutation, HostTime(0), &mut Tracer::none());
        c.flush(&mut Tracer::none());
        assert_eq!(c.page().wakeups_armed(), 1, "only the mutation itself");
        assert_eq!(c.flush(&mut Tracer::none()), None, "the pass left nothing pending");
    }

    #[test]
    fn removed_target_loses_its_overlay() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);

        c.page_mut().remove(0);
        let summary = c.refresh(&mut Tracer::none()).unwrap();
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.rendered, 2);
        assert_eq!(c.surface().overlay_texts(), [EMPTY_ALT_TEXT, MISSING_ALT_TEXT]);
    }

    #[test]
    fn deactivate_drops_pending_pass() {
        let mut c = controller(three_images_and_hidden_iframe());
        activate(&mut c);
        c.on_layout_event(LayoutEvent::Resize, HostTime(0), &mut Tracer::none());
        c.deactivate(&mut Tracer::none());

        activate(&mut c);
        assert_eq!(c.pending_deadline(), None);
        assert_eq!(c.flush(&mut Tracer::none()), None);
    }
}
