// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-wide context.

use presentation_dispatch::{Task, UiDispatcher, UiHandle, WorkQueue, WorkQueueHandle};
use presentation_events::{EventManager, RoutedEvent, RoutedEventData, Scene};
use presentation_property::{Property, PropertyRegistry, PropertyValue, TypeKey};
use presentation_tree::{
    Capabilities, Detached, DigestReport, ElementId, FocusChange, FocusTransition, Item,
    ItemsHost, Tree,
};

use crate::config::PresentationConfig;
use crate::diagnostics::{DiagnosticsProperties, Rgba};
use crate::error::Result;
use crate::events::{InputEvents, Paired};
use crate::input::{
    FocusChangedArgs, GamePadButtonArgs, KeyArgs, MouseButtonArgs, MouseMoveArgs, MouseWheelArgs,
    TextInputArgs, TouchArgs, TouchPhase,
};

/// What one [`Presentation::frame`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter, starting at 1.
    pub frame: u64,
    /// UI continuations run before the digest.
    pub continuations: usize,
    /// Property changes found by the digest.
    pub digest: DigestReport,
    /// Graphics work items run after the digest.
    pub work_items: usize,
}

/// The registry, the element tree, the routed events and the thread
/// hand-off of one UI, owned by the UI thread.
///
/// Tree mutations that move keyboard focus, mouse capture or hover should
/// go through the methods here rather than [`Tree`] directly, so the
/// matching `Got*`/`Lost*` and `MouseEnter`/`MouseLeave` events are raised
/// and the handlers of destroyed elements are dropped.
pub struct Presentation {
    config: PresentationConfig,
    scene: Scene,
    events: EventManager<Scene>,
    input: InputEvents,
    diagnostics: DiagnosticsProperties,
    ui: UiDispatcher<Scene>,
    graphics: WorkQueue,
    last_mouse: Option<MouseMoveArgs>,
    frames: u64,
}

impl Presentation {
    /// Builds a registry with the core properties, an empty tree and the
    /// built-in events.
    ///
    /// The calling thread becomes the UI thread and the owner of the
    /// graphics [`WorkQueue`].
    pub fn new(config: PresentationConfig) -> Result<Self> {
        let mut scene = Scene::bootstrap()?;
        let diagnostics = DiagnosticsProperties::register(&mut scene.registry)?;
        let mut events = EventManager::new();
        let input = InputEvents::register(&mut events, scene.tree.core().ui_element)?;
        tracing::debug!(?config, "presentation ready");
        Ok(Self {
            config,
            scene,
            events,
            input,
            diagnostics,
            ui: UiDispatcher::new(),
            graphics: WorkQueue::new(),
            last_mouse: None,
            frames: 0,
        })
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    /// Returns the registry and tree.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the registry and tree for mutation.
    ///
    /// Use this to register application types and properties.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Returns the property registry.
    #[must_use]
    pub fn registry(&self) -> &PropertyRegistry {
        &self.scene.registry
    }

    /// Returns the element tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.scene.tree
    }

    /// Returns the routed event manager.
    #[must_use]
    pub fn events(&self) -> &EventManager<Scene> {
        &self.events
    }

    /// Returns the routed event manager for registering events and handlers.
    pub fn events_mut(&mut self) -> &mut EventManager<Scene> {
        &mut self.events
    }

    /// Returns the built-in input and focus events.
    #[must_use]
    pub fn input_events(&self) -> &InputEvents {
        &self.input
    }

    /// Returns the diagnostics attached properties.
    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticsProperties {
        &self.diagnostics
    }

    /// Creates a detached element.
    pub fn create(&mut self, ty: TypeKey, caps: Capabilities) -> ElementId {
        self.scene.tree.create(ty, caps)
    }

    /// Appends `child` to `parent`. See [`Tree::insert_child`].
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.scene
            .tree
            .append_child(&self.scene.registry, parent, child)?;
        self.sync_hover()
    }

    /// Inserts `child` at `index` among the children of `parent`.
    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) -> Result<()> {
        self.scene
            .tree
            .insert_child(&self.scene.registry, parent, index, child)?;
        self.sync_hover()
    }

    /// Detaches `child` from `parent`.
    ///
    /// Focus and capture inside the subtree are released first; then
    /// `LostKeyboardFocus` and `LostMouseCapture` are raised on their former
    /// holders, which now route only within the detached subtree.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<Detached> {
        let detached = self
            .scene
            .tree
            .remove_child(&self.scene.registry, parent, child)?;
        self.report_detached(detached)?;
        self.sync_hover()?;
        Ok(detached)
    }

    /// Destroys `id` and its logical subtree and drops their handlers.
    ///
    /// Lost focus and capture events are not raised on destroyed elements.
    pub fn destroy(&mut self, id: ElementId) -> Result<Detached> {
        let doomed = self.scene.tree.subtree(id);
        let detached = self.scene.tree.destroy(&self.scene.registry, id)?;
        self.drop_dead_handlers(doomed);
        self.report_detached(detached)?;
        self.sync_hover()?;
        Ok(detached)
    }

    /// Installs the items host behavior of `host`. See [`Tree::set_items_host`].
    pub fn set_items_host(&mut self, host: ElementId, behavior: Box<dyn ItemsHost>) -> Result<()> {
        Ok(self.scene.tree.set_items_host(host, behavior)?)
    }

    /// Appends an item to `host` and returns its container.
    pub fn add_item(&mut self, host: ElementId, panel: ElementId, item: Item) -> Result<ElementId> {
        let index = self.scene.tree.item_count(host);
        self.insert_item(host, panel, index, item)
    }

    /// Inserts an item at `index` and returns its container, placed into
    /// `panel`. See [`Tree::insert_item`].
    pub fn insert_item(
        &mut self,
        host: ElementId,
        panel: ElementId,
        index: usize,
        item: Item,
    ) -> Result<ElementId> {
        let container =
            self.scene
                .tree
                .insert_item(&self.scene.registry, host, panel, index, item)?;
        self.sync_hover()?;
        Ok(container)
    }

    /// Removes the item at `index` from `host`.
    ///
    /// A generated container is destroyed and its handlers dropped; an
    /// element that was its own container is only detached. Lost focus and
    /// capture are reported like [`remove_child`](Self::remove_child).
    pub fn remove_item(&mut self, host: ElementId, index: usize) -> Result<(Item, Detached)> {
        let doomed = self
            .scene
            .tree
            .item_containers(host)
            .nth(index)
            .map(|container| self.scene.tree.subtree(container))
            .unwrap_or_default();
        let (item, detached) = self
            .scene
            .tree
            .remove_item(&self.scene.registry, host, index)?;
        self.drop_dead_handlers(doomed);
        self.report_detached(detached)?;
        self.sync_hover()?;
        Ok((item, detached))
    }

    /// Returns the effective value of `property` on `id`.
    pub fn get_value<T: PropertyValue>(&self, id: ElementId, property: Property<T>) -> Result<T> {
        Ok(self.scene.tree.get_value(&self.scene.registry, id, property)?)
    }

    /// Sets the local value of `property` on `id`.
    pub fn set_value<T: PropertyValue>(
        &mut self,
        id: ElementId,
        property: Property<T>,
        value: T,
    ) -> Result<()> {
        Ok(self
            .scene
            .tree
            .set_value(&self.scene.registry, id, property, value)?)
    }

    /// Moves keyboard focus to `id`.
    ///
    /// Raises `LostKeyboardFocus` on the old holder and `GotKeyboardFocus` on
    /// `id`. Returns `false` if `id` already had focus.
    pub fn focus(&mut self, id: ElementId) -> Result<bool> {
        let change = self.scene.tree.focus(&self.scene.registry, id)?;
        self.raise_keyboard_transfer(change)
    }

    /// Clears keyboard focus. Returns `false` if nothing had focus.
    pub fn clear_focus(&mut self) -> Result<bool> {
        let change = self.scene.tree.clear_focus(&self.scene.registry);
        self.raise_keyboard_transfer(change)
    }

    /// Captures the mouse to `id`.
    ///
    /// While captured, mouse input goes to `id` regardless of the hit target.
    pub fn capture_mouse(&mut self, id: ElementId) -> Result<bool> {
        let change = self.scene.tree.capture_mouse(&self.scene.registry, id)?;
        self.raise_capture_transfer(change)
    }

    /// Releases mouse capture. Returns `false` if nothing had capture.
    pub fn release_mouse_capture(&mut self) -> Result<bool> {
        let change = self.scene.tree.release_mouse_capture(&self.scene.registry);
        self.raise_capture_transfer(change)
    }

    /// Raises `PreviewKeyDown` and `KeyDown` on the focused element.
    ///
    /// Returns `None` when nothing has focus.
    pub fn raise_key_down(&mut self, args: KeyArgs) -> Result<Option<RoutedEventData>> {
        let target = self.scene.tree.focused();
        self.route_input(target, self.input.key_down, args)
    }

    /// Raises `PreviewKeyUp` and `KeyUp` on the focused element.
    pub fn raise_key_up(&mut self, args: KeyArgs) -> Result<Option<RoutedEventData>> {
        let target = self.scene.tree.focused();
        self.route_input(target, self.input.key_up, args)
    }

    /// Raises `PreviewTextInput` and `TextInput` on the focused element.
    pub fn raise_text_input(&mut self, args: TextInputArgs) -> Result<Option<RoutedEventData>> {
        let target = self.scene.tree.focused();
        self.route_input(target, self.input.text_input, args)
    }

    /// Raises `PreviewMouseMove` and `MouseMove` on the capturing element,
    /// or on `hit` when the mouse is not captured.
    ///
    /// `hit` is the element under the pointer as found by the layout
    /// collaborator. Hover follows `hit` even while the mouse is captured:
    /// `MouseLeave` and `MouseEnter` are raised for the elements whose
    /// `IsMouseOver` flips, before the move itself.
    pub fn raise_mouse_move(
        &mut self,
        hit: Option<ElementId>,
        args: MouseMoveArgs,
    ) -> Result<Option<RoutedEventData>> {
        self.last_mouse = Some(args);
        let transitions = self.scene.tree.set_mouse_over(&self.scene.registry, hit);
        self.raise_hover(transitions)?;
        let target = self.mouse_target(hit);
        self.route_input(target, self.input.mouse_move, args)
    }

    /// Raises the mouse down or up pair, depending on `args.pressed`.
    pub fn raise_mouse_button(
        &mut self,
        hit: Option<ElementId>,
        args: MouseButtonArgs,
    ) -> Result<Option<RoutedEventData>> {
        let target = self.mouse_target(hit);
        let events = if args.pressed {
            self.input.mouse_down
        } else {
            self.input.mouse_up
        };
        self.route_input(target, events, args)
    }

    /// Raises `PreviewMouseWheel` and `MouseWheel`.
    pub fn raise_mouse_wheel(
        &mut self,
        hit: Option<ElementId>,
        args: MouseWheelArgs,
    ) -> Result<Option<RoutedEventData>> {
        let target = self.mouse_target(hit);
        self.route_input(target, self.input.mouse_wheel, args)
    }

    /// Raises the touch pair matching `args.phase` on `hit`.
    pub fn raise_touch(
        &mut self,
        hit: Option<ElementId>,
        args: TouchArgs,
    ) -> Result<Option<RoutedEventData>> {
        let events = match args.phase {
            TouchPhase::Down => self.input.touch_down,
            TouchPhase::Move => self.input.touch_move,
            TouchPhase::Up => self.input.touch_up,
        };
        self.route_input(hit, events, args)
    }

    /// Raises the game pad button down or up pair on the focused element.
    pub fn raise_gamepad_button(
        &mut self,
        args: GamePadButtonArgs,
    ) -> Result<Option<RoutedEventData>> {
        let target = self.scene.tree.focused();
        let events = if args.pressed {
            self.input.game_pad_button_down
        } else {
            self.input.game_pad_button_up
        };
        self.route_input(target, events, args)
    }

    /// Returns the UI thread's continuation queue.
    ///
    /// Continuations get the [`Scene`] and run during [`frame`](Self::frame).
    #[must_use]
    pub fn ui_dispatcher(&self) -> &UiDispatcher<Scene> {
        &self.ui
    }

    /// Returns a handle worker threads can post continuations through.
    #[must_use]
    pub fn ui_handle(&self) -> UiHandle<Scene> {
        self.ui.handle()
    }

    /// Starts `work` on a worker thread.
    pub fn spawn_background<T, F>(&self, work: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.ui.spawn_background(work)
    }

    /// Blocks for `task` up to the configured background timeout.
    ///
    /// A timeout leaves the task running; wait again or subscribe with
    /// [`Task::then_on_ui`].
    pub fn wait<T: Send + 'static>(&self, task: &Task<T>) -> Result<T> {
        Ok(task.wait_timeout(self.config.background_timeout())?)
    }

    /// Returns the graphics work queue owned by this thread.
    #[must_use]
    pub fn graphics(&self) -> &WorkQueue {
        &self.graphics
    }

    /// Returns a handle for queueing graphics work from any thread.
    #[must_use]
    pub fn graphics_handle(&self) -> WorkQueueHandle {
        self.graphics.handle()
    }

    /// Runs one frame.
    ///
    /// Pending UI continuations run first so their writes land in this
    /// frame's digest. Then the digest runs, and then, if configured, the
    /// queued graphics work.
    pub fn frame(&mut self) -> FrameReport {
        self.frames += 1;
        let continuations = self
            .ui
            .run_pending_limited(&mut self.scene, self.config.max_continuations_per_frame());
        let digest = self.scene.tree.digest(&self.scene.registry);
        let work_items = if self.config.process_graphics_in_frame() {
            self.graphics
                .process_limited(self.config.max_graphics_items_per_frame())
        } else {
            0
        };
        tracing::trace!(
            frame = self.frames,
            continuations,
            changes = digest.len(),
            work_items,
            "frame"
        );
        FrameReport {
            frame: self.frames,
            continuations,
            digest,
            work_items,
        }
    }

    /// Turns the visual bounds outline of `id` on or off.
    pub fn set_draw_visual_bounds(&mut self, id: ElementId, enabled: bool) -> Result<()> {
        let property = self.diagnostics.draw_visual_bounds;
        self.set_value(id, property, enabled)
    }

    /// Returns the elements under `root` that want their bounds outlined,
    /// with the outline color, in pre-order.
    pub fn visual_bounds_overlays(&self, root: ElementId) -> Result<Vec<(ElementId, Rgba)>> {
        let mut overlays = Vec::new();
        for id in self.scene.tree.subtree(root) {
            if self.get_value(id, self.diagnostics.draw_visual_bounds)? {
                let color = self.get_value(id, self.diagnostics.draw_visual_bounds_color)?;
                overlays.push((id, color));
            }
        }
        Ok(overlays)
    }

    fn mouse_target(&self, hit: Option<ElementId>) -> Option<ElementId> {
        self.scene.tree.mouse_captured().or(hit)
    }

    fn route_input<E: 'static>(
        &mut self,
        target: Option<ElementId>,
        events: Paired<E>,
        mut payload: E,
    ) -> Result<Option<RoutedEventData>> {
        let Some(target) = target.filter(|t| self.scene.tree.is_alive(*t)) else {
            tracing::trace!("input without a target dropped");
            return Ok(None);
        };
        let data = self.events.raise_paired(
            &mut self.scene,
            target,
            events.preview,
            events.main,
            &mut payload,
        )?;
        Ok(Some(data))
    }

    fn raise_keyboard_transfer(&mut self, change: Option<FocusChange>) -> Result<bool> {
        let (lost, got) = (self.input.lost_keyboard_focus, self.input.got_keyboard_focus);
        self.raise_transfer(change, lost, got)
    }

    fn raise_capture_transfer(&mut self, change: Option<FocusChange>) -> Result<bool> {
        let (lost, got) = (self.input.lost_mouse_capture, self.input.got_mouse_capture);
        self.raise_transfer(change, lost, got)
    }

    fn raise_transfer(
        &mut self,
        change: Option<FocusChange>,
        lost: RoutedEvent<FocusChangedArgs>,
        got: RoutedEvent<FocusChangedArgs>,
    ) -> Result<bool> {
        let Some(change) = change else {
            return Ok(false);
        };
        let args = FocusChangedArgs {
            old: change.old,
            new: change.new,
        };
        if let Some(old) = change.old {
            self.raise_on_live(old, lost, args)?;
        }
        if let Some(new) = change.new {
            self.raise_on_live(new, got, args)?;
        }
        Ok(true)
    }

    fn report_detached(&mut self, detached: Detached) -> Result<()> {
        if let Some(old) = detached.lost_focus {
            let args = FocusChangedArgs { old: Some(old), new: None };
            self.raise_on_live(old, self.input.lost_keyboard_focus, args)?;
        }
        if let Some(old) = detached.lost_capture {
            let args = FocusChangedArgs { old: Some(old), new: None };
            self.raise_on_live(old, self.input.lost_mouse_capture, args)?;
        }
        Ok(())
    }

    /// Drops the handlers of the elements in `doomed` that no longer exist.
    fn drop_dead_handlers(&mut self, doomed: Vec<ElementId>) {
        let handlers: usize = doomed
            .into_iter()
            .filter(|element| !self.scene.tree.is_alive(*element))
            .map(|element| self.events.remove_handlers_for(element))
            .sum();
        if handlers > 0 {
            tracing::debug!(handlers, "dropped handlers of destroyed elements");
        }
    }

    /// Re-derives hover after a structural change and reports it.
    fn sync_hover(&mut self) -> Result<()> {
        let transitions = self.scene.tree.refresh_mouse_over(&self.scene.registry);
        self.raise_hover(transitions)
    }

    fn raise_hover(&mut self, transitions: Vec<FocusTransition<ElementId>>) -> Result<()> {
        let Some(mut args) = self.last_mouse else {
            return Ok(());
        };
        for transition in transitions {
            let (id, event) = match transition {
                FocusTransition::Enter(id) => (id, self.input.mouse_enter),
                FocusTransition::Leave(id) => (id, self.input.mouse_leave),
            };
            if self.scene.tree.is_alive(id) {
                self.events.raise(&mut self.scene, id, event, &mut args)?;
            }
        }
        Ok(())
    }

    fn raise_on_live(
        &mut self,
        source: ElementId,
        event: RoutedEvent<FocusChangedArgs>,
        mut args: FocusChangedArgs,
    ) -> Result<()> {
        if self.scene.tree.is_alive(source) {
            self.events.raise(&mut self.scene, source, event, &mut args)?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Presentation")
            .field("config", &self.config)
            .field("elements", &self.scene.tree.len())
            .field("events", &self.events.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
