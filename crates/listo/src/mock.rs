//! In-memory driver for testing page models without a browser.
//!
//! [`MockDriver`] keeps a fake DOM keyed by locator. Element state stays
//! mutable after placement and handles read it live, so tests can exercise
//! the same staleness and re-resolution behavior the real resolution layer is
//! built around. Resolution calls are counted per locator, which is what
//! makes short-circuit behavior observable.
//!
//! [`StepClock`] and [`StepSleeper`] provide fake time for polling waits:
//! sleeping advances the clock instead of blocking.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::driver::{Driver, Element, Point, Rect, Size};
use crate::locator::Locator;
use crate::result::{ListoError, ListoResult};
use crate::wait::{Clock, Interrupted, Sleeper};

/// State of one fake element
#[derive(Debug, Clone)]
pub struct MockElementState {
    /// Tag name reported by the element
    pub tag_name: String,
    /// Visible text
    pub text: String,
    /// Whether the element is displayed
    pub displayed: bool,
    /// Whether the element is enabled
    pub enabled: bool,
    /// Whether the element is selected/checked
    pub selected: bool,
    /// HTML attributes
    pub attributes: HashMap<String, String>,
    /// Computed CSS values
    pub css: HashMap<String, String>,
    /// Location and size
    pub rect: Rect,
    /// Number of clicks received
    pub clicks: usize,
    /// Number of clears received
    pub clears: usize,
    /// Number of submits received
    pub submits: usize,
    /// Keystroke batches received
    pub keys: Vec<String>,
}

impl Default for MockElementState {
    fn default() -> Self {
        Self {
            tag_name: "div".to_string(),
            text: String::new(),
            displayed: true,
            enabled: true,
            selected: false,
            attributes: HashMap::new(),
            css: HashMap::new(),
            rect: Rect::default(),
            clicks: 0,
            clears: 0,
            submits: 0,
            keys: Vec::new(),
        }
    }
}

impl MockElementState {
    /// A displayed, enabled element with no text
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag name
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = tag.into();
        self
    }

    /// Set the visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark the element as not displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark the element as disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Mark the element as selected
    #[must_use]
    pub const fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Set an HTML attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed CSS value
    #[must_use]
    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    /// Set location and size
    #[must_use]
    pub const fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }
}

#[derive(Debug, Default)]
struct MockDom {
    elements: HashMap<String, Vec<MockElementState>>,
    find_one_calls: HashMap<String, usize>,
    find_all_calls: HashMap<String, usize>,
    navigations: Vec<String>,
    current_url: String,
    refreshes: usize,
    backs: usize,
    forwards: usize,
    script_results: HashMap<String, Value>,
    scripts_run: Vec<String>,
    quit_calls: usize,
}

fn key(locator: &Locator) -> String {
    locator.to_string()
}

/// In-memory [`Driver`] implementation for tests
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    dom: Rc<RefCell<MockDom>>,
}

impl MockDriver {
    /// Create a driver over an empty DOM
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element resolvable by `locator`
    pub fn place(&self, locator: &Locator, state: MockElementState) {
        self.dom
            .borrow_mut()
            .elements
            .entry(key(locator))
            .or_default()
            .push(state);
    }

    /// Add `count` copies of an element resolvable by `locator`
    pub fn place_many(&self, locator: &Locator, count: usize, state: &MockElementState) {
        for _ in 0..count {
            self.place(locator, state.clone());
        }
    }

    /// Remove every element resolvable by `locator`
    pub fn remove_all(&self, locator: &Locator) {
        self.dom.borrow_mut().elements.remove(&key(locator));
    }

    /// Mutate the state of the element at `index` under `locator`
    pub fn update(&self, locator: &Locator, index: usize, f: impl FnOnce(&mut MockElementState)) {
        if let Some(state) = self
            .dom
            .borrow_mut()
            .elements
            .get_mut(&key(locator))
            .and_then(|all| all.get_mut(index))
        {
            f(state);
        }
    }

    /// How many times `find_one` ran for `locator`
    #[must_use]
    pub fn find_one_count(&self, locator: &Locator) -> usize {
        self.dom
            .borrow()
            .find_one_calls
            .get(&key(locator))
            .copied()
            .unwrap_or(0)
    }

    /// How many times `find_all` ran for `locator`
    #[must_use]
    pub fn find_all_count(&self, locator: &Locator) -> usize {
        self.dom
            .borrow()
            .find_all_calls
            .get(&key(locator))
            .copied()
            .unwrap_or(0)
    }

    /// How many times any resolution ran for `locator`
    #[must_use]
    pub fn resolution_count(&self, locator: &Locator) -> usize {
        self.find_one_count(locator) + self.find_all_count(locator)
    }

    /// Every URL navigated to, in order
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.dom.borrow().navigations.clone()
    }

    /// Clicks received by the first element under `locator`
    #[must_use]
    pub fn clicks(&self, locator: &Locator) -> usize {
        self.dom
            .borrow()
            .elements
            .get(&key(locator))
            .and_then(|all| all.first())
            .map_or(0, |state| state.clicks)
    }

    /// Keystroke batches received by the first element under `locator`
    #[must_use]
    pub fn keys_sent(&self, locator: &Locator) -> Vec<String> {
        self.dom
            .borrow()
            .elements
            .get(&key(locator))
            .and_then(|all| all.first())
            .map(|state| state.keys.clone())
            .unwrap_or_default()
    }

    /// How many times the page was refreshed
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.dom.borrow().refreshes
    }

    /// How many times history went back
    #[must_use]
    pub fn back_count(&self) -> usize {
        self.dom.borrow().backs
    }

    /// How many times history went forward
    #[must_use]
    pub fn forward_count(&self) -> usize {
        self.dom.borrow().forwards
    }

    /// Fix the value returned when `script` is executed
    pub fn set_script_result(&self, script: impl Into<String>, result: Value) {
        self.dom
            .borrow_mut()
            .script_results
            .insert(script.into(), result);
    }

    /// Every script executed, in order
    #[must_use]
    pub fn scripts_run(&self) -> Vec<String> {
        self.dom.borrow().scripts_run.clone()
    }

    /// How many times `quit` ran
    #[must_use]
    pub fn quit_calls(&self) -> usize {
        self.dom.borrow().quit_calls
    }

    fn handle(&self, locator: &Locator, index: usize) -> MockElement {
        MockElement {
            dom: Rc::clone(&self.dom),
            key: key(locator),
            index,
        }
    }
}

impl Driver for MockDriver {
    fn find_one(&self, locator: &Locator) -> ListoResult<Box<dyn Element>> {
        let locator_key = key(locator);
        let mut dom = self.dom.borrow_mut();
        *dom.find_one_calls.entry(locator_key.clone()).or_default() += 1;
        let found = dom
            .elements
            .get(&locator_key)
            .is_some_and(|all| !all.is_empty());
        drop(dom);

        if found {
            Ok(Box::new(self.handle(locator, 0)))
        } else {
            Err(ListoError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    fn find_all(&self, locator: &Locator) -> ListoResult<Vec<Box<dyn Element>>> {
        let locator_key = key(locator);
        let mut dom = self.dom.borrow_mut();
        *dom.find_all_calls.entry(locator_key.clone()).or_default() += 1;
        let count = dom.elements.get(&locator_key).map_or(0, Vec::len);
        drop(dom);

        Ok((0..count)
            .map(|index| Box::new(self.handle(locator, index)) as Box<dyn Element>)
            .collect())
    }

    fn goto(&mut self, url: &str) -> ListoResult<()> {
        let mut dom = self.dom.borrow_mut();
        dom.navigations.push(url.to_string());
        dom.current_url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> ListoResult<String> {
        Ok(self.dom.borrow().current_url.clone())
    }

    fn refresh(&mut self) -> ListoResult<()> {
        self.dom.borrow_mut().refreshes += 1;
        Ok(())
    }

    fn back(&mut self) -> ListoResult<()> {
        self.dom.borrow_mut().backs += 1;
        Ok(())
    }

    fn forward(&mut self) -> ListoResult<()> {
        self.dom.borrow_mut().forwards += 1;
        Ok(())
    }

    fn execute_script(
        &mut self,
        script: &str,
        _async_script: bool,
        _args: &[Value],
    ) -> ListoResult<Value> {
        let mut dom = self.dom.borrow_mut();
        dom.scripts_run.push(script.to_string());
        Ok(dom.script_results.get(script).cloned().unwrap_or(Value::Null))
    }

    fn quit(&mut self) -> ListoResult<()> {
        self.dom.borrow_mut().quit_calls += 1;
        Ok(())
    }
}

/// Handle to one fake element; reads state live from the fake DOM
pub struct MockElement {
    dom: Rc<RefCell<MockDom>>,
    key: String,
    index: usize,
}

impl std::fmt::Debug for MockElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockElement")
            .field("key", &self.key)
            .field("index", &self.index)
            .finish()
    }
}

impl MockElement {
    fn read<T>(&self, f: impl FnOnce(&MockElementState) -> T) -> ListoResult<T> {
        self.dom
            .borrow()
            .elements
            .get(&self.key)
            .and_then(|all| all.get(self.index))
            .map(f)
            .ok_or_else(|| ListoError::ElementNotFound {
                locator: self.key.clone(),
            })
    }

    fn write<T>(&self, f: impl FnOnce(&mut MockElementState) -> T) -> ListoResult<T> {
        self.dom
            .borrow_mut()
            .elements
            .get_mut(&self.key)
            .and_then(|all| all.get_mut(self.index))
            .map(f)
            .ok_or_else(|| ListoError::ElementNotFound {
                locator: self.key.clone(),
            })
    }
}

impl Element for MockElement {
    fn is_displayed(&self) -> ListoResult<bool> {
        self.read(|state| state.displayed)
    }

    fn is_enabled(&self) -> ListoResult<bool> {
        self.read(|state| state.enabled)
    }

    fn is_selected(&self) -> ListoResult<bool> {
        self.read(|state| state.selected)
    }

    fn attribute(&self, name: &str) -> ListoResult<Option<String>> {
        self.read(|state| state.attributes.get(name).cloned())
    }

    fn css_value(&self, property: &str) -> ListoResult<String> {
        self.read(|state| state.css.get(property).cloned().unwrap_or_default())
    }

    fn tag_name(&self) -> ListoResult<String> {
        self.read(|state| state.tag_name.clone())
    }

    fn text(&self) -> ListoResult<String> {
        self.read(|state| state.text.clone())
    }

    fn location(&self) -> ListoResult<Point> {
        self.read(|state| state.rect.origin())
    }

    fn size(&self) -> ListoResult<Size> {
        self.read(|state| state.rect.size())
    }

    fn rect(&self) -> ListoResult<Rect> {
        self.read(|state| state.rect)
    }

    fn click(&self) -> ListoResult<()> {
        self.write(|state| state.clicks += 1)
    }

    fn clear(&self) -> ListoResult<()> {
        self.write(|state| state.clears += 1)
    }

    fn send_keys(&self, keys: &str) -> ListoResult<()> {
        self.write(|state| state.keys.push(keys.to_string()))
    }

    fn submit(&self) -> ListoResult<()> {
        self.write(|state| state.submits += 1)
    }
}

/// Fake monotonic clock; time advances only when told to
#[derive(Debug, Clone)]
pub struct StepClock {
    base: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StepClock {
    /// A clock at fake-time zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Advance fake time by `duration`
    pub fn advance(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }

    /// Fake time elapsed since construction
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }
}

impl Clock for StepClock {
    fn later_by(&self, duration: Duration) -> Instant {
        self.now() + duration
    }

    fn is_now_before(&self, deadline: Instant) -> bool {
        self.now() < deadline
    }
}

type Scheduled = (usize, Box<dyn FnOnce()>);

/// Fake sleeper that advances a [`StepClock`] instead of blocking.
///
/// Can inject a single interruption and run scheduled callbacks after a given
/// number of sleeps, which is how wait tests make elements appear mid-poll.
#[derive(Clone)]
pub struct StepSleeper {
    clock: StepClock,
    sleeps: Rc<Cell<usize>>,
    interrupt_next: Rc<Cell<bool>>,
    scheduled: Rc<RefCell<Vec<Scheduled>>>,
}

impl std::fmt::Debug for StepSleeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepSleeper")
            .field("sleeps", &self.sleeps.get())
            .finish_non_exhaustive()
    }
}

impl StepSleeper {
    /// A sleeper driving `clock`
    #[must_use]
    pub fn new(clock: StepClock) -> Self {
        Self {
            clock,
            sleeps: Rc::new(Cell::new(0)),
            interrupt_next: Rc::new(Cell::new(false)),
            scheduled: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// How many sleeps have happened
    #[must_use]
    pub fn sleep_count(&self) -> usize {
        self.sleeps.get()
    }

    /// Report the next sleep as interrupted (it still advances the clock)
    pub fn interrupt_next(&self) {
        self.interrupt_next.set(true);
    }

    /// Run `action` once the sleep counter reaches `after_sleeps`
    pub fn run_after_sleeps(&self, after_sleeps: usize, action: impl FnOnce() + 'static) {
        self.scheduled
            .borrow_mut()
            .push((after_sleeps, Box::new(action)));
    }

    fn fire_scheduled(&self, count: usize) {
        let due: Vec<Scheduled> = {
            let mut scheduled = self.scheduled.borrow_mut();
            let mut due = Vec::new();
            let mut index = 0;
            while index < scheduled.len() {
                if scheduled[index].0 <= count {
                    due.push(scheduled.swap_remove(index));
                } else {
                    index += 1;
                }
            }
            due
        };
        for (_, action) in due {
            action();
        }
    }
}

impl Sleeper for StepSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        self.clock.advance(duration);
        let count = self.sleeps.get() + 1;
        self.sleeps.set(count);
        self.fire_scheduled(count);
        if self.interrupt_next.replace(false) {
            return Err(Interrupted);
        }
        Ok(())
    }
}
