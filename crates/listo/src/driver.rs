//! Abstract browser driver boundary.
//!
//! Listo does not speak any wire protocol itself: the embedder supplies a
//! [`Driver`] implementation (WebDriver, CDP, an in-memory fake, ...) and the
//! rest of the framework treats it as an opaque capability. The abstraction
//! also protects the core against backend API instability: swapping the
//! automation backend must not touch page objects or rules.

use serde_json::Value;

use crate::locator::Locator;
use crate::result::ListoResult;

/// A point in 2D page space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rendered size of an element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Size {
    /// Create a new size
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Location and size of an element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position of the top-left corner
    pub x: f32,
    /// Y position of the top-left corner
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Rect {
    /// Create a new rect
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The top-left corner
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The rendered size
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A live handle to one element resolved by a [`Driver`].
///
/// Handles are single-use by convention: the resolution layer re-resolves on
/// every access rather than holding one handle across DOM mutations. An
/// implementation should surface a detached element as
/// [`ElementNotFound`](crate::ListoError::ElementNotFound).
pub trait Element {
    /// Whether the element is currently displayed
    fn is_displayed(&self) -> ListoResult<bool>;

    /// Whether the element is currently enabled
    fn is_enabled(&self) -> ListoResult<bool>;

    /// Whether the element is currently selected or checked
    fn is_selected(&self) -> ListoResult<bool>;

    /// Value of an HTML attribute, if set
    fn attribute(&self, name: &str) -> ListoResult<Option<String>>;

    /// Computed value of a CSS property
    fn css_value(&self, property: &str) -> ListoResult<String>;

    /// Tag name of the element
    fn tag_name(&self) -> ListoResult<String>;

    /// Visible text of the element and its descendants, trimmed
    fn text(&self) -> ListoResult<String>;

    /// Location of the top-left corner
    fn location(&self) -> ListoResult<Point>;

    /// Rendered size
    fn size(&self) -> ListoResult<Size>;

    /// Location and size together
    fn rect(&self) -> ListoResult<Rect>;

    /// Click the element
    fn click(&self) -> ListoResult<()>;

    /// Clear the element's value
    fn clear(&self) -> ListoResult<()>;

    /// Type characters into the element
    fn send_keys(&self, keys: &str) -> ListoResult<()>;

    /// Submit the form the element belongs to
    fn submit(&self) -> ListoResult<()>;
}

/// The browser automation capability Listo is built on.
///
/// `find_one` must fail with [`ElementNotFound`](crate::ListoError::ElementNotFound)
/// when zero elements match; `find_all` returns an empty vector in that case,
/// which is a valid, non-error result.
pub trait Driver {
    /// Resolve the first element matching `locator`
    fn find_one(&self, locator: &Locator) -> ListoResult<Box<dyn Element>>;

    /// Resolve every element matching `locator`
    fn find_all(&self, locator: &Locator) -> ListoResult<Vec<Box<dyn Element>>>;

    /// Navigate to a URL
    fn goto(&mut self, url: &str) -> ListoResult<()>;

    /// URL of the current page
    fn current_url(&self) -> ListoResult<String>;

    /// Reload the current page
    fn refresh(&mut self) -> ListoResult<()>;

    /// Navigate back in history
    fn back(&mut self) -> ListoResult<()>;

    /// Navigate forward in history
    fn forward(&mut self) -> ListoResult<()>;

    /// Execute JavaScript on the current page.
    ///
    /// Arguments are interpolated as `arguments[n]`; `async_script` selects
    /// the driver's asynchronous execution mode.
    fn execute_script(
        &mut self,
        script: &str,
        async_script: bool,
        args: &[Value],
    ) -> ListoResult<Value>;

    /// Shut the browser session down
    fn quit(&mut self) -> ListoResult<()>;
}
