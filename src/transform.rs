use std::thread;
use std::time::Duration;

/// A per-item transformation applied by a stage.
///
/// Implementations consume the input string and return either a new owned
/// output string or `None` to drop the item. The end-of-stream marker never
/// reaches a transformation; workers handle it before calling [`apply`].
///
/// [`apply`]: Transform::apply
pub trait Transform: Send + 'static {
    /// Transform one item. `None` drops it.
    fn apply(&mut self, input: String) -> Option<String>;

    /// The stage name this transformation is registered under
    fn name(&self) -> &str;
}

/// Resolve a stage name to a fresh transformation instance.
///
/// Every call returns an independent instance, so the same name may appear
/// multiple times in one pipeline without any shared state.
pub fn resolve(name: &str) -> Option<Box<dyn Transform>> {
    match name {
        "upper" => Some(Box::new(Uppercase)),
        "rot" => Some(Box::new(RotateRight)),
        "flip" => Some(Box::new(Reverse)),
        "expand" => Some(Box::new(Expand)),
        "throttle" => Some(Box::<Throttle>::default()),
        "log" => Some(Box::new(Identity)),
        _ => None,
    }
}

/// Names of all registered transformations, in usage-screen order
pub fn names() -> &'static [&'static str] {
    &["upper", "rot", "flip", "expand", "throttle", "log"]
}

/// Converts every ASCII letter to uppercase
#[derive(Debug)]
pub struct Uppercase;

impl Transform for Uppercase {
    fn apply(&mut self, input: String) -> Option<String> {
        Some(input.to_ascii_uppercase())
    }

    fn name(&self) -> &str {
        "upper"
    }
}

/// Moves every character one position right; the last character wraps to the front
#[derive(Debug)]
pub struct RotateRight;

impl Transform for RotateRight {
    fn apply(&mut self, input: String) -> Option<String> {
        let mut chars: Vec<char> = input.chars().collect();
        if let Some(last) = chars.pop() {
            chars.insert(0, last);
        }
        Some(chars.into_iter().collect())
    }

    fn name(&self) -> &str {
        "rot"
    }
}

/// Reverses the order of characters
#[derive(Debug)]
pub struct Reverse;

impl Transform for Reverse {
    fn apply(&mut self, input: String) -> Option<String> {
        Some(input.chars().rev().collect())
    }

    fn name(&self) -> &str {
        "flip"
    }
}

/// Inserts a single space between adjacent characters
#[derive(Debug)]
pub struct Expand;

impl Transform for Expand {
    fn apply(&mut self, input: String) -> Option<String> {
        let mut out = String::with_capacity(input.len() * 2);
        for (i, c) in input.chars().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push(c);
        }
        Some(out)
    }

    fn name(&self) -> &str {
        "expand"
    }
}

/// Emits items unchanged, pausing once per character.
///
/// The pause runs on the stage's worker thread, never under a queue lock, so
/// upstream stages keep draining and shutdown stays responsive.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
}

impl Throttle {
    /// Create a throttle with a custom per-character delay
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::with_delay(Duration::from_millis(100))
    }
}

impl Transform for Throttle {
    fn apply(&mut self, input: String) -> Option<String> {
        for _ in input.chars() {
            thread::sleep(self.delay);
        }
        Some(input)
    }

    fn name(&self) -> &str {
        "throttle"
    }
}

/// Passes every item through unchanged
#[derive(Debug)]
pub struct Identity;

impl Transform for Identity {
    fn apply(&mut self, input: String) -> Option<String> {
        Some(input)
    }

    fn name(&self) -> &str {
        "log"
    }
}
