//! Destinations for the lines written by the `print` operator.

use std::{cell::RefCell, rc::Rc, time::Instant};

/// A sink for text lines.
pub trait TextOutput {
  fn write(&mut self, text: &str);
}

/// Writes every line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutOutput;

impl TextOutput for StdoutOutput {
  fn write(&mut self, text: &str) { println!("{text}") }
}

/// Emits every line as a `tracing` event at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOutput;

impl TextOutput for TracingOutput {
  fn write(&mut self, text: &str) { tracing::info!(target: "rxdemand::print", "{text}") }
}

/// Prefixes every line with the time elapsed since the previous one, as
/// `+0.00042s: text`. Empty lines are skipped.
pub struct TimeLogger<W> {
  inner: W,
  previous: Option<Instant>,
}

impl<W: TextOutput> TimeLogger<W> {
  pub fn new(inner: W) -> Self { Self { inner, previous: None } }

  pub fn into_inner(self) -> W { self.inner }
}

impl Default for TimeLogger<StdoutOutput> {
  fn default() -> Self { Self::new(StdoutOutput) }
}

impl<W: TextOutput> TextOutput for TimeLogger<W> {
  fn write(&mut self, text: &str) {
    if text.is_empty() {
      return;
    }
    let now = Instant::now();
    let elapsed = self
      .previous
      .map_or(0.0, |previous| now.duration_since(previous).as_secs_f64());
    self.previous = Some(now);
    self.inner.write(&format!("{elapsed:+.5}s: {text}"));
  }
}

impl TextOutput for String {
  fn write(&mut self, text: &str) {
    self.push_str(text);
    self.push('\n');
  }
}

impl TextOutput for Vec<String> {
  fn write(&mut self, text: &str) { self.push(text.to_owned()) }
}

impl<W: TextOutput> TextOutput for Rc<RefCell<W>> {
  fn write(&mut self, text: &str) { self.borrow_mut().write(text) }
}
