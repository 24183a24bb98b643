use crate::model::Keystroke;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Index of the first keystroke the line describes.
    pub event_index: usize,
    pub line: String,
}

#[derive(Debug, Default, Clone)]
struct Correction {
    start_index: usize,
    deleted: Vec<char>,
    inserted: String,
}

impl Correction {
    fn deleted_string(&self) -> String {
        self.deleted.iter().rev().collect()
    }

    fn has_replace(&self) -> bool {
        !self.deleted.is_empty() && !self.inserted.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
struct Tracer {
    buf: Vec<char>,
    typing_run_start: Option<usize>,
    typing_run: String,
    correction: Option<Correction>,
    events: Vec<TraceEvent>,
}

impl Tracer {
    fn observe(&mut self, index: usize, event: &Keystroke) {
        match event {
            Keystroke::Char { ch } => self.handle_char(index, *ch),
            Keystroke::Backspace => self.handle_backspace(index),
            Keystroke::Wait { .. } => {}
        }
    }

    fn finish(&mut self) {
        self.finish_correction();
        self.flush_typing_run();
    }

    fn flush_typing_run(&mut self) {
        let Some(start) = self.typing_run_start.take() else {
            self.typing_run.clear();
            return;
        };
        if self.typing_run.is_empty() {
            return;
        }

        self.events.push(TraceEvent {
            event_index: start,
            line: format!("Typing \"{}\"...", escape_for_log(&self.typing_run)),
        });
        self.typing_run.clear();
    }

    fn finish_correction(&mut self) {
        let Some(correction) = self.correction.take() else {
            return;
        };
        if !correction.has_replace() {
            return;
        }

        self.events.push(TraceEvent {
            event_index: correction.start_index,
            line: format!(
                "Replace \"{}\" with \"{}\"...",
                escape_for_log(&correction.deleted_string()),
                escape_for_log(&correction.inserted)
            ),
        });
    }

    fn handle_backspace(&mut self, index: usize) {
        if self.correction.as_ref().is_some_and(Correction::has_replace) {
            self.finish_correction();
        }

        self.flush_typing_run();
        let correction = self.correction.get_or_insert_with(|| Correction {
            start_index: index,
            ..Default::default()
        });
        if let Some(c) = self.buf.pop() {
            correction.deleted.push(c);
        }
    }

    fn handle_char(&mut self, index: usize, c: char) {
        if !is_word_char(c) && self.correction.as_ref().is_some_and(Correction::has_replace) {
            self.finish_correction();
        }

        self.buf.push(c);

        if let Some(correction) = &mut self.correction {
            correction.inserted.push(c);
            if !is_word_char(c) {
                self.finish_correction();
            }
            return;
        }

        if self.typing_run.is_empty() {
            self.typing_run_start = Some(index);
        }
        self.typing_run.push(c);
    }
}

/// Human-readable lines describing a keystroke log: runs of plain typing and the
/// replacements made by backspacing.
pub fn console_trace(events: &[Keystroke]) -> Vec<TraceEvent> {
    let mut tracer = Tracer::default();
    for (index, event) in events.iter().enumerate() {
        tracer.observe(index, event);
    }
    tracer.finish();

    tracer.events.sort_by_key(|event| event.event_index);
    tracer.events
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\''
}

fn escape_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
