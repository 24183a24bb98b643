use pretty_assertions::assert_eq;

use typewright::model::Keystroke;
use typewright::trace::console_trace;

fn typed(text: &str) -> Vec<Keystroke> {
    text.chars().map(|ch| Keystroke::Char { ch }).collect()
}

fn backspaces(n: usize) -> Vec<Keystroke> {
    vec![Keystroke::Backspace; n]
}

fn trace_events(events: &[Keystroke]) -> Vec<(usize, String)> {
    console_trace(events)
        .into_iter()
        .map(|e| (e.event_index, e.line))
        .collect()
}

#[test]
fn plain_typing_is_one_run() {
    let events = typed("a\nb \"c\"");
    assert_eq!(
        trace_events(&events),
        vec![(0, "Typing \"a\\nb \\\"c\\\"\"...".to_string())]
    );
}

#[test]
fn synonym_swap_reads_as_a_replacement() {
    let mut events = typed("I am glad");
    let erase_at = events.len();
    events.extend(backspaces(4));
    events.extend(typed("happy. Bye"));

    assert_eq!(
        trace_events(&events),
        vec![
            (0, "Typing \"I am glad\"...".to_string()),
            (erase_at, "Replace \"glad\" with \"happy\"...".to_string()),
            (erase_at + 9, "Typing \". Bye\"...".to_string()),
        ]
    );
}

#[test]
fn corrected_typo_is_logged_at_the_backspace() {
    let events = vec![
        Keystroke::Char { ch: 'a' },
        Keystroke::Wait { secs: 0.2 },
        Keystroke::Char { ch: 'v' },
        Keystroke::Wait { secs: 0.06 },
        Keystroke::Backspace,
        Keystroke::Wait { secs: 0.04 },
        Keystroke::Char { ch: 'b' },
        Keystroke::Wait { secs: 0.2 },
    ];

    assert_eq!(
        trace_events(&events),
        vec![
            (0, "Typing \"av\"...".to_string()),
            (4, "Replace \"v\" with \"b\"...".to_string()),
        ]
    );
}

#[test]
fn erasing_without_retyping_logs_nothing_extra() {
    let mut events = typed("oops");
    events.extend(backspaces(2));
    assert_eq!(
        trace_events(&events),
        vec![(0, "Typing \"oops\"...".to_string())]
    );
}

#[test]
fn empty_log_has_no_lines() {
    assert!(console_trace(&[]).is_empty());
}
