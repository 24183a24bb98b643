use std::fs;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use typewright::config::{Preferences, RunSettings};
use typewright::engine::TypingEngine;
use typewright::lexicon::Lexicon;
use typewright::model::{Keystroke, Mode, Transcript};
use typewright::progress::RunState;
use typewright::sim::{self, Timeline};

fn plan(settings: RunSettings, text: &str, lexicon: Lexicon, seed: u64) -> Transcript {
    let request = settings.into_request(text).expect("valid settings");
    let timeline = Timeline::new();
    let mut engine = TypingEngine::new(request, Arc::new(lexicon), StdRng::seed_from_u64(seed));
    let mut progress = Vec::new();
    engine
        .run(
            &mut timeline.clone(),
            &mut timeline.clone(),
            &mut progress,
            &RunState::new(),
        )
        .expect("dry run");
    timeline.transcript(engine.request())
}

#[test]
fn custom_lexicon_file_drives_swaps() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lexicon.json");
    fs::write(&path, r#"{"Sunny": ["bright"]}"#).expect("write lexicon");
    let lexicon = Lexicon::load(&path).expect("load lexicon");

    let settings = RunSettings {
        target_wpm: 80,
        start_delay_secs: 0,
        typo_percent: 0.0,
        synonym_percent: 20.0,
        mode: Mode::Natural,
    };
    let text = "sunny sunny sunny sunny sunny sunny sunny sunny sunny sunny";

    let swapped = (0..10).any(|seed| {
        let transcript = plan(settings.clone(), text, lexicon.clone(), seed);
        assert_eq!(sim::simulate_typed_text(&transcript.events), text);
        transcript.events.contains(&Keystroke::Char { ch: 'b' })
    });
    assert!(swapped, "no seed produced a swap to \"bright\"");
}

#[test]
fn transcript_json_carries_the_effective_settings() {
    let settings = RunSettings {
        mode: Mode::Competition,
        ..Preferences::default().settings()
    };
    let transcript = plan(settings, "  Hi.\n", Lexicon::builtin().expect("lexicon"), 0);

    let value = serde_json::to_value(&transcript).expect("serialize");
    assert_eq!(value["version"], 1);
    assert_eq!(value["config"]["mode"], "competition");
    assert_eq!(value["config"]["target_wpm"], 50.0);
    assert_eq!(value["config"]["typo_probability"], 0.0);
    assert_eq!(value["events"][0], serde_json::json!({"type": "wait", "secs": 3.0}));
    assert_eq!(value["events"][1], serde_json::json!({"type": "char", "ch": "H"}));

    let stats = sim::stats(&transcript.events);
    assert_eq!(stats.characters, 3);
    assert_eq!(stats.backspaces, 0);
    // Three character waits of 0.24s after the 3s start delay.
    assert!((stats.total_wait_secs - (3.0 + 3.0 * 0.24)).abs() < 1e-9);
}
