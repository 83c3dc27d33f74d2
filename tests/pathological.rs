//! Adversarial and randomized regression suites.
//!
//! The parser must terminate with a well-formed stream on every input, with
//! work (measured here through the event count) bounded by a small constant
//! factor of the input size. Inputs are generated deterministically so
//! failures reproduce.

use plume::events::{Annot, Event, SpanKind};

fn check(input: &str) -> Vec<Event> {
    let output = plume::parse(input);
    assert_balanced(input, &output.events);
    assert!(
        output.events.len() <= 5 * input.len() + 16,
        "event count {} blows up on {} bytes",
        output.events.len(),
        input.len()
    );
    output.events
}

fn assert_balanced(input: &str, events: &[Event]) {
    let mut stack: Vec<SpanKind> = Vec::new();
    let mut last_start = 0;
    for event in events {
        assert!(
            event.start >= last_start,
            "positions went backwards on {input:?}"
        );
        last_start = event.start;
        match event.annot {
            Annot::Enter(kind) => stack.push(kind),
            Annot::Exit(kind) => {
                let top = stack.pop();
                assert_eq!(top, Some(kind), "mismatched close on {input:?}");
            }
            Annot::Atom(_) => {}
        }
    }
    assert!(stack.is_empty(), "unclosed spans on {input:?}: {stack:?}");
}

#[test]
fn repeated_unmatched_openers() {
    check(&"[".repeat(10_000));
    check(&"_".repeat(10_000));
    check(&"*a".repeat(5_000));
    check(&"{-".repeat(5_000));
    check(&"![".repeat(5_000));
}

#[test]
fn deeply_nested_brackets() {
    let mut input = "[".repeat(2_000);
    input.push_str("x");
    input.push_str(&"]".repeat(2_000));
    check(&input);
}

#[test]
fn long_backtick_runs() {
    check(&"`".repeat(10_000));
    check(&"`a".repeat(4_000));
    let mut input = "`".repeat(5_000);
    input.push_str("body");
    input.push_str(&"`".repeat(4_999));
    let events = check(&input);
    // the shorter closing run is literal content; the span never closes
    assert!(events.iter().any(|e| e.is_zero_width()));
}

#[test]
fn deeply_nested_blockquotes() {
    let mut input = String::new();
    for depth in 0..500 {
        input.push_str(&"> ".repeat(depth % 50));
        input.push_str("text\n");
    }
    check(&input);
}

#[test]
fn deeply_nested_lists_on_one_line() {
    let mut input = "- ".repeat(300);
    input.push_str("leaf\n");
    check(&input);
}

#[test]
fn alternating_emphasis_soup() {
    check(&"_*".repeat(5_000));
    check(&"*_*_ _*_*".repeat(1_000));
}

#[test]
fn pipe_walls() {
    check(&"|".repeat(5_000));
    let mut input = String::new();
    for _ in 0..200 {
        input.push_str("| a | b | c |\n");
    }
    check(&input);
}

#[test]
fn pathological_dashes_and_dollars() {
    check(&"-".repeat(10_000));
    check(&"$`".repeat(5_000));
    check(&"a-".repeat(5_000));
}

#[test]
fn attribute_noise() {
    check(&"{".repeat(5_000));
    check(&"{a=".repeat(3_000));
    check(&"{%".repeat(3_000));
}

/// A small deterministic generator; xorshift keeps runs reproducible.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

const ALPHABET: &[u8] = b"*_[]()`~^{}->:.|\\\"'$! ab\n#+=";

fn random_input(rng: &mut Rng, max_len: usize) -> String {
    let len = (rng.next() as usize) % max_len;
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(ALPHABET[(rng.next() as usize) % ALPHABET.len()] as char);
    }
    out
}

#[test]
fn random_short_inputs_stay_well_formed() {
    let mut rng = Rng(0x5eed_1234_dead_beef);
    for _ in 0..3_000 {
        let input = random_input(&mut rng, 40);
        check(&input);
    }
}

#[test]
fn random_long_inputs_stay_well_formed() {
    let mut rng = Rng(0x0dd_ba11);
    for _ in 0..200 {
        let input = random_input(&mut rng, 400);
        check(&input);
    }
}
