//! History and Checkpoints
//!
//! This example demonstrates resuming a nested run after a restart.
//!
//! Key concepts:
//! - Deep history restores every level of a composite state
//! - JsonInstance keeps the active configuration as a serializable tree
//! - Checkpoints wrap that tree with a version, id and timestamp
//!
//! Run with: cargo run --example history_checkpoint

use statechart::core::PseudoStateKind;
use statechart::{Checkpoint, JsonInstance, StateMachine};

fn build() -> StateMachine<&'static str, ()> {
    let mut model = StateMachine::new("washer");
    let root = model.root();
    let initial = model.pseudo_state("initial", root, PseudoStateKind::Initial);
    let running = model.state("running", root);
    let paused = model.state("paused", root);
    model.to(initial, running);
    model.to(running, paused).on("pause");
    model.to(paused, running).on("resume");

    let history = model.pseudo_state("history", running, PseudoStateKind::DeepHistory);
    let wash = model.state("wash", running);
    let rinse = model.state("rinse", running);
    model.to(history, wash);
    model.to(wash, rinse).on("next");

    let cycle = model.pseudo_state("initial", rinse, PseudoStateKind::Initial);
    let fill = model.state("fill", rinse);
    let drain = model.state("drain", rinse);
    model.to(cycle, fill);
    model.to(fill, drain).on("next");

    model
}

fn main() {
    println!("=== History and Checkpoints ===\n");

    let mut model = build();
    let mut instance = JsonInstance::new("laundry");

    let checkpoint = futures::executor::block_on(async {
        model.initialise_instance(&mut instance, &()).await.unwrap();
        for message in ["next", "next", "pause"] {
            model.evaluate(&mut instance, &message, &()).await.unwrap();
            println!("{} -> {}", message, instance.to_json().unwrap());
        }
        Checkpoint::capture(&model, &instance)
    });

    let json = checkpoint.to_json().unwrap();
    println!("\n[Checkpoint] {} bytes of JSON", json.len());

    // A new process rebuilds the same model and resumes from the checkpoint
    let mut model = build();
    let mut resumed = Checkpoint::from_json(&json)
        .and_then(|checkpoint| checkpoint.restore(&model))
        .unwrap();

    futures::executor::block_on(async {
        model.evaluate(&mut resumed, &"resume", &()).await.unwrap();
    });

    println!("\nAfter resume:");
    for event in resumed.event_history().iter().take(4) {
        println!("  {}", event);
    }
}
