//! Light Switch
//!
//! This example demonstrates a flat model driven by messages.
//!
//! Key concepts:
//! - Building states and message-guarded transitions
//! - Entry and exit behavior as Stillwater effects
//! - Messages that match no transition leave the instance untouched
//!
//! Run with: cargo run --example light_switch

use statechart::core::PseudoStateKind;
use statechart::{action, MemoryInstance, StateMachine};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Switch {
    TurnOn,
    TurnOff,
}

// Environment shared with every action
#[derive(Clone, Default)]
struct Meter {
    switched_on: Arc<AtomicUsize>,
}

fn main() {
    println!("=== Light Switch ===\n");

    let mut model: StateMachine<Switch, Meter> = StateMachine::new("light");
    let root = model.root();
    let initial = model.pseudo_state("initial", root, PseudoStateKind::Initial);
    let off = model.state("off", root);
    let on = model.state("on", root);

    model.state_mut(on).entry(action::<Switch, Meter, _>(|meter: &Meter| {
        meter.switched_on.fetch_add(1, Ordering::SeqCst);
        println!("  light is on");
        Ok(())
    }));
    model.state_mut(off).entry(action::<Switch, Meter, _>(|_: &Meter| {
        println!("  light is off");
        Ok(())
    }));
    model.to(initial, off);
    model.to(off, on).on(Switch::TurnOn);
    model.to(on, off).on(Switch::TurnOff);

    let meter = Meter::default();
    let mut instance = MemoryInstance::new("kitchen");

    futures::executor::block_on(async {
        model.initialise_instance(&mut instance, &meter).await.unwrap();

        for message in [Switch::TurnOn, Switch::TurnOn, Switch::TurnOff, Switch::TurnOn] {
            let fired = model.evaluate(&mut instance, &message, &meter).await.unwrap();
            println!("{:?} -> transition fired: {}", message, fired);
        }
    });

    println!("\nLight is on: {}", model.is_active(&instance, on));
    println!(
        "Times switched on: {}",
        meter.switched_on.load(Ordering::SeqCst)
    );
}
