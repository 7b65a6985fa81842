#[macro_use]
extern crate afl;
use cohort::{Envelope, GroupRegistry};

fn get_registry() -> GroupRegistry {
    let registry = GroupRegistry::new(None);
    if registry.create_group("fuzz", ["Alice", "Bob"]).is_err() {
        std::process::exit(1);
    }
    registry
}

fn main() {
    let registry = get_registry();

    fuzz!(|data: &[u8]| {
        if let Ok(envelope) = Envelope::from_bytes(data) {
            let _ = registry.receive_envelope("fuzz", &envelope);
        }

        let (ciphertext, encapsulated_key) = data.split_at(data.len() / 2);
        let _ = registry.receive_message("fuzz", ciphertext, Some(encapsulated_key));
    });
}
