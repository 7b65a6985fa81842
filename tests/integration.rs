#[cfg(test)]
mod integration_tests {
    use cohort::codec::{ByteStream, Decode, Encode, OptionalValue, VarInt};
    use cohort::{
        Aead, DuplicateMemberPolicy, Ed25519SenderVerifier, Envelope, Error, GroupConfig,
        GroupRegistry, MembershipChange, sender_signing_payload,
    };
    use ed25519_dalek::{Signer, SigningKey};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_full_group_flow() {
        println!("Step 1: Creating group with Alice and Bob...");
        let registry = GroupRegistry::new(None);
        let created = registry.create_group("team", ["Alice", "Bob"]).unwrap();
        assert_eq!(created.epoch, 0);
        assert_eq!(created.members, vec!["Alice", "Bob"]);
        assert_eq!(created.message_count, 0);

        println!("Step 2: Alice sends a message at epoch 0...");
        let hello = registry.send_message("team", "Alice", b"Hello, team!").unwrap();
        assert_eq!(hello.epoch(), 0);
        assert_eq!(registry.receive_envelope("team", &hello).unwrap(), b"Hello, team!");

        println!("Step 3: Charlie joins...");
        let joined = registry.add_member("team", "Charlie").unwrap();
        assert_eq!(joined.previous_epoch, 0);
        assert_eq!(joined.epoch, 1);
        assert_eq!(joined.trigger, MembershipChange::MemberAdded("Charlie".to_string()));
        assert_ne!(joined.public_key, created.public_key);

        println!("Step 4: The epoch 0 message is no longer readable...");
        assert_eq!(registry.receive_envelope("team", &hello), Err(Error::Decryption));

        println!("Step 5: Charlie sends at epoch 1...");
        let welcome = registry.send_message("team", "Charlie", b"Thanks!").unwrap();
        assert_eq!(welcome.epoch(), 1);
        assert_eq!(registry.receive_envelope("team", &welcome).unwrap(), b"Thanks!");

        println!("Step 6: Bob leaves...");
        let left = registry.remove_member("team", "Bob").unwrap();
        assert_eq!(left.epoch, 2);
        assert_eq!(left.members, vec!["Alice", "Charlie"]);
        assert_eq!(registry.receive_envelope("team", &welcome), Err(Error::Decryption));

        println!("Step 7: The log keeps every message in order...");
        let log = registry.message_log("team").unwrap();
        assert_eq!(log, vec![hello, welcome]);
        assert_eq!(registry.snapshot("team").unwrap().message_count, 2);

        println!("Step 8: Deleting the group...");
        registry.delete_group("team").unwrap();
        assert!(registry.is_empty().unwrap());
        assert_eq!(
            registry.send_message("team", "Alice", b"anyone?"),
            Err(Error::UnknownGroup("team".to_string()))
        );
    }

    #[test]
    fn test_envelope_over_the_wire() {
        let registry = GroupRegistry::new(None);
        registry.create_group("wire", ["Alice", "Bob"]).unwrap();
        let sent = registry.send_message("wire", "Alice", b"over the wire").unwrap();

        let bytes = sent.to_bytes().unwrap();
        // epoch 0, then the five-byte sender label
        assert!(hex::encode(&bytes).starts_with("0005416c696365"));

        let received = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(received, sent);
        assert_eq!(
            registry.receive_envelope("wire", &received).unwrap(),
            b"over the wire"
        );

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(
            Envelope::from_bytes(&trailing),
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_tampering_is_indistinguishable() {
        let registry = GroupRegistry::new(None);
        registry.create_group("g", ["Alice"]).unwrap();
        let envelope = registry.send_message("g", "Alice", b"payload").unwrap();

        let mut ciphertext = envelope.ciphertext().to_vec();
        ciphertext[0] ^= 0x01;
        let mut encapsulated_key = envelope.encapsulated_key().to_vec();
        encapsulated_key[0] ^= 0x01;

        let results = [
            registry.receive_message("g", &ciphertext, Some(envelope.encapsulated_key())),
            registry.receive_message("g", envelope.ciphertext(), Some(&encapsulated_key)),
            registry.receive_message("g", envelope.ciphertext(), Some(&encapsulated_key[..16])),
            registry.receive_message("g", &ciphertext[..8], Some(envelope.encapsulated_key())),
        ];
        for result in results {
            assert_eq!(result, Err(Error::Decryption));
        }
    }

    #[test]
    fn test_signed_senders() {
        println!("Step 1: Registering signing keys...");
        let alice = SigningKey::from_bytes(&rand::random::<[u8; 32]>());
        let mallory = SigningKey::from_bytes(&rand::random::<[u8; 32]>());
        let verifier = Ed25519SenderVerifier::new();
        verifier.register("Alice", alice.verifying_key()).unwrap();

        let registry = GroupRegistry::new(None).with_sender_verifier(verifier);
        registry.create_group("signed", ["Alice", "Bob"]).unwrap();

        println!("Step 2: Unsigned sends are rejected...");
        assert_eq!(
            registry.send_message("signed", "Alice", b"hi"),
            Err(Error::UnauthenticatedSender("Alice".to_string()))
        );
        assert!(registry.message_log("signed").unwrap().is_empty());

        println!("Step 3: Alice signs her message...");
        let payload = sender_signing_payload("signed", 0, "Alice", b"hi").unwrap();
        let signature = alice.sign(&payload).to_bytes();
        let envelope = registry
            .send_signed_message("signed", "Alice", b"hi", &signature)
            .unwrap();
        assert_eq!(envelope.signature(), Some(&signature[..]));
        assert_eq!(registry.receive_envelope("signed", &envelope).unwrap(), b"hi");

        println!("Step 4: Mallory cannot speak as Alice...");
        let forged = mallory.sign(&payload).to_bytes();
        assert_eq!(
            registry.send_signed_message("signed", "Alice", b"hi", &forged),
            Err(Error::UnauthenticatedSender("Alice".to_string()))
        );

        println!("Step 5: Relabelled envelopes are rejected on receipt...");
        let relabelled = Envelope::new(
            envelope.epoch(),
            "Bob",
            envelope.ciphertext().to_vec(),
            envelope.encapsulated_key().to_vec(),
            envelope.signature().map(<[u8]>::to_vec),
        );
        assert_eq!(
            registry.receive_envelope("signed", &relabelled),
            Err(Error::UnauthenticatedSender("Bob".to_string()))
        );
    }

    #[test]
    fn test_concurrent_groups() {
        let registry = Arc::new(GroupRegistry::new(None));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let group_id = format!("group-{n}");
                    registry.create_group(group_id.as_str(), ["owner"]).unwrap();
                    for round in 0..5 {
                        let member = format!("member-{round}");
                        registry.add_member(&group_id, member.as_str()).unwrap();
                        let envelope = registry
                            .send_message(&group_id, &member, member.as_bytes())
                            .unwrap();
                        assert_eq!(
                            registry.receive_envelope(&group_id, &envelope).unwrap(),
                            member.as_bytes()
                        );
                    }
                    registry.epoch(&group_id).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 5);
        }
        assert_eq!(registry.len().unwrap(), 8);
    }

    #[test]
    fn test_concurrent_changes_to_one_group() {
        let registry = Arc::new(GroupRegistry::new(None));
        registry.create_group("shared", ["owner"]).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.add_member("shared", format!("member-{n}")).unwrap())
            })
            .collect();

        let mut epochs: Vec<u64> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().epoch)
            .collect();
        epochs.sort_unstable();

        assert_eq!(epochs, (1..=10).collect::<Vec<u64>>());
        assert_eq!(registry.epoch("shared").unwrap(), 10);
        assert_eq!(registry.members("shared").unwrap().len(), 11);
    }

    #[test]
    fn test_independent_registries() {
        let first = GroupRegistry::new(None);
        let second = GroupRegistry::new(None);
        first.create_group("g", ["Alice"]).unwrap();
        second.create_group("g", ["Alice"]).unwrap();

        let envelope = first.send_message("g", "Alice", b"first only").unwrap();
        assert_eq!(second.receive_envelope("g", &envelope), Err(Error::Decryption));
        assert!(second.message_log("g").unwrap().is_empty());
    }

    #[test]
    fn test_aes_gcm_siv_groups() {
        let siv = GroupRegistry::new(Some(GroupConfig {
            aead: Aead::Aes256GcmSiv,
            ..GroupConfig::default()
        }));
        siv.create_group("g", ["Alice", "Bob"]).unwrap();
        let envelope = siv.send_message("g", "Bob", b"siv").unwrap();
        assert_eq!(siv.receive_envelope("g", &envelope).unwrap(), b"siv");
    }

    #[test]
    fn test_duplicate_members_allowed() {
        let registry = GroupRegistry::new(Some(GroupConfig {
            duplicate_members: DuplicateMemberPolicy::Allow,
            ..GroupConfig::default()
        }));
        registry.create_group("g", ["Alice", "Alice", "Bob"]).unwrap();
        assert_eq!(registry.members("g").unwrap(), vec!["Alice", "Alice", "Bob"]);

        let change = registry.remove_member("g", "Alice").unwrap();
        assert_eq!(change.members, vec!["Bob"]);
        assert_eq!(registry.remove_member("g", "Bob"), Err(Error::LastMember));
    }

    #[test]
    fn test_codec_primitives() {
        assert_eq!(VarInt::new(15293).unwrap().encode().unwrap(), vec![0x7B, 0xBD]);

        let mut stream = ByteStream::new(&[0x01, 0x25, 0x00]);
        let present = OptionalValue::<VarInt>::decode(&mut stream).unwrap();
        let absent = OptionalValue::<VarInt>::decode(&mut stream).unwrap();
        assert_eq!(present.value().map(VarInt::value), Some(0x25));
        assert!(!absent.is_present());
        assert!(stream.is_empty());
    }
}
