use super::*;

#[test]
fn petty_soul_fills_the_only_petty_container() {
    let trapper = trapper(TrapSettings::default());
    let mut caster = player(&[(PETTY, 1)]);
    let mut victim = SoulSource::dead("Mudcrab", SoulSize::Petty);
    let mut sink = RecordingSink::default();

    let report = trapper.trap_soul_with_report(&mut caster, &mut victim, &mut sink);

    assert!(report.success);
    assert!(victim.soul_trapped);
    assert_eq!(count(&caster, PETTY), 0);
    assert_eq!(count(&caster, PETTY + 1), 1);
    assert_eq!(
        outcomes(&report),
        vec![VictimOutcome::Trapped {
            kind: SuccessKind::SoulCaptured,
            container: RecordId(PETTY + 1),
            displaced: None,
        }]
    );
    assert_eq!(
        sink.notifications,
        vec![Notification::Success {
            kind: SuccessKind::SoulCaptured,
            degraded: false,
        }]
    );
    assert_eq!(
        sink.souls_trapped,
        vec![("Player".to_string(), "Mudcrab".to_string())]
    );
}

#[test]
fn grand_soul_displaces_common_soul_which_then_finds_nothing() {
    let trapper = trapper(TrapSettings::default());
    let mut caster = player(&[(GRAND + 3, 1)]);
    let mut victim = SoulSource::dead("Mammoth", SoulSize::Grand);
    let mut sink = RecordingSink::default();

    let report = trapper.trap_soul_with_report(&mut caster, &mut victim, &mut sink);

    assert!(report.success);
    assert_eq!(count(&caster, GRAND + 3), 0);
    assert_eq!(count(&caster, GRAND + 5), 1);
    assert_eq!(
        outcomes(&report),
        vec![
            VictimOutcome::Trapped {
                kind: SuccessKind::SoulDisplaced,
                container: RecordId(GRAND + 5),
                displaced: Some(SoulSize::Common),
            },
            VictimOutcome::Abandoned {
                reason: FailureKind::NoSuitableSoulGem,
            },
        ]
    );
    assert_eq!(report.victims[1].victim, Victim::displaced(SoulSize::Common));
    assert_eq!(
        report.inventory_status,
        Some(InventoryStatus::AllSoulGemsFilled)
    );
    assert_eq!(report.failure, None);
    assert_eq!(sink.notifications.len(), 1);
}

#[test]
fn caster_without_containers_fails_without_mutation() {
    let trapper = trapper(TrapSettings::default());
    let mut caster = player(&[(0xBEEF, 3)]);
    let before = caster.inventory.clone();
    let mut victim = SoulSource::dead("Wolf", SoulSize::Lesser);
    let mut sink = RecordingSink::default();

    let report = trapper.trap_soul_with_report(&mut caster, &mut victim, &mut sink);

    assert!(!report.success);
    assert!(!victim.soul_trapped);
    assert_eq!(caster.inventory, before);
    assert_eq!(report.failure, Some(FailureKind::NoSoulGemsOwned));
    assert_eq!(
        outcomes(&report),
        vec![VictimOutcome::Abandoned {
            reason: FailureKind::NoSoulGemsOwned,
        }]
    );
    assert_eq!(
        sink.notifications,
        vec![Notification::Failure {
            kind: FailureKind::NoSoulGemsOwned,
        }]
    );
    assert!(sink.souls_trapped.is_empty());
}

#[test]
fn black_soul_fills_an_empty_black_container() {
    let trapper = trapper(TrapSettings::default());
    let mut caster = player(&[]);
    caster
        .inventory
        .add_item(RecordId(BLACK), 1, Some(ExtraData::owned_by("Falion")));
    let mut victim = SoulSource::dead("Bandit", SoulSize::Black);
    let mut sink = RecordingSink::default();

    let report = trapper.trap_soul_with_report(&mut caster, &mut victim, &mut sink);

    assert!(report.success);
    assert_eq!(count(&caster, BLACK), 0);
    assert_eq!(count(&caster, BLACK + 1), 1);
    let filled = caster
        .inventory
        .entry(RecordId(BLACK + 1))
        .expect("black container filled");
    assert_eq!(filled.extra, vec![ExtraData::owned_by("Falion")]);
    assert_eq!(
        outcomes(&report),
        vec![VictimOutcome::Trapped {
            kind: SuccessKind::SoulCaptured,
            container: RecordId(BLACK + 1),
            displaced: None,
        }]
    );
}

#[test]
fn reusable_container_round_trip_keeps_item_count() {
    let trapper = trapper(TrapSettings::default());
    let mut caster = player(&[(REUSABLE, 1), (PETTY, 1)]);
    let total = caster.inventory.total_items();
    let mut victim = SoulSource::dead("Skeever", SoulSize::Petty);

    assert!(trapper.trap_soul(&mut caster, &mut victim, &mut NullSink));
    assert_eq!(count(&caster, REUSABLE + 1), 1);
    assert_eq!(count(&caster, PETTY), 1);
    assert_eq!(caster.inventory.total_items(), total);

    let consumed = consume_charge(
        trapper.map(),
        &mut caster.inventory,
        RecordId(REUSABLE + 1),
    )
    .expect("consume charge");
    assert_eq!(consumed, SoulSize::Petty);
    assert_eq!(count(&caster, REUSABLE), 1);
    assert_eq!(count(&caster, REUSABLE + 1), 0);
    assert_eq!(caster.inventory.total_items(), total);
}

#[test]
fn black_soul_fills_a_reusable_black_container_and_keeps_its_linkage() {
    let mut specs = standard_specs();
    specs.push(reusable_black_spec());
    let (map, report) =
        crate::container::ContainerMap::build(&specs, &standard_catalog()).expect("map");
    assert!(report.failed.is_empty(), "{:?}", report.failed);
    let trapper = SoulTrapper::with_soul_loss_roll(
        map,
        TrapSettings::default(),
        Box::new(FixedSoulLossRoll(0.5)),
    );

    let mut caster = player(&[(BLACK, 1)]);
    caster.inventory.add_item(
        RecordId(REUSABLE_BLACK),
        1,
        Some(ExtraData::owned_by("Player")),
    );
    let total = caster.inventory.total_items();
    let mut victim = SoulSource::dead("Necromancer", SoulSize::Black);

    let report = trapper.trap_soul_with_report(&mut caster, &mut victim, &mut NullSink);

    // Reusable groups load at high priority, so they are searched first.
    assert!(report.success);
    assert_eq!(
        outcomes(&report),
        vec![VictimOutcome::Trapped {
            kind: SuccessKind::SoulCaptured,
            container: RecordId(REUSABLE_BLACK + 1),
            displaced: None,
        }]
    );
    assert_eq!(count(&caster, BLACK), 1);
    assert_eq!(count(&caster, REUSABLE_BLACK), 0);
    assert_eq!(count(&caster, REUSABLE_BLACK + 1), 1);
    assert_eq!(
        trapper.map().base_record_of(RecordId(REUSABLE_BLACK + 1)),
        Some(RecordId(REUSABLE_BLACK))
    );

    let consumed = consume_charge(
        trapper.map(),
        &mut caster.inventory,
        RecordId(REUSABLE_BLACK + 1),
    )
    .expect("consume charge");
    assert_eq!(consumed, SoulSize::Black);
    let base = caster
        .inventory
        .entry(RecordId(REUSABLE_BLACK))
        .expect("empty companion returned");
    assert_eq!(base.extra, vec![ExtraData::owned_by("Player")]);
    assert_eq!(caster.inventory.total_items(), total);
}
