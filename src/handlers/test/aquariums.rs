use chrono::Duration;
use crate::domain::{AquariumId, BackgroundId, ClassifiedError, Dimension, ErrorKind, OwnedFishId};
use crate::handlers::AquariumError;
use crate::handlers::test::{now, uid, Fixture, ALICE, BOB};

fn background() -> BackgroundId {
    BackgroundId::new(1)
}

#[tokio::test]
async fn create_aquarium() {
    let fixture = Fixture::with_users(&[ALICE]).await;
    let aquariums = &fixture.services.aquariums;

    let first = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.expect("couldn't create an aquarium");
    assert_eq!(first.owner, uid(ALICE));
    assert_eq!(first.name, "Reef");
    assert_eq!(first.last_fed_at, Some(now() - Duration::minutes(60)));
    assert_eq!(first.last_water_changed_at, Some(now() - Duration::minutes(240)));
    assert_eq!(first.last_cleaned_at, Some(now() - Duration::minutes(480)));
    for dimension in [Dimension::Feed, Dimension::Water, Dimension::Clean] {
        assert_eq!(first.score(dimension, &fixture.config.intervals, now()), Some(3));
    }
    assert_eq!(fixture.user(ALICE).await.main_aquarium, Some(first.id));

    let second = aquariums.create_aquarium(&uid(ALICE), "Lagoon", background()).await.unwrap();
    assert_eq!(fixture.user(ALICE).await.main_aquarium, Some(first.id));

    let list = aquariums.list_aquariums(&uid(ALICE)).await.unwrap();
    let names: Vec<_> = list.iter().map(|a| (a.id, a.name.as_str())).collect();
    assert_eq!(names, vec![(first.id, "Reef"), (second.id, "Lagoon")]);

    let err = aquariums.create_aquarium(&uid(BOB), "Pond", background()).await.unwrap_err();
    assert!(matches!(err, AquariumError::UserNotFound(_)));
}

#[tokio::test]
async fn update_status() {
    let fixture = Fixture::with_users(&[ALICE]).await;
    let aquariums = &fixture.services.aquariums;
    let aquarium = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();

    let updated = aquariums.update_status(aquarium.id, "FEED", "").await.unwrap();
    assert_eq!(updated.last_fed_at, Some(now()));
    assert_eq!(updated.last_water_changed_at, aquarium.last_water_changed_at);

    let updated = aquariums.update_status(aquarium.id, "name", "Great Barrier").await.unwrap();
    assert_eq!(updated.name, "Great Barrier");

    let updated = aquariums.update_status(aquarium.id, "Background", " 7 ").await.unwrap();
    assert_eq!(updated.background, BackgroundId::new(7));

    fixture.clock.advance(Duration::minutes(10));
    let updated = aquariums.update_status(aquarium.id, "clean", "").await.unwrap();
    assert_eq!(updated.last_cleaned_at, Some(now() + Duration::minutes(10)));
}

#[tokio::test]
async fn maintenance_never_goes_back_in_time() {
    let fixture = Fixture::with_users(&[ALICE]).await;
    let aquariums = &fixture.services.aquariums;
    let aquarium = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();

    fixture.clock.set(now() - Duration::hours(3));
    let updated = aquariums.update_status(aquarium.id, "feed", "").await.unwrap();
    assert_eq!(updated.last_fed_at, aquarium.last_fed_at);
}

#[tokio::test]
async fn invalid_status_updates() {
    let fixture = Fixture::with_users(&[ALICE]).await;
    let aquariums = &fixture.services.aquariums;
    let aquarium = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();

    let err = aquariums.update_status(aquarium.id, "paint", "red").await.unwrap_err();
    assert!(matches!(&err, AquariumError::UnknownStatusField(field) if field == "paint"));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = aquariums.update_status(aquarium.id, "background", "sand").await.unwrap_err();
    assert!(matches!(err, AquariumError::InvalidBackground(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = aquariums.update_status(AquariumId::new(42), "feed", "").await.unwrap_err();
    assert!(matches!(err, AquariumError::AquariumNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let details = aquariums.details(aquarium.id).await.unwrap();
    assert_eq!(details.aquarium, aquarium);
}

#[tokio::test]
async fn details() {
    let fixture = Fixture::with_users(&[ALICE]).await;
    let aquariums = &fixture.services.aquariums;
    let aquarium = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();
    let clownfish = fixture.add_fish_type("Clownfish").await;
    let tang = fixture.add_fish_type("Tang").await;
    for fish_type in [&clownfish, &clownfish, &tang] {
        let fish = fixture.give_fish(ALICE, fish_type).await;
        aquariums.place_fish(fish.id, Some(aquarium.id)).await.unwrap();
    }
    fixture.give_fish(ALICE, &tang).await;

    aquariums.update_status(aquarium.id, "water", "").await.unwrap();
    fixture.clock.advance(Duration::minutes(60));
    let details = aquariums.details(aquarium.id).await.unwrap();
    assert_eq!(details.feed_score, Some(1));
    assert_eq!(details.water_score, Some(5));
    assert_eq!(details.clean_score, Some(3));

    let counts: Vec<_> = details.fishes.iter().map(|c| (c.name.as_str(), c.count)).collect();
    assert_eq!(counts, vec![("Clownfish", 2), ("Tang", 1)]);
}

#[tokio::test]
async fn place_fish() {
    let fixture = Fixture::with_users(&[ALICE, BOB]).await;
    let aquariums = &fixture.services.aquariums;
    let reef = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();
    let pond = aquariums.create_aquarium(&uid(BOB), "Pond", background()).await.unwrap();
    let clownfish = fixture.add_fish_type("Clownfish").await;
    let fish = fixture.give_fish(ALICE, &clownfish).await;

    let placed = aquariums.place_fish(fish.id, Some(reef.id)).await.unwrap();
    assert_eq!(placed.aquarium, Some(reef.id));

    let err = aquariums.place_fish(fish.id, Some(pond.id)).await.unwrap_err();
    assert!(matches!(err, AquariumError::ForeignAquarium(id) if id == pond.id));

    let err = aquariums.place_fish(OwnedFishId::new(42), None).await.unwrap_err();
    assert!(matches!(err, AquariumError::FishNotFound(_)));

    let removed = aquariums.place_fish(fish.id, None).await.unwrap();
    assert!(removed.in_inventory());
    let owned = aquariums.list_fish(&uid(ALICE)).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert!(owned[0].fish.in_inventory());
    assert_eq!(owned[0].fish_type, clownfish);
}

#[tokio::test]
async fn set_main_aquarium() {
    let fixture = Fixture::with_users(&[ALICE, BOB]).await;
    let aquariums = &fixture.services.aquariums;
    aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();
    let lagoon = aquariums.create_aquarium(&uid(ALICE), "Lagoon", background()).await.unwrap();
    let pond = aquariums.create_aquarium(&uid(BOB), "Pond", background()).await.unwrap();

    aquariums.set_main_aquarium(&uid(ALICE), lagoon.id).await.unwrap();
    assert_eq!(fixture.user(ALICE).await.main_aquarium, Some(lagoon.id));

    let err = aquariums.set_main_aquarium(&uid(ALICE), pond.id).await.unwrap_err();
    assert!(matches!(err, AquariumError::ForeignAquarium(_)));
    let err = aquariums.set_main_aquarium(&uid("nobody"), pond.id).await.unwrap_err();
    assert!(matches!(err, AquariumError::UserNotFound(_)));
    assert_eq!(fixture.user(ALICE).await.main_aquarium, Some(lagoon.id));
}

#[tokio::test]
async fn delete_aquarium() {
    let fixture = Fixture::with_users(&[ALICE]).await;
    let aquariums = &fixture.services.aquariums;
    let reef = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();
    let clownfish = fixture.add_fish_type("Clownfish").await;
    let fish = fixture.give_fish(ALICE, &clownfish).await;
    aquariums.place_fish(fish.id, Some(reef.id)).await.unwrap();

    assert!(aquariums.delete_aquarium(reef.id).await.unwrap());
    assert!(!aquariums.delete_aquarium(reef.id).await.unwrap());

    assert_eq!(fixture.user(ALICE).await.main_aquarium, None);
    assert!(aquariums.list_aquariums(&uid(ALICE)).await.unwrap().is_empty());
    let owned = aquariums.list_fish(&uid(ALICE)).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert!(owned[0].fish.in_inventory());
}

#[tokio::test]
async fn aquarium_fish() {
    let fixture = Fixture::with_users(&[ALICE, BOB]).await;
    let aquariums = &fixture.services.aquariums;
    let reef = aquariums.create_aquarium(&uid(ALICE), "Reef", background()).await.unwrap();
    let lagoon = aquariums.create_aquarium(&uid(ALICE), "Lagoon", background()).await.unwrap();
    let clownfish = fixture.add_fish_type("Clownfish").await;
    let tang = fixture.add_fish_type("Tang").await;

    let placed_tang = fixture.give_fish(ALICE, &tang).await;
    let placed_clownfish = fixture.give_fish(ALICE, &clownfish).await;
    let elsewhere = fixture.give_fish(ALICE, &clownfish).await;
    fixture.give_fish(ALICE, &tang).await;
    aquariums.place_fish(placed_tang.id, Some(reef.id)).await.unwrap();
    aquariums.place_fish(placed_clownfish.id, Some(reef.id)).await.unwrap();
    aquariums.place_fish(elsewhere.id, Some(lagoon.id)).await.unwrap();

    let fishes = aquariums.aquarium_fish(&uid(ALICE), reef.id).await.unwrap();
    let listed: Vec<_> = fishes.iter()
        .map(|f| (f.fish.id, f.fish_type.name.as_str(), f.fish.aquarium))
        .collect();
    assert_eq!(listed, vec![
        (placed_clownfish.id, "Clownfish", Some(reef.id)),
        (placed_tang.id, "Tang", Some(reef.id)),
    ]);
    assert_eq!(fishes[0].fish_type, clownfish);

    assert!(aquariums.aquarium_fish(&uid(BOB), reef.id).await.unwrap().is_empty());
    assert!(aquariums.aquarium_fish(&uid(ALICE), AquariumId::new(42)).await.unwrap().is_empty());
}

#[tokio::test]
async fn friend_aquarium_fish() {
    let fixture = Fixture::with_users(&[ALICE, BOB]).await;
    let aquariums = &fixture.services.aquariums;
    assert!(aquariums.friend_aquarium_fish(&uid(BOB)).await.unwrap().is_empty());

    let pond = aquariums.create_aquarium(&uid(BOB), "Pond", background()).await.unwrap();
    let puddle = aquariums.create_aquarium(&uid(BOB), "Puddle", background()).await.unwrap();
    let clownfish = fixture.add_fish_type("Clownfish").await;
    let tang = fixture.add_fish_type("Tang").await;
    let shown = fixture.give_fish(BOB, &clownfish).await;
    let hidden = fixture.give_fish(BOB, &tang).await;
    aquariums.place_fish(shown.id, Some(pond.id)).await.unwrap();
    aquariums.place_fish(hidden.id, Some(puddle.id)).await.unwrap();

    let fishes = aquariums.friend_aquarium_fish(&uid(BOB)).await.unwrap();
    assert_eq!(fishes.len(), 1);
    assert_eq!(fishes[0].fish.id, shown.id);
    assert_eq!(fishes[0].fish_type, clownfish);

    aquariums.set_main_aquarium(&uid(BOB), puddle.id).await.unwrap();
    let fishes = aquariums.friend_aquarium_fish(&uid(BOB)).await.unwrap();
    assert_eq!(fishes.len(), 1);
    assert_eq!(fishes[0].fish_type.id, tang.id);

    let err = aquariums.friend_aquarium_fish(&uid("nobody")).await.unwrap_err();
    assert!(matches!(err, AquariumError::UserNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
